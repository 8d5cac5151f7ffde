//! Configuration Module
//!
//! Handles loading and validating memoizer configuration.

use std::env;
use std::time::Duration;

use crate::error::ConfigError;

/// Default capacity before LRU eviction kicks in
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

/// Default freshness window per entry
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

const MAX_ENTRIES_VAR: &str = "MEMO_MAX_ENTRIES";
const TTL_MS_VAR: &str = "MEMO_TTL_MS";

/// Memoizer configuration parameters.
///
/// Passed explicitly into constructors; there is no global state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of entries the store can hold
    pub max_entries: usize,
    /// How long an entry stays fresh after it was written
    pub ttl: Duration,
}

impl Config {
    /// Creates a validated Config.
    ///
    /// Both the capacity and the TTL must be non-zero.
    pub fn new(max_entries: usize, ttl: Duration) -> Result<Self, ConfigError> {
        if max_entries == 0 {
            return Err(ConfigError::InvalidMaxEntries);
        }
        if ttl.is_zero() {
            return Err(ConfigError::InvalidTtl);
        }
        Ok(Self { max_entries, ttl })
    }

    /// Creates a new Config by loading values from environment variables.
    ///
    /// Missing, unparsable or zero values fall back to the defaults.
    ///
    /// # Environment Variables
    /// - `MEMO_MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `MEMO_TTL_MS` - Entry TTL in milliseconds (default: 300000)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Strict variant of [`Config::from_env`]: reports bad values instead of
    /// silently using defaults. Absent variables still use the defaults.
    pub fn try_from_env() -> Result<Self, ConfigError> {
        Self::try_from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_entries = lookup(MAX_ENTRIES_VAR)
            .and_then(|v| v.parse().ok())
            .filter(|&n: &usize| n > 0)
            .unwrap_or(DEFAULT_MAX_ENTRIES);
        let ttl = lookup(TTL_MS_VAR)
            .and_then(|v| v.parse().ok())
            .filter(|&ms: &u64| ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_TTL);

        Self { max_entries, ttl }
    }

    fn try_from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_entries = match lookup(MAX_ENTRIES_VAR) {
            Some(raw) => parse_var(MAX_ENTRIES_VAR, &raw)?,
            None => DEFAULT_MAX_ENTRIES,
        };
        let ttl = match lookup(TTL_MS_VAR) {
            Some(raw) => Duration::from_millis(parse_var(TTL_MS_VAR, &raw)?),
            None => DEFAULT_TTL,
        };

        Self::new(max_entries, ttl)
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        var,
        value: raw.to_string(),
    })
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            ttl: DEFAULT_TTL,
        }
    }
}
