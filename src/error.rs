//! Error types for the memoizing cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Error returned by a memoized call.
///
/// `E` is the error type of the wrapped operation. It is carried through
/// untouched so callers can match on their own failure kinds.
#[derive(Error, Debug)]
pub enum CacheError<E> {
    /// The underlying operation failed; never cached
    #[error(transparent)]
    Operation(E),

    /// The coordination registry was found in an inconsistent state
    #[error("Internal error: {0}")]
    Internal(String),
}

impl<E> CacheError<E> {
    /// Returns the operation error, if this is one.
    pub fn into_operation(self) -> Option<E> {
        match self {
            CacheError::Operation(err) => Some(err),
            CacheError::Internal(_) => None,
        }
    }

    /// Returns true if the registry reported an invariant violation.
    pub fn is_internal(&self) -> bool {
        matches!(self, CacheError::Internal(_))
    }
}

// == Registry Error Enum ==
/// Invariant violations detected by the coordination registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A slot was still mapped although nobody holds or awaits it
    #[error("coordination slot found with no waiters")]
    OrphanedSlot,
}

impl<E> From<RegistryError> for CacheError<E> {
    fn from(err: RegistryError) -> Self {
        CacheError::Internal(err.to_string())
    }
}

// == Config Error Enum ==
/// Errors raised while building a [`crate::Config`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Capacity must hold at least one entry
    #[error("max_entries must be greater than zero")]
    InvalidMaxEntries,

    /// A zero TTL would make every entry stale on insert
    #[error("ttl must be greater than zero")]
    InvalidTtl,

    /// An environment variable held something that is not a number
    #[error("Invalid value {value:?} for {var}")]
    InvalidValue { var: &'static str, value: String },
}

// == Result Type Alias ==
/// Convenience Result type for memoized calls.
pub type Result<T, E> = std::result::Result<T, CacheError<E>>;
