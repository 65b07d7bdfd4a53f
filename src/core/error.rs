use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Failures surfaced by the pricing engine.
///
/// Only storage problems escape to callers; missing or malformed
/// configuration is absorbed by the defaults path in the settings cache.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The backing store could not complete a read or write.
    #[error("storage failure: {0}")]
    Store(String),

    /// A stored record exists but could not be decoded.
    #[error("corrupt record at {key}: {reason}")]
    Corrupt { key: String, reason: String },

    /// A catalog entry was addressed by a key that does not exist.
    #[error("no catalog entry for {0}")]
    NotFound(String),
}

impl EngineError {
    pub fn store(err: impl std::fmt::Display) -> Self {
        EngineError::Store(err.to_string())
    }

    pub fn corrupt(key: impl Into<String>, err: impl std::fmt::Display) -> Self {
        EngineError::Corrupt {
            key: key.into(),
            reason: err.to_string(),
        }
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, EngineError::Corrupt { .. })
    }
}
