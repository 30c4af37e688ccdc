#![forbid(unsafe_code)]

use thiserror::Error;

use crate::command::ElementRole;
use crate::config::ConfigError;

pub type Result<T> = std::result::Result<T, PageError>;

/// Errors surfaced by page components.
///
/// None of these are fatal to the page: callers log them and carry on with
/// the remaining features.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("required element missing: {role}")]
    MissingElement { role: ElementRole },

    #[error("index {index} out of range for {len} images")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("invalid countdown target {value:?}: {source}")]
    InvalidTarget {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("gallery initialization already completed")]
    AlreadyInitialized,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl PageError {
    /// Whether this error only disables one feature (as opposed to a bug in
    /// the caller's sequencing).
    #[must_use]
    pub const fn is_degradation(&self) -> bool {
        matches!(self, Self::MissingElement { .. })
    }
}
