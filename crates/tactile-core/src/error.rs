//! Error types for tactile-core.

use crate::event::EventCategory;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, InputError>;

/// Errors reported by the input layer.
///
/// None of these cross a frame boundary as a failure: a leaked scope is still
/// popped, an invalid config is rejected before it is applied.
#[derive(Debug, Error)]
pub enum InputError {
    /// A scope was torn down while handlers were still registered in it.
    #[error("input scope at depth {depth} still held {registrations} registration(s)")]
    ScopeLeak {
        /// Depth of the offending scope (the base scope is depth 1).
        depth: usize,
        /// Total registrations that were force-cleared.
        registrations: usize,
        /// Non-empty lists and their lengths.
        leaked: Vec<(EventCategory, usize)>,
    },

    /// Attempted to pop the base scope.
    #[error("the base input scope cannot be popped")]
    BaseScope,

    /// Too many nested scopes.
    #[error("input scope stack exceeded its maximum depth of {max}")]
    ScopeOverflow {
        /// Configured maximum depth.
        max: usize,
    },

    /// Config values out of range.
    #[error("invalid input config: {0}")]
    InvalidConfig(String),

    /// Config file could not be parsed.
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Config could not be rendered.
    #[error("config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// IO error while reading a config file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
