//! Error types for routing.

use thiserror::Error;

/// Router-specific errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// No route is registered under this name.
    #[error("unknown route name: {0}")]
    UnknownRouteName(String),

    /// A path template token has no value to substitute.
    #[error("missing value for parameter `{param}` of route {route}")]
    MissingParameter { route: String, param: String },

    /// The route was registered with a regex, which has no template to fill.
    #[error("route {0} uses a regex pattern and cannot be generated")]
    NotGeneratable(String),

    /// Invalid path pattern.
    #[error("invalid path pattern: {0}")]
    InvalidPattern(String),
}

/// Result type alias for router operations.
pub type Result<T> = std::result::Result<T, RouterError>;
