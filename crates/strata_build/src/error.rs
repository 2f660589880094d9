//! Error types for platform loading and resource requests.

use strata_common::ParseFrequencyError;
use strata_hdl::HdlError;

/// Errors that can occur while loading a platform or requesting its resources.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// An I/O error occurred while reading the platform file.
    #[error("failed to read platform: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse platform: {0}")]
    ParseError(String),

    /// A required field is missing or empty.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A platform value failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),

    /// A clock constraint carries an unparsable frequency.
    #[error("invalid clock constraint: {0}")]
    InvalidFrequency(#[from] ParseFrequencyError),

    /// No resource with this name and number exists.
    #[error("unknown resource {name}#{number}")]
    UnknownResource {
        /// Requested resource name.
        name: String,
        /// Requested resource number.
        number: u32,
    },

    /// The resource was already requested.
    #[error("resource {name}#{number} has already been requested")]
    ResourceInUse {
        /// Requested resource name.
        name: String,
        /// Requested resource number.
        number: u32,
    },

    /// A pin refers to a connector or connector pin that does not exist.
    #[error("unknown connector pin '{0}'")]
    UnknownConnectorPin(String),

    /// Building the requested signals failed.
    #[error(transparent)]
    Hdl(#[from] HdlError),
}
