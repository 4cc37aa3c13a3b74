//! Error types for generation, order validation and storage

/// Errors from the image generation call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// No API URL was configured.
    #[error("Please enter a valid API URL")]
    InvalidEndpoint,

    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("Image generation request failed: {0}")]
    Transport(String),

    /// The service answered with a non-2xx status.
    #[error("Failed to generate image: {status} {body}")]
    RequestFailed {
        status: u16,
        /// Raw response body for diagnostics.
        body: String,
    },

    /// The service answered 2xx but without a usable image payload.
    #[error("Malformed generation response: {0}")]
    MalformedResponse(String),
}

/// Order form validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingRequiredField { field: &'static str },
}

/// Failures of the durable key-value store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Failed to serialize collection: {0}")]
    Serialize(String),

    #[error("Storage I/O error: {0}")]
    Io(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        StorageError::Backend(e.to_string())
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e.to_string())
    }
}

/// Errors from submitting the order form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error("No order is being booked")]
    NotOpen,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Order was not saved: {0}")]
    Storage(#[from] StorageError),
}

/// Errors from saving an image to disk.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExportError {
    /// The image reference is not a base64 data URI, or its payload does not decode.
    #[error("Invalid image data: {0}")]
    InvalidImage(String),

    #[error("Failed to save image: {0}")]
    Io(String),
}

impl From<std::io::Error> for ExportError {
    fn from(e: std::io::Error) -> Self {
        ExportError::Io(e.to_string())
    }
}
