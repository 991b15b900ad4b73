//! Error types for the bootcamp library.

use thiserror::Error;

/// Errors that can occur when working with bootcamp documents.
#[derive(Error, Debug)]
pub enum BootcampError {
    /// No document exists with the given identifier.
    #[error("Bootcamp with id of {id} not found")]
    NotFound { id: String },

    /// The document or request failed validation.
    #[error("{}", messages.join(", "))]
    Validation { messages: Vec<String> },

    /// A unique field already holds this value.
    #[error("Duplicate field value entered: {field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// The geocoder returned no result for the query.
    #[error("No location found for zipcode {query}")]
    GeocodeNotFound { query: String },

    /// The geocoding provider failed or could not be reached.
    #[error("Geocoder error: {reason}")]
    Geocoder { reason: String },

    /// IO error when reading or writing the data file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A lock protecting the document store was poisoned by a panic.
    #[error("Document store is unavailable")]
    Poisoned,
}

impl BootcampError {
    /// Build a validation error from a single message.
    pub fn validation(message: impl Into<String>) -> Self {
        BootcampError::Validation {
            messages: vec![message.into()],
        }
    }
}

/// Result type alias using [`BootcampError`].
pub type Result<T> = std::result::Result<T, BootcampError>;
