//! Error types for the APT archive library.

/// Result type for APT archive operations.
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Errors that can occur when working with APT archives.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// I/O error occurred while reading or writing an index stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stanza could not be decoded from the underlying byte stream.
    #[error("Invalid control stanza: {0}")]
    Decode(String),

    /// A compound field's text does not match its grammar.
    #[error("Malformed field: {raw:?}")]
    MalformedField {
        /// The raw field text that failed to decode.
        raw: String,
    },

    /// Missing required field.
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Invalid field value.
    #[error("Invalid field value for '{field}': {value}")]
    InvalidField {
        /// The field name.
        field: String,
        /// The offending value.
        value: String,
    },

    /// A version string could not be parsed.
    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    /// No packages are registered for the requested architecture.
    #[error("No such arch: '{0}'")]
    NoSuchArch(String),

    /// An unknown hash algorithm name was requested.
    #[error("Unsupported hash algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

impl ArchiveError {
    /// Create a new stanza decode error.
    pub fn decode<S: Into<String>>(msg: S) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a new malformed field error.
    pub fn malformed_field<S: Into<String>>(raw: S) -> Self {
        Self::MalformedField { raw: raw.into() }
    }

    /// Create a new missing field error.
    pub fn missing_field<S: Into<String>>(field: S) -> Self {
        Self::MissingField(field.into())
    }

    /// Create a new invalid field error.
    pub fn invalid_field<S: Into<String>>(field: S, value: S) -> Self {
        Self::InvalidField {
            field: field.into(),
            value: value.into(),
        }
    }
}
