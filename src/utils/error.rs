use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Extraction error: {message}")]
    ExtractionError { message: String },

    #[error("Transformation error: {message}")]
    TransformationError { message: String },

    #[error("Invalid argument '{argument}': {reason}")]
    ArgumentError { argument: String, reason: String },

    #[error("Column not found: {column}")]
    ColumnNotFound { column: String },

    #[error("Unknown operation: {name}")]
    UnknownOperation { name: String },

    #[error("Failed to register view '{name}': {message}")]
    RegistrationError { name: String, message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl ReaderError {
    pub fn argument(argument: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ArgumentError {
            argument: argument.into(),
            reason: reason.into(),
        }
    }

    pub fn column_not_found(column: impl Into<String>) -> Self {
        Self::ColumnNotFound {
            column: column.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReaderError>;
