use crate::domain::model::REQUIRED_FIELDS;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Source returned status {status} for {location}")]
    SourceStatusError { location: String, status: u16 },

    #[error("Malformed record at position {position}{}: field '{field}' {reason}", order_id_suffix(.order_id))]
    MalformedRecord {
        position: usize,
        order_id: Option<String>,
        field: String,
        reason: String,
    },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Output error: {message}")]
    OutputError { message: String },
}

fn order_id_suffix(order_id: &Option<String>) -> String {
    match order_id {
        Some(id) => format!(" (order_id {})", id),
        None => String::new(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Source,
    Configuration,
    Output,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl AnalysisError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AnalysisError::MalformedRecord { .. } | AnalysisError::CsvError(_) => {
                ErrorCategory::Input
            }
            AnalysisError::HttpError(_) | AnalysisError::SourceStatusError { .. } => {
                ErrorCategory::Source
            }
            AnalysisError::ConfigValidationError { .. }
            | AnalysisError::InvalidConfigValueError { .. }
            | AnalysisError::MissingConfigError { .. } => ErrorCategory::Configuration,
            AnalysisError::ZipError(_)
            | AnalysisError::SerializationError(_)
            | AnalysisError::OutputError { .. } => ErrorCategory::Output,
            AnalysisError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 來源暫時無法連線，重試可能成功
            ErrorCategory::Source => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Configuration | ErrorCategory::Output => {
                ErrorSeverity::High
            }
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AnalysisError::MalformedRecord {
                position, field, ..
            } => format!(
                "Order data is invalid: row {} has a bad '{}' value",
                position + 1,
                field
            ),
            AnalysisError::CsvError(_) => "The order file could not be read as CSV".to_string(),
            AnalysisError::HttpError(_) | AnalysisError::SourceStatusError { .. } => {
                "Could not download the order data".to_string()
            }
            AnalysisError::ConfigValidationError { field, .. }
            | AnalysisError::InvalidConfigValueError { field, .. }
            | AnalysisError::MissingConfigError { field } => {
                format!("Configuration problem with '{}'", field)
            }
            AnalysisError::ZipError(_)
            | AnalysisError::SerializationError(_)
            | AnalysisError::OutputError { .. } => "Failed to write analysis results".to_string(),
            AnalysisError::IoError(e) => format!("File system error: {}", e),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self.category() {
            ErrorCategory::Input => format!(
                "Check that every row has {}, with non-negative numeric amounts",
                REQUIRED_FIELDS.join(", ")
            ),
            ErrorCategory::Source => {
                "Check the source URL and network connectivity, then retry".to_string()
            }
            ErrorCategory::Configuration => "Fix the configuration value and run again".to_string(),
            ErrorCategory::Output => "Check that the output path is writable".to_string(),
            ErrorCategory::System => "Check file paths and permissions".to_string(),
        }
    }

    pub fn malformed(
        position: usize,
        order_id: Option<String>,
        field: &str,
        reason: impl Into<String>,
    ) -> Self {
        AnalysisError::MalformedRecord {
            position,
            order_id,
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
