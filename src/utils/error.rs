use thiserror::Error;

#[derive(Error, Debug)]
pub enum KwabError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Cannot access '{path}'")]
    FileAccessError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid value for '{field}' in case '{case_id}': {value:?}")]
    ParseError {
        case_id: String,
        field: String,
        value: String,
    },

    #[error("No norm row for age_band={age_band}, education_group={education_group}")]
    MissingNormError {
        age_band: String,
        education_group: String,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Data,
    Norms,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl KwabError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            KwabError::IoError(_) | KwabError::FileAccessError { .. } => ErrorCategory::Io,
            KwabError::CsvError(_) | KwabError::ParseError { .. } => ErrorCategory::Data,
            KwabError::MissingNormError { .. } => ErrorCategory::Norms,
            KwabError::ConfigError { .. }
            | KwabError::ConfigValidationError { .. }
            | KwabError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    /// Every error aborts the run; severity only selects the exit code.
    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Norms => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            KwabError::IoError(_) | KwabError::FileAccessError { .. } => {
                "Check that the input and norm CSV files exist and are readable".to_string()
            }
            KwabError::CsvError(_) => {
                "Check the CSV header row and that every row has all required columns".to_string()
            }
            KwabError::ParseError { field, .. } => {
                format!("Make sure '{}' holds a decimal number", field)
            }
            KwabError::MissingNormError { .. } => {
                "Add the missing (age_band, education_years) row to the norm table".to_string()
            }
            KwabError::ConfigError { .. }
            | KwabError::ConfigValidationError { .. }
            | KwabError::InvalidConfigValueError { .. } => {
                "Review the command line flags and the TOML config file".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            KwabError::ParseError {
                case_id,
                field,
                value,
            } => format!(
                "Case '{}' has a non-numeric {}: {:?}",
                case_id, field, value
            ),
            KwabError::MissingNormError {
                age_band,
                education_group,
            } => format!(
                "The norm table has no entry for age band {} with education group {}",
                age_band, education_group
            ),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, KwabError>;
