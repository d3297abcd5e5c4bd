use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Input file not found: {message}")]
    InputNotFound { message: String },

    #[error("Schema error: {message}")]
    Schema { message: String },

    #[error("Data format error: {message}")]
    DataFormat { message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Spreadsheet processing error: {0}")]
    XlsxError(#[from] calamine::XlsxError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Schema,
    Data,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AuditError {
    pub fn input_not_found(message: impl Into<String>) -> Self {
        Self::InputNotFound {
            message: message.into(),
        }
    }

    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    pub fn data_format(message: impl Into<String>) -> Self {
        Self::DataFormat {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InputNotFound { .. } => ErrorCategory::Input,
            Self::Schema { .. } => ErrorCategory::Schema,
            Self::DataFormat { .. } | Self::CsvError(_) | Self::XlsxError(_) => ErrorCategory::Data,
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            Self::IoError(_) | Self::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::System => ErrorSeverity::Critical,
            _ => match self {
                Self::CsvError(_) | Self::XlsxError(_) => ErrorSeverity::Critical,
                _ => ErrorSeverity::High,
            },
        }
    }

    /// Process exit code for a run that ended with this error.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::InputNotFound { message } => format!("Could not resolve the fare data file: {}", message),
            Self::Schema { message } => format!("The fare data file has an unexpected layout: {}", message),
            Self::DataFormat { message } => format!("Not enough usable fare data: {}", message),
            Self::CsvError(e) => format!("The CSV file could not be read: {}", e),
            Self::XlsxError(e) => format!("The spreadsheet could not be read: {}", e),
            Self::IoError(e) => format!("File system error: {}", e),
            Self::SerializationError(e) => format!("Chart data could not be serialized: {}", e),
            Self::ConfigError { message } => format!("Configuration problem: {}", message),
            Self::InvalidConfigValueError {
                field,
                value,
                reason,
            } => format!("Setting '{}' has invalid value '{}': {}", field, value, reason),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::InputNotFound { .. } => {
                "Place exactly one air_fares*.csv or air_fares*.xlsx file in the data directory, or pass --input"
            }
            Self::Schema { .. } => {
                "Check that the file has Real Business Class and Real Restricted Economy columns"
            }
            Self::DataFormat { .. } => {
                "Check that the Month column holds dates and at least two months carry index values"
            }
            Self::CsvError(_) | Self::XlsxError(_) => {
                "Re-download the fare index publication; the file may be truncated or saved in another format"
            }
            Self::IoError(_) => "Check file permissions and free disk space in the data directory",
            Self::SerializationError(_) => "Report this as a bug together with the input file",
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                "Fix the command line flags or the TOML configuration file and rerun"
            }
        }
    }
}

impl From<toml::de::Error> for AuditError {
    fn from(e: toml::de::Error) -> Self {
        Self::ConfigError {
            message: format!("TOML parsing error: {}", e),
        }
    }
}

pub type Result<T> = std::result::Result<T, AuditError>;
