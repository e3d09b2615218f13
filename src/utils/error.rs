use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiagnosisError {
    #[error("Identification request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Identification service returned HTTP {status}: {body}")]
    TransportError { status: u16, body: String },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Image error: {message}")]
    ImageError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Data,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// 根據錯誤嚴重程度決定 CLI 退出碼
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Medium => 2,   // 重試錯誤
            ErrorSeverity::High => 1,     // 處理錯誤
            ErrorSeverity::Critical => 3, // 系統錯誤
        }
    }
}

impl DiagnosisError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DiagnosisError::HttpError(_) | DiagnosisError::TransportError { .. } => {
                ErrorCategory::Network
            }
            DiagnosisError::ConfigError { .. }
            | DiagnosisError::ConfigValidationError { .. }
            | DiagnosisError::InvalidConfigValueError { .. }
            | DiagnosisError::MissingConfigError { .. } => ErrorCategory::Configuration,
            DiagnosisError::SerializationError(_)
            | DiagnosisError::CsvError(_)
            | DiagnosisError::ImageError { .. } => ErrorCategory::Data,
            DiagnosisError::ZipError(_) | DiagnosisError::IoError(_) => ErrorCategory::Storage,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 上游服務暫時性問題，可以重試
            DiagnosisError::HttpError(_) => ErrorSeverity::Medium,
            DiagnosisError::TransportError { status, .. } if *status >= 500 || *status == 429 => {
                ErrorSeverity::Medium
            }
            DiagnosisError::TransportError { .. } => ErrorSeverity::High,
            DiagnosisError::ImageError { .. }
            | DiagnosisError::SerializationError(_)
            | DiagnosisError::CsvError(_) => ErrorSeverity::High,
            DiagnosisError::ConfigError { .. }
            | DiagnosisError::ConfigValidationError { .. }
            | DiagnosisError::InvalidConfigValueError { .. }
            | DiagnosisError::MissingConfigError { .. } => ErrorSeverity::High,
            DiagnosisError::ZipError(_) | DiagnosisError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            DiagnosisError::HttpError(_) => {
                "Check network connectivity and the identification endpoint, then retry".to_string()
            }
            DiagnosisError::TransportError { status, .. } => match status {
                401 | 403 => "Verify the KINDWISE_API_KEY value and its remaining credits".to_string(),
                413 => "Reduce the image size before uploading".to_string(),
                429 => "Lower --concurrent-requests or wait before retrying".to_string(),
                s if *s >= 500 => "The identification service is unavailable, retry later".to_string(),
                _ => "Inspect the response body for the rejected request field".to_string(),
            },
            DiagnosisError::ImageError { .. } => {
                "Upload a non-empty JPEG or PNG photo of a single leaf".to_string()
            }
            DiagnosisError::SerializationError(_) | DiagnosisError::CsvError(_) => {
                "Re-run with --verbose to inspect the offending payload".to_string()
            }
            DiagnosisError::ConfigError { .. }
            | DiagnosisError::ConfigValidationError { .. }
            | DiagnosisError::InvalidConfigValueError { .. } => {
                "Fix the configuration value and run again".to_string()
            }
            DiagnosisError::MissingConfigError { field } => {
                format!("Provide '{}' via flag, config file or environment", field)
            }
            DiagnosisError::ZipError(_) | DiagnosisError::IoError(_) => {
                "Check that the input and output directories exist and are writable".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            DiagnosisError::HttpError(_) => "Could not reach the plant identification service".to_string(),
            DiagnosisError::TransportError { status, .. } => {
                format!("The plant identification service rejected the request (HTTP {})", status)
            }
            DiagnosisError::ImageError { message } => format!("Image problem: {}", message),
            DiagnosisError::MissingConfigError { field } => {
                format!("Missing required setting: {}", field)
            }
            DiagnosisError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting '{}': {}", field, reason)
            }
            DiagnosisError::ConfigValidationError { field, message } => {
                format!("Invalid setting '{}': {}", field, message)
            }
            DiagnosisError::ConfigError { message } => format!("Configuration problem: {}", message),
            other => other.to_string(),
        }
    }

    /// Transport failures are the only errors a batch tolerates per image.
    pub fn is_transport(&self) -> bool {
        self.category() == ErrorCategory::Network
    }
}

pub type Result<T> = std::result::Result<T, DiagnosisError>;
