/// All application errors, categorized by domain.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ── Configuration ──
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Board / Network ──
    #[error("Board request failed: {0}")]
    BoardRequest(String),

    #[error("Board returned status {status} for {url}")]
    BoardStatus { status: u16, url: String },

    #[error("Unexpected board payload: {0}")]
    BoardPayload(String),

    // ── Dataset ──
    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Record cap exceeded: limit is {limit}")]
    CapExceeded { limit: usize },

    // ── Export ──
    #[error("Failed to read file: {0}")]
    FileRead(String),

    #[error("Failed to write file: {0}")]
    FileWrite(String),

    // ── Serialization ──
    #[error("Serialization error: {0}")]
    Serialization(String),

    // ── General ──
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable code, logged next to the message.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidConfig(_) => "INVALID_CONFIG",
            AppError::BoardRequest(_) => "BOARD_REQUEST",
            AppError::BoardStatus { .. } => "BOARD_STATUS",
            AppError::BoardPayload(_) => "BOARD_PAYLOAD",
            AppError::Dataset(_) => "DATASET",
            AppError::CapExceeded { .. } => "CAP_EXCEEDED",
            AppError::FileRead(_) => "FILE_READ",
            AppError::FileWrite(_) => "FILE_WRITE",
            AppError::Serialization(_) => "SERIALIZATION",
            AppError::Internal(_) => "INTERNAL",
        }
    }
}

// ── Conversions from external errors ──

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::BoardRequest(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::FileRead(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::FileWrite(err.to_string())
    }
}

impl From<polars::error::PolarsError> for AppError {
    fn from(err: polars::error::PolarsError) -> Self {
        AppError::Dataset(err.to_string())
    }
}
