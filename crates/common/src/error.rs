/// ragstore error types
#[derive(Debug, thiserror::Error)]
pub enum RagStoreError {
    /// Vector length differs from the store's established dimension
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Zero-norm vector met during a similarity computation
    #[error("Degenerate vector: {0}")]
    DegenerateVector(String),

    /// Provider could not be reached (connection refused, timeout)
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Provider was reached but the call failed
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// Not enough entries for the requested operation
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Id already present and duplicates are rejected
    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// General error (anyhow integration)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RagStoreError {
    /// Create dimension mismatch error
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }

    /// Create degenerate vector error
    pub fn degenerate_vector<S: Into<String>>(msg: S) -> Self {
        Self::DegenerateVector(msg.into())
    }

    /// Create provider unavailable error
    pub fn provider_unavailable<S: Into<String>>(msg: S) -> Self {
        Self::ProviderUnavailable(msg.into())
    }

    /// Create provider error
    pub fn provider<S: Into<String>>(msg: S) -> Self {
        Self::ProviderError(msg.into())
    }

    /// Create insufficient data error
    pub fn insufficient_data<S: Into<String>>(msg: S) -> Self {
        Self::InsufficientData(msg.into())
    }

    /// Create config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Whether the failure came from an external provider
    pub fn is_provider_failure(&self) -> bool {
        matches!(self, Self::ProviderUnavailable(_) | Self::ProviderError(_))
    }

    /// Process exit code used by the CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidInput(_) | Self::Config(_) | Self::Json(_) => 2,
            Self::ProviderUnavailable(_) => 3,
            Self::ProviderError(_) => 4,
            Self::DimensionMismatch { .. }
            | Self::DegenerateVector(_)
            | Self::InsufficientData(_)
            | Self::DuplicateId(_) => 5,
            Self::Io(_) | Self::Other(_) => 1,
        }
    }
}
