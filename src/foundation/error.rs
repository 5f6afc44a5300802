/// Result alias used across the crate.
pub type FlightResult<T> = Result<T, FlightError>;

/// Every failure the pipeline can report.
///
/// Failures are scoped to a single export attempt; none of them leave partial artifacts behind.
#[derive(thiserror::Error, Debug)]
pub enum FlightError {
    /// Caller contract violation detected at a boundary.
    #[error("validation error: {0}")]
    Validation(String),

    /// A required asset (marker icon, watermark image, font) failed to load or timed out.
    #[error("asset load error: {0}")]
    AssetLoad(String),

    /// The capture stream or recorder failed.
    #[error("capture error: {0}")]
    Capture(String),

    /// The encode engine failed to load, write, execute or read back.
    #[error("encode error: {0}")]
    Encode(String),

    /// A recording session is already active on this recorder.
    #[error("a recording session is already in progress")]
    Busy,

    /// The caller cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,

    /// Anything else, usually I/O with context attached.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FlightError {
    /// Build a [`FlightError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FlightError::AssetLoad`].
    pub fn asset_load(msg: impl Into<String>) -> Self {
        Self::AssetLoad(msg.into())
    }

    /// Build a [`FlightError::Capture`].
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture(msg.into())
    }

    /// Build a [`FlightError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Return `true` for [`FlightError::Cancelled`].
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
