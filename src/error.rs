use std::io;

// QR error
//------------------------------------------------------------------------------

/// Errors produced while turning a [`Request`](crate::Request) into an image.
///
/// Most variants describe requests that simply cannot be encoded with the chosen
/// options. Those are expected while a user is typing and travel back through the
/// normal result channel. [`QRError::Internal`] is reserved for broken contracts
/// and stops the worker.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QRError {
    // Validation
    #[error("Data too long for the selected version and error correction level")]
    DataTooLong,
    #[error("Invalid version {0}, expected a number between 1 and 40")]
    InvalidVersion(u16),
    #[error("Invalid scale {0}, expected a positive number")]
    InvalidScale(u32),
    #[error("Invalid character for {0} mode")]
    InvalidChar(&'static str),
    #[error("Invalid error correction level {0:?}")]
    InvalidECLevel(String),
    #[error("Invalid mode {0:?}")]
    InvalidMode(String),
    #[error("Rendered image would be {0} pixels, which exceeds the limit")]
    ImageTooLarge(u64),

    // Output
    #[error("Image error: {0}")]
    Image(String),

    // Contract violation
    #[error("Internal encoder error: {0}")]
    Internal(String),
}

impl QRError {
    /// Returns true for failures caused by the request's contents or options.
    ///
    /// These are reported to the user and never terminate the worker.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::Internal(_) | Self::Image(_))
    }
}

impl From<image::ImageError> for QRError {
    fn from(err: image::ImageError) -> Self {
        Self::Image(err.to_string())
    }
}

impl From<io::Error> for QRError {
    fn from(err: io::Error) -> Self {
        Self::Image(err.to_string())
    }
}

pub type QRResult<T> = Result<T, QRError>;

// Pipeline error
//------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The mailbox was closed, either by shutdown or because the worker died.
    #[error("Pipeline is closed")]
    Closed,

    #[error("Failed to spawn generation worker: {0}")]
    Spawn(#[from] io::Error),

    /// The worker hit a programming error and unwound.
    #[error("Generation worker panicked: {0}")]
    WorkerPanicked(String),
}
