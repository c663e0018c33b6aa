//! Capture failure taxonomy

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    /// The display stream could not be acquired
    #[error("capture stream unavailable: {0}")]
    StreamUnavailable(String),

    /// The vision connection could not be opened
    #[error("vision connection failed: {0}")]
    ConnectionFailed(String),

    /// The remote reported the source stream missing mid-session
    #[error("stream not found: {0}")]
    StreamNotFound(String),
}
