//! Collaborator ports for the capture pipeline.
//!
//! The external media, redirect, and vision collaborators are modeled as
//! narrow capability traits so the state machine can be driven with local
//! implementations in tests and replay tooling.

use crate::error::CaptureError;

/// Opaque handle to an acquired display stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamHandle(pub String);

/// Connection request handed to the vision collaborator
#[derive(Debug, Clone)]
pub struct VisionRequest {
    /// Per-interval observation prompt
    pub prompt: String,
    /// Source stream the collaborator should read from
    pub source: StreamHandle,
}

/// Display-media acquisition collaborator
pub trait MediaPort {
    fn acquire_stream(&mut self) -> Result<StreamHandle, CaptureError>;

    /// Stop and release an acquired stream. Must not fail.
    fn release_stream(&mut self, stream: StreamHandle);
}

/// Process-wide redirect of the camera-input entry point.
///
/// Only one install may be active at a time; `restore` puts the original
/// behavior back and must tolerate being called when nothing is installed.
pub trait SourceRouter {
    fn install(&mut self, stream: &StreamHandle);
    fn restore(&mut self);
}

/// Streaming vision collaborator.
///
/// `disconnect` is treated as best-effort by the controller: a failure to
/// close the remote side never blocks local teardown. Disconnecting an
/// unconnected port is a no-op.
pub trait VisionPort {
    fn connect(&mut self, request: &VisionRequest) -> Result<(), CaptureError>;
    fn disconnect(&mut self) -> Result<(), CaptureError>;
}
