//! Session capture state machine and collaborator ports

mod controller;
mod error;
mod ports;

pub use controller::{CaptureController, CaptureStatus, PendingRetry};
pub use error::CaptureError;
pub use ports::{MediaPort, SourceRouter, StreamHandle, VisionPort, VisionRequest};
