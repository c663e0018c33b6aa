use hindsight_capture::{
    CaptureController, CaptureError, MediaPort, SourceRouter, StreamHandle, VisionPort,
    VisionRequest,
};
use hindsight_core::Config;

pub struct FakeMedia;

impl MediaPort for FakeMedia {
    fn acquire_stream(&mut self) -> Result<StreamHandle, CaptureError> {
        Ok(StreamHandle("fake-display".to_string()))
    }

    fn release_stream(&mut self, _stream: StreamHandle) {}
}

pub struct FakeRouter;

impl SourceRouter for FakeRouter {
    fn install(&mut self, _stream: &StreamHandle) {}
    fn restore(&mut self) {}
}

pub struct FakeVision;

impl VisionPort for FakeVision {
    fn connect(&mut self, _request: &VisionRequest) -> Result<(), CaptureError> {
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), CaptureError> {
        Ok(())
    }
}

pub fn controller() -> CaptureController {
    CaptureController::new(
        Config::new(),
        Box::new(FakeMedia),
        Box::new(FakeRouter),
        Box::new(FakeVision),
    )
}
