//! Session capture lifecycle state machine

use crate::ports::{MediaPort, SourceRouter, StreamHandle, VisionPort, VisionRequest};
use hindsight_core::{now_ms, payload_text, Config, Observation};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Lifecycle status of a capture session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStatus {
    Ready,
    Initializing,
    Recording,
    Reconnecting,
    Stopping,
    Error,
    ConnectionLost,
}

/// A scheduled reconnect attempt tied to one session generation.
///
/// The driver that owns the clock waits `delay_ms`, then calls
/// [`CaptureController::fire_retry`] with the recorded generation; a stale
/// generation makes the firing a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRetry {
    pub generation: u64,
    pub delay_ms: u64,
}

/// Drives one recording session: start, streaming, bounded auto-reconnect,
/// and stop. Owns the raw observation buffer until `stop` hands it back.
pub struct CaptureController {
    config: Config,
    media: Box<dyn MediaPort>,
    router: Box<dyn SourceRouter>,
    vision: Box<dyn VisionPort>,
    status: CaptureStatus,
    retry_count: u32,
    generation: u64,
    buffer: Vec<Observation>,
    stream: Option<StreamHandle>,
    redirect_installed: bool,
    pending_retry: Option<PendingRetry>,
    live_text: Option<String>,
    status_message: Option<String>,
}

impl CaptureController {
    pub fn new(
        config: Config,
        media: Box<dyn MediaPort>,
        router: Box<dyn SourceRouter>,
        vision: Box<dyn VisionPort>,
    ) -> Self {
        Self {
            config,
            media,
            router,
            vision,
            status: CaptureStatus::Ready,
            retry_count: 0,
            generation: 0,
            buffer: Vec::new(),
            stream: None,
            redirect_installed: false,
            pending_retry: None,
            live_text: None,
            status_message: None,
        }
    }

    pub fn status(&self) -> CaptureStatus {
        self.status
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    /// Most recent observation text, for live display
    pub fn live_text(&self) -> Option<&str> {
        self.live_text.as_deref()
    }

    /// User-visible message after a terminal connection loss
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// Start (or retry) a capture session.
    ///
    /// Already `Recording` is a no-op success: no second pipeline, no double
    /// stream acquisition. A fresh start opens a new session generation and
    /// replaces the observation buffer; a retry attempt (entered while
    /// `Reconnecting`) keeps both. Returns false when resources cannot be
    /// acquired, with everything released and no redirect left installed.
    pub fn start(&mut self) -> bool {
        match self.status {
            CaptureStatus::Recording => return true,
            CaptureStatus::Initializing | CaptureStatus::Stopping => {
                debug!("start ignored while {:?}", self.status);
                return false;
            }
            CaptureStatus::Reconnecting => {
                debug!(
                    "reconnect attempt {}/{}",
                    self.retry_count, self.config.max_reconnect_attempts
                );
            }
            CaptureStatus::Ready | CaptureStatus::Error | CaptureStatus::ConnectionLost => {
                self.generation += 1;
                self.retry_count = 0;
                self.buffer = Vec::new();
                self.status_message = None;
                self.status = CaptureStatus::Initializing;
            }
        }

        let stream = match self.stream.clone() {
            Some(stream) => stream,
            None => match self.media.acquire_stream() {
                Ok(stream) => {
                    self.stream = Some(stream.clone());
                    stream
                }
                Err(err) => {
                    warn!("stream acquisition failed: {err}");
                    self.fail_start();
                    return false;
                }
            },
        };

        if !self.redirect_installed {
            self.router.install(&stream);
            self.redirect_installed = true;
        }

        let request = VisionRequest {
            prompt: self.config.vision_prompt.clone(),
            source: stream,
        };
        if let Err(err) = self.vision.connect(&request) {
            warn!("vision connection failed: {err}");
            self.fail_start();
            return false;
        }

        info!("capture session recording (generation {})", self.generation);
        self.status = CaptureStatus::Recording;
        true
    }

    /// Invoked by the vision collaborator once per detected result.
    pub fn handle_observation(&mut self, payload: Value) {
        if self.status != CaptureStatus::Recording {
            debug!("observation dropped while {:?}", self.status);
            return;
        }
        let text = payload_text(&payload);
        self.buffer.push(Observation::new(now_ms(), payload));
        self.retry_count = 0;
        self.live_text = Some(text);
    }

    /// Invoked by the vision collaborator on connection failure.
    ///
    /// A stream-not-found class error below the retry cap schedules a flat
    /// 1 s reconnect; everything else is terminal for the session.
    pub fn handle_error(&mut self, message: &str) {
        if matches!(self.status, CaptureStatus::Ready | CaptureStatus::Stopping) {
            debug!("connection error ignored while {:?}: {message}", self.status);
            return;
        }

        if is_stream_not_found(message) && self.retry_count < self.config.max_reconnect_attempts {
            self.retry_count += 1;
            if let Err(err) = self.vision.disconnect() {
                debug!("vision disconnect before reconnect failed: {err}");
            }
            self.status = CaptureStatus::Reconnecting;
            self.pending_retry = Some(PendingRetry {
                generation: self.generation,
                delay_ms: self.config.reconnect_delay_ms,
            });
            warn!(
                "transient stream error, reconnect {}/{} scheduled: {message}",
                self.retry_count, self.config.max_reconnect_attempts
            );
        } else {
            self.pending_retry = None;
            self.status = CaptureStatus::ConnectionLost;
            self.status_message = Some(
                "Connection to the vision service was lost. Start a new recording to continue."
                    .to_string(),
            );
            warn!("connection lost: {message}");
        }
    }

    /// Hand the scheduled retry to the driver that owns the clock.
    pub fn take_pending_retry(&mut self) -> Option<PendingRetry> {
        self.pending_retry.take()
    }

    /// Fire a scheduled reconnect. A stale generation or a session that has
    /// since left `Reconnecting` (stopped, errored, or already recovered)
    /// makes this a no-op returning false.
    pub fn fire_retry(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.status != CaptureStatus::Reconnecting {
            debug!("stale reconnect timer ignored (generation {generation})");
            return false;
        }
        self.pending_retry = None;
        self.start()
    }

    /// Stop the session and return the accumulated observation buffer.
    ///
    /// Safe from any state and never panics: all teardown is best-effort,
    /// the source redirect is restored exactly once, and any pending
    /// reconnect is cancelled by advancing the session generation. The
    /// buffer itself is replaced on the next fresh `start`.
    pub fn stop(&mut self) -> Vec<Observation> {
        self.status = CaptureStatus::Stopping;

        if let Err(err) = self.vision.disconnect() {
            debug!("vision disconnect during stop failed: {err}");
        }
        if let Some(stream) = self.stream.take() {
            self.media.release_stream(stream);
        }
        if self.redirect_installed {
            self.router.restore();
            self.redirect_installed = false;
        }

        self.live_text = None;
        self.status_message = None;
        self.pending_retry = None;
        self.generation += 1;
        self.retry_count = 0;
        self.status = CaptureStatus::Ready;

        info!("capture stopped with {} observations", self.buffer.len());
        self.buffer.clone()
    }

    /// Release everything a failed `start` acquired and mark the session errored.
    fn fail_start(&mut self) {
        if let Some(stream) = self.stream.take() {
            self.media.release_stream(stream);
        }
        if self.redirect_installed {
            self.router.restore();
            self.redirect_installed = false;
        }
        self.pending_retry = None;
        self.status = CaptureStatus::Error;
    }
}

/// Match the transient stream-not-found error class regardless of the
/// collaborator's exact spelling (NotFoundError, stream_not_found, ...).
fn is_stream_not_found(message: &str) -> bool {
    let normalized: String = message
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect();
    normalized.contains("notfound")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CaptureError;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Default)]
    struct PortLog {
        acquired: usize,
        released: usize,
        installs: usize,
        restores: usize,
        connects: usize,
        disconnects: usize,
    }

    struct TestMedia {
        log: Rc<RefCell<PortLog>>,
        fail: bool,
    }

    impl MediaPort for TestMedia {
        fn acquire_stream(&mut self) -> Result<StreamHandle, CaptureError> {
            if self.fail {
                return Err(CaptureError::StreamUnavailable("permission denied".into()));
            }
            let mut log = self.log.borrow_mut();
            log.acquired += 1;
            Ok(StreamHandle(format!("stream-{}", log.acquired)))
        }

        fn release_stream(&mut self, _stream: StreamHandle) {
            self.log.borrow_mut().released += 1;
        }
    }

    struct TestRouter {
        log: Rc<RefCell<PortLog>>,
    }

    impl SourceRouter for TestRouter {
        fn install(&mut self, _stream: &StreamHandle) {
            self.log.borrow_mut().installs += 1;
        }

        fn restore(&mut self) {
            self.log.borrow_mut().restores += 1;
        }
    }

    struct TestVision {
        log: Rc<RefCell<PortLog>>,
        fail_connect: bool,
    }

    impl VisionPort for TestVision {
        fn connect(&mut self, _request: &VisionRequest) -> Result<(), CaptureError> {
            self.log.borrow_mut().connects += 1;
            if self.fail_connect {
                return Err(CaptureError::ConnectionFailed("refused".into()));
            }
            Ok(())
        }

        fn disconnect(&mut self) -> Result<(), CaptureError> {
            self.log.borrow_mut().disconnects += 1;
            Ok(())
        }
    }

    fn controller_with(
        media_fail: bool,
        vision_fail: bool,
    ) -> (CaptureController, Rc<RefCell<PortLog>>) {
        let log = Rc::new(RefCell::new(PortLog::default()));
        let controller = CaptureController::new(
            Config::new(),
            Box::new(TestMedia {
                log: log.clone(),
                fail: media_fail,
            }),
            Box::new(TestRouter { log: log.clone() }),
            Box::new(TestVision {
                log: log.clone(),
                fail_connect: vision_fail,
            }),
        );
        (controller, log)
    }

    fn controller() -> (CaptureController, Rc<RefCell<PortLog>>) {
        controller_with(false, false)
    }

    #[test]
    fn test_start_reaches_recording() {
        let (mut ctl, log) = controller();
        assert!(ctl.start());
        assert_eq!(ctl.status(), CaptureStatus::Recording);
        let log = log.borrow();
        assert_eq!(log.acquired, 1);
        assert_eq!(log.installs, 1);
        assert_eq!(log.connects, 1);
    }

    #[test]
    fn test_start_twice_is_noop_success() {
        let (mut ctl, log) = controller();
        assert!(ctl.start());
        assert!(ctl.start());
        assert_eq!(log.borrow().acquired, 1);
        assert_eq!(log.borrow().connects, 1);
    }

    #[test]
    fn test_stream_acquisition_failure() {
        let (mut ctl, log) = controller_with(true, false);
        assert!(!ctl.start());
        assert_eq!(ctl.status(), CaptureStatus::Error);
        // Nothing was acquired, so nothing to release or restore
        assert_eq!(log.borrow().released, 0);
        assert_eq!(log.borrow().restores, 0);
    }

    #[test]
    fn test_vision_failure_releases_everything() {
        let (mut ctl, log) = controller_with(false, true);
        assert!(!ctl.start());
        assert_eq!(ctl.status(), CaptureStatus::Error);
        let log = log.borrow();
        assert_eq!(log.released, 1);
        assert_eq!(log.installs, 1);
        assert_eq!(log.restores, 1);
    }

    #[test]
    fn test_start_again_after_error() {
        let (mut ctl, log) = controller_with(true, false);
        assert!(!ctl.start());
        assert_eq!(ctl.status(), CaptureStatus::Error);

        // Error is not absorbing for an explicit fresh start
        assert!(!ctl.start());
        assert_eq!(ctl.status(), CaptureStatus::Error);
        assert_eq!(log.borrow().acquired, 0);
        assert_eq!(log.borrow().restores, 0);
    }

    #[test]
    fn test_observation_buffered_and_live_text() {
        let (mut ctl, _log) = controller();
        ctl.start();
        ctl.handle_observation(json!("writing code"));
        ctl.handle_observation(json!({"result": "running tests"}));
        assert_eq!(ctl.buffer_len(), 2);
        assert_eq!(ctl.live_text(), Some(r#"{"result":"running tests"}"#));
    }

    #[test]
    fn test_observation_dropped_when_not_recording() {
        let (mut ctl, _log) = controller();
        ctl.handle_observation(json!("too early"));
        assert_eq!(ctl.buffer_len(), 0);
    }

    #[test]
    fn test_observation_resets_retry_counter() {
        let (mut ctl, _log) = controller();
        ctl.start();
        ctl.handle_error("NotFoundError: stream gone");
        let retry = ctl.take_pending_retry().unwrap();
        assert!(ctl.fire_retry(retry.generation));
        assert_eq!(ctl.retry_count(), 1);

        ctl.handle_observation(json!("recovered"));
        assert_eq!(ctl.retry_count(), 0);

        // The next drop starts counting from scratch
        ctl.handle_error("NotFoundError: stream gone");
        assert_eq!(ctl.retry_count(), 1);
    }

    #[test]
    fn test_transient_error_schedules_flat_delay() {
        let (mut ctl, _log) = controller();
        ctl.start();
        ctl.handle_error("stream_not_found");
        assert_eq!(ctl.status(), CaptureStatus::Reconnecting);
        let retry = ctl.take_pending_retry().unwrap();
        assert_eq!(retry.delay_ms, 1000);
        assert_eq!(retry.generation, ctl.generation());
    }

    #[test]
    fn test_non_transient_error_is_terminal() {
        let (mut ctl, _log) = controller();
        ctl.start();
        ctl.handle_error("quota exceeded");
        assert_eq!(ctl.status(), CaptureStatus::ConnectionLost);
        assert!(ctl.status_message().is_some());
        assert!(ctl.take_pending_retry().is_none());
    }

    #[test]
    fn test_retry_cap_exhausts_after_three() {
        let (mut ctl, log) = controller();
        ctl.start();

        // Four consecutive transient drops with no good observation between
        for _ in 0..3 {
            ctl.handle_error("NotFoundError");
            assert_eq!(ctl.status(), CaptureStatus::Reconnecting);
            let retry = ctl.take_pending_retry().unwrap();
            assert!(ctl.fire_retry(retry.generation));
            assert_eq!(ctl.status(), CaptureStatus::Recording);
        }
        assert_eq!(ctl.retry_count(), 3);

        ctl.handle_error("NotFoundError");
        assert_eq!(ctl.status(), CaptureStatus::ConnectionLost);
        assert!(ctl.take_pending_retry().is_none());

        // Initial connect plus exactly three reconnects
        assert_eq!(log.borrow().connects, 4);
    }

    #[test]
    fn test_stop_from_ready_is_safe() {
        let (mut ctl, log) = controller();
        let observations = ctl.stop();
        assert!(observations.is_empty());
        assert_eq!(ctl.status(), CaptureStatus::Ready);
        assert_eq!(log.borrow().restores, 0);
        assert_eq!(log.borrow().released, 0);
    }

    #[test]
    fn test_stop_returns_buffer_and_next_start_replaces_it() {
        let (mut ctl, _log) = controller();
        ctl.start();
        ctl.handle_observation(json!("one"));
        ctl.handle_observation(json!("two"));

        let observations = ctl.stop();
        assert_eq!(observations.len(), 2);
        assert_eq!(ctl.status(), CaptureStatus::Ready);

        ctl.start();
        assert_eq!(ctl.buffer_len(), 0);
    }

    #[test]
    fn test_stop_restores_redirect_exactly_once() {
        let (mut ctl, log) = controller();
        ctl.start();
        ctl.stop();
        ctl.stop();
        assert_eq!(log.borrow().installs, 1);
        assert_eq!(log.borrow().restores, 1);
        assert_eq!(log.borrow().released, 1);
    }

    #[test]
    fn test_stop_cancels_pending_retry() {
        let (mut ctl, log) = controller();
        ctl.start();
        ctl.handle_error("NotFoundError");
        let retry = ctl.take_pending_retry().unwrap();

        ctl.stop();
        let connects_before = log.borrow().connects;

        // The timer fires after the user already stopped: provably a no-op
        assert!(!ctl.fire_retry(retry.generation));
        assert_eq!(ctl.status(), CaptureStatus::Ready);
        assert_eq!(log.borrow().connects, connects_before);
    }

    #[test]
    fn test_retry_generation_guard_across_sessions() {
        let (mut ctl, _log) = controller();
        ctl.start();
        ctl.handle_error("NotFoundError");
        let stale = ctl.take_pending_retry().unwrap();

        // User stops and immediately starts a new session
        ctl.stop();
        ctl.start();
        assert_eq!(ctl.status(), CaptureStatus::Recording);

        // The old session's timer must not disturb the new one
        assert!(!ctl.fire_retry(stale.generation));
        assert_eq!(ctl.status(), CaptureStatus::Recording);
    }

    #[test]
    fn test_reconnect_keeps_buffer() {
        let (mut ctl, _log) = controller();
        ctl.start();
        ctl.handle_observation(json!("before the drop"));
        ctl.handle_error("NotFoundError");
        let retry = ctl.take_pending_retry().unwrap();
        assert!(ctl.fire_retry(retry.generation));
        assert_eq!(ctl.buffer_len(), 1);
    }

    #[test]
    fn test_live_text_cleared_on_stop() {
        let (mut ctl, _log) = controller();
        ctl.start();
        ctl.handle_observation(json!("visible"));
        assert!(ctl.live_text().is_some());
        ctl.stop();
        assert!(ctl.live_text().is_none());
    }

    #[test]
    fn test_not_found_spellings() {
        assert!(is_stream_not_found("NotFoundError: Requested device not found"));
        assert!(is_stream_not_found("stream not found"));
        assert!(is_stream_not_found("STREAM_NOT_FOUND"));
        assert!(!is_stream_not_found("network timeout"));
        assert!(!is_stream_not_found("unauthorized"));
    }
}
