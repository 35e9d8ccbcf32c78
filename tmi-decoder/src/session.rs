//! Background decode session
//!
//! A session owns the metadata for one viewer and runs at most one decode at a
//! time on a worker thread. Completion is delivered over a channel, so the thread
//! that owns the display state can poll or block on it as it sees fit. Finished
//! outcomes are shared read-only through `Arc`.

use crate::config::DecoderConfig;
use crate::decoder::{decode_with, Decoder};
use crate::frame_decoder::{CancelFlag, DecodeOutcome};
use crate::types::{DecoderError, Result};
use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Completion value of a background decode
pub type DecodeResult = Result<Arc<DecodeOutcome>>;

/// Decode session holding shared metadata and the in-flight guard
#[derive(Debug, Default)]
pub struct DecodeSession {
    decoder: Decoder,
    in_flight: Arc<AtomicBool>,
}

/// Clears the session's in-flight flag when dropped
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl DecodeSession {
    pub fn new(decoder: Decoder) -> Self {
        Self {
            decoder,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Metadata the session decodes against
    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    /// True while a decode started by this session is running
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Start decoding a capture on a background thread
    ///
    /// Fails with [`DecoderError::DecodeInProgress`] if a decode started by this
    /// session has not finished yet.
    pub fn start(&self, path: impl Into<PathBuf>, config: DecoderConfig) -> Result<DecodeTask> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            log::warn!("Rejected decode request: another decode is in progress");
            return Err(DecoderError::DecodeInProgress);
        }
        let guard = InFlightGuard(Arc::clone(&self.in_flight));

        let path = path.into();
        let catalog = self.decoder.shared_catalog();
        let dimensions = self.decoder.shared_dimensions();
        let cancel = CancelFlag::new();
        let worker_cancel = cancel.clone();
        let (sender, receiver) = crossbeam_channel::bounded(1);

        log::debug!("Starting background decode of {:?}", path);

        let handle = thread::Builder::new()
            .name("tmi-decode".to_string())
            .spawn(move || {
                let result = decode_with(&path, &dimensions, &catalog, &config, &worker_cancel)
                    .map(Arc::new);
                if let Err(e) = &result {
                    log::error!("Background decode of {:?} failed: {}", path, e);
                }
                // Release the session before reporting so the receiver can start again
                drop(guard);
                // The task may have been dropped; nobody is waiting then
                let _ = sender.send(result);
            })?;

        Ok(DecodeTask {
            cancel,
            receiver,
            handle: Some(handle),
        })
    }
}

/// Handle to one running background decode
///
/// Dropping the handle cancels the decode.
pub struct DecodeTask {
    cancel: CancelFlag,
    receiver: Receiver<DecodeResult>,
    handle: Option<JoinHandle<()>>,
}

impl DecodeTask {
    /// Request cooperative cancellation; takes effect at the next frame boundary
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Poll for the result without blocking
    ///
    /// Returns `Some` exactly once, when the worker has reported.
    pub fn try_result(&mut self) -> Option<DecodeResult> {
        match self.receiver.try_recv() {
            Ok(result) => {
                self.join();
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                if self.handle.is_none() {
                    return None;
                }
                self.join();
                Some(Err(DecoderError::WorkerLost))
            }
        }
    }

    /// Wait up to `timeout` for the result
    ///
    /// Like [`DecodeTask::try_result`], returns `None` once the result has been taken.
    pub fn wait_timeout(&mut self, timeout: Duration) -> Option<DecodeResult> {
        match self.receiver.recv_timeout(timeout) {
            Ok(result) => {
                self.join();
                Some(result)
            }
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                if self.handle.is_none() {
                    return None;
                }
                self.join();
                Some(Err(DecoderError::WorkerLost))
            }
        }
    }

    /// Block until the decode completes
    pub fn wait(mut self) -> DecodeResult {
        let result = self
            .receiver
            .recv()
            .unwrap_or(Err(DecoderError::WorkerLost));
        self.join();
        result
    }

    fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Decode worker panicked");
            }
        }
    }
}

impl Drop for DecodeTask {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.cancel.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Capture of `count` Long frames, large enough to still be decoding while
    /// the test inspects the task
    fn long_capture(count: u32) -> tempfile::NamedTempFile {
        let mut frame = vec![1u8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 4, 0];
        frame.extend_from_slice(&7i32.to_le_bytes());
        let bytes: Vec<u8> = (0..count).flat_map(|_| frame.iter().copied()).collect();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&bytes).unwrap();
        file.flush().unwrap();
        file
    }

    fn poll_until_done(task: &mut DecodeTask) -> DecodeResult {
        loop {
            if let Some(result) = task.try_result() {
                return result;
            }
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_missing_file_reports_error() {
        let session = DecodeSession::new(Decoder::new());
        let task = session.start("missing.tmi", DecoderConfig::new()).unwrap();
        assert!(matches!(task.wait(), Err(DecoderError::CaptureRead { .. })));
        assert!(!session.is_busy());
    }

    #[test]
    fn test_busy_session_rejects_second_start_until_cancelled() {
        let capture = long_capture(500_000);
        let session = DecodeSession::new(Decoder::new());

        let task = session.start(capture.path(), DecoderConfig::new()).unwrap();
        assert!(session.is_busy());

        let second = session.start(capture.path(), DecoderConfig::new());
        assert!(matches!(second, Err(DecoderError::DecodeInProgress)));

        task.cancel();
        assert!(matches!(task.wait(), Err(DecoderError::Cancelled)));
        assert!(!session.is_busy());

        let again = session.start(capture.path(), DecoderConfig::new()).unwrap();
        again.cancel();
        assert!(matches!(again.wait(), Err(DecoderError::Cancelled)));
    }

    #[test]
    fn test_try_result_before_completion() {
        let capture = long_capture(500_000);
        let session = DecodeSession::new(Decoder::new());

        let mut task = session.start(capture.path(), DecoderConfig::new()).unwrap();
        assert!(task.try_result().is_none());
        assert!(!task.is_finished());

        task.cancel();
        assert!(matches!(poll_until_done(&mut task), Err(DecoderError::Cancelled)));
        assert!(task.is_finished());
    }

    #[test]
    fn test_result_is_delivered_once() {
        let capture = long_capture(10);
        let session = DecodeSession::new(Decoder::new());

        let mut task = session.start(capture.path(), DecoderConfig::new()).unwrap();
        let outcome = poll_until_done(&mut task).unwrap();
        assert_eq!(outcome.stats.useful_frames(), 10);
        assert!(task.is_finished());

        assert!(task.try_result().is_none());
        assert!(task.wait_timeout(Duration::from_millis(10)).is_none());
        assert!(task.try_result().is_none());
    }

    #[test]
    fn test_wait_timeout_delivers_outcome() {
        let capture = long_capture(3);
        let session = DecodeSession::new(Decoder::new());

        let mut task = session.start(capture.path(), DecoderConfig::new()).unwrap();
        let result = loop {
            if let Some(result) = task.wait_timeout(Duration::from_millis(50)) {
                break result;
            }
        };
        assert_eq!(result.unwrap().index.total_records(), 3);
        assert!(task.wait_timeout(Duration::from_millis(1)).is_none());
        assert!(!session.is_busy());
    }
}
