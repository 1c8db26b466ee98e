//! Collector client for surface snapshots and question updates.
//!
//! Both flows are fire-and-forget: each request runs on its own background
//! thread, logs its outcome and reports it as a [`SyncEvent`]. Events are
//! collected and must be polled via [`SyncClient::poll_events`].

mod http;
mod memory;

pub use http::HttpTransport;
pub use memory::MemoryTransport;

use crate::capture::{encode_png, CaptureError, RasterSnapshot};
use crate::config::RetryPolicy;
use crate::label::QuestionLabel;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use thiserror::Error;

/// Path of the image upload endpoint.
pub const IMAGE_ENDPOINT: &str = "/image";
/// Path of the question update endpoint.
pub const QUESTION_ENDPOINT: &str = "/setQuestion";
/// Multipart field carrying the PNG.
pub const IMAGE_FIELD: &str = "image";
/// File name sent with the PNG.
pub const IMAGE_FILENAME: &str = "canvas.png";

/// Sync errors.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Invalid collector URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Collector responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Capture failed: {0}")]
    Capture(#[from] CaptureError),
}

/// JSON body of a question update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionUpdate {
    pub question: QuestionLabel,
}

/// Outcome of a background request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// The snapshot was accepted by the collector.
    ImageUploaded { bytes: usize },
    /// Encoding or upload failed; the snapshot is dropped.
    ImageFailed { message: String },
    /// The collector accepted the question.
    QuestionAccepted { question: QuestionLabel },
    /// The question update failed.
    QuestionRejected { question: QuestionLabel, message: String },
}

/// Something that can deliver payloads to the collector.
///
/// Calls block; [`SyncClient`] runs them off the event-handling thread.
pub trait Transport: Send + Sync {
    /// Deliver an encoded PNG.
    fn post_image(&self, png: &[u8]) -> Result<(), SyncError>;

    /// Deliver a question update.
    fn post_question(&self, update: &QuestionUpdate) -> Result<(), SyncError>;
}

type Waker = Arc<dyn Fn() + Send + Sync>;

/// Dispatches uploads to detached worker threads.
pub struct SyncClient {
    transport: Arc<dyn Transport>,
    retry: RetryPolicy,
    event_tx: Sender<SyncEvent>,
    event_rx: Receiver<SyncEvent>,
    /// Called after each event is queued, to wake the owner's event loop.
    waker: Option<Waker>,
    in_flight: Arc<AtomicUsize>,
}

impl SyncClient {
    /// Create a client over a transport. Failed requests are not retried.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let (event_tx, event_rx) = channel();
        Self {
            transport,
            retry: RetryPolicy::none(),
            event_tx,
            event_rx,
            waker: None,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Set the retry policy for both flows.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set a callback invoked whenever an event becomes available.
    pub fn with_waker(mut self, waker: impl Fn() + Send + Sync + 'static) -> Self {
        self.waker = Some(Arc::new(waker));
        self
    }

    /// Number of requests still running.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Encode `snapshot` and upload it in the background.
    ///
    /// The returned handle may be dropped; the request keeps running.
    pub fn upload_snapshot(&self, snapshot: RasterSnapshot) -> JoinHandle<()> {
        let transport = self.transport.clone();
        let retry = self.retry;
        self.spawn(move || {
            let png = match encode_png(&snapshot) {
                Ok(png) => png,
                Err(e) => {
                    log::error!("Failed to encode surface: {}", e);
                    return SyncEvent::ImageFailed { message: e.to_string() };
                }
            };

            match with_retry(retry, "Image upload", || transport.post_image(&png)) {
                Ok(()) => {
                    log::info!("Upload success: {} bytes", png.len());
                    SyncEvent::ImageUploaded { bytes: png.len() }
                }
                Err(e) => {
                    log::error!("Upload failed: {}", e);
                    SyncEvent::ImageFailed { message: e.to_string() }
                }
            }
        })
    }

    /// Send a question update in the background.
    pub fn submit_question(&self, question: QuestionLabel) -> JoinHandle<()> {
        let transport = self.transport.clone();
        let retry = self.retry;
        self.spawn(move || {
            let update = QuestionUpdate { question };
            match with_retry(retry, "Question update", || transport.post_question(&update)) {
                Ok(()) => {
                    log::info!("Question updated: {}", update.question);
                    SyncEvent::QuestionAccepted { question: update.question }
                }
                Err(e) => {
                    log::error!("Failed to update question: {}", e);
                    SyncEvent::QuestionRejected {
                        question: update.question,
                        message: e.to_string(),
                    }
                }
            }
        })
    }

    /// Drain all events received since the last poll.
    pub fn poll_events(&self) -> Vec<SyncEvent> {
        self.event_rx.try_iter().collect()
    }

    fn spawn(&self, job: impl FnOnce() -> SyncEvent + Send + 'static) -> JoinHandle<()> {
        let event_tx = self.event_tx.clone();
        let waker = self.waker.clone();
        let in_flight = self.in_flight.clone();
        in_flight.fetch_add(1, Ordering::SeqCst);

        thread::spawn(move || {
            let event = job();
            in_flight.fetch_sub(1, Ordering::SeqCst);
            // Owner may be gone already
            let _ = event_tx.send(event);
            if let Some(waker) = waker {
                waker();
            }
        })
    }
}

/// Run `attempt` until it succeeds or the policy is exhausted.
fn with_retry<T>(
    policy: RetryPolicy,
    what: &str,
    mut attempt: impl FnMut() -> Result<T, SyncError>,
) -> Result<T, SyncError> {
    let mut n = 1;
    loop {
        match attempt() {
            Ok(value) => return Ok(value),
            Err(e) if n < policy.max_attempts => {
                let delay = policy.backoff(n);
                log::warn!(
                    "{} attempt {}/{} failed: {}; retrying in {:?}",
                    what, n, policy.max_attempts, e, delay
                );
                thread::sleep(delay);
                n += 1;
            }
            Err(e) => {
                if policy.max_attempts > 1 {
                    log::error!("{} dropped after {} attempts", what, n);
                }
                return Err(e);
            }
        }
    }
}
