//! In-memory transport.

use super::{QuestionUpdate, SyncError, Transport};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Records payloads instead of sending them. For tests and offline use.
#[derive(Default)]
pub struct MemoryTransport {
    images: Mutex<Vec<Vec<u8>>>,
    questions: Mutex<Vec<String>>,
    failing: AtomicBool,
    attempts: AtomicUsize,
}

impl MemoryTransport {
    /// Create a new empty transport that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following request fail with a 503.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// PNG payloads accepted so far.
    pub fn images(&self) -> Vec<Vec<u8>> {
        self.images.lock().map(|images| images.clone()).unwrap_or_default()
    }

    /// Questions accepted so far.
    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().map(|q| q.clone()).unwrap_or_default()
    }

    /// Requests received, successful or not.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), SyncError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(SyncError::Status {
                status: 503,
                body: "collector offline".to_string(),
            });
        }
        Ok(())
    }
}

impl Transport for MemoryTransport {
    fn post_image(&self, png: &[u8]) -> Result<(), SyncError> {
        self.check()?;
        if let Ok(mut images) = self.images.lock() {
            images.push(png.to_vec());
        }
        Ok(())
    }

    fn post_question(&self, update: &QuestionUpdate) -> Result<(), SyncError> {
        self.check()?;
        if let Ok(mut questions) = self.questions.lock() {
            questions.push(update.question.to_string());
        }
        Ok(())
    }
}
