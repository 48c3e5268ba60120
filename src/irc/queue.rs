use super::Message;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// The hand-off between the reader task and whoever calls `fetch`
#[derive(Debug, Default)]
pub struct Queue {
    inner: Mutex<Vec<Message>>,
}

impl Queue {
    pub fn push(&self, msg: Message) {
        self.lock().push(msg)
    }

    /// Takes everything queued since the last call, oldest first
    pub fn fetch(&self) -> Vec<Message> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // a panic while holding this lock can't leave the vec half-updated
    fn lock(&self) -> MutexGuard<'_, Vec<Message>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
