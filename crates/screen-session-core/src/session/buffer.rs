use crate::capture::{Chunk, ChunkSender};

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, error, warn};

/// Default capacity of the capture → session chunk channel.
pub const DEFAULT_CHUNK_CAPACITY: usize = 64;

/// Consumer side of the bounded chunk channel for one recording attempt.
///
/// A background task drains the channel into an owned, append-only list
/// until the capture drops its sender.
pub(crate) struct ChunkCollector {
    chunks: Arc<Mutex<Vec<Chunk>>>,
    task: JoinHandle<()>,
}

fn lock(chunks: &Mutex<Vec<Chunk>>) -> MutexGuard<'_, Vec<Chunk>> {
    chunks.lock().unwrap_or_else(|e| {
        error!("Chunk buffer lock poisoned, recovering: {}", e);
        e.into_inner()
    })
}

impl ChunkCollector {
    /// Open a channel of `capacity` and start draining it.
    pub(crate) fn spawn(capacity: usize) -> (ChunkSender, Self) {
        let (tx, mut rx) = mpsc::channel::<Chunk>(capacity.max(1));
        let chunks = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&chunks);

        let task = tokio::spawn(async move {
            while let Some(chunk) = rx.recv().await {
                if chunk.is_empty() {
                    continue;
                }
                let mut buf = lock(&sink);
                buf.push(chunk);
                debug!(chunk_count = buf.len(), "Chunk buffered");
            }
            debug!("Chunk channel closed");
        });

        (tx, Self { chunks, task })
    }

    /// Chunks collected so far.
    pub(crate) fn len(&self) -> usize {
        lock(&self.chunks).len()
    }

    /// Wait for the capture to close the channel, then hand over the chunks.
    ///
    /// If the channel is still open after `timeout`, collection is cut short
    /// and whatever arrived so far is returned.
    pub(crate) async fn finish(self, timeout: Duration) -> Vec<Chunk> {
        let abort = self.task.abort_handle();
        match tokio::time::timeout(timeout, self.task).await {
            Ok(Ok(())) => debug!("Chunk collector finished"),
            Ok(Err(e)) => warn!(error = ?e, "Chunk collector task failed"),
            Err(_) => {
                warn!(
                    timeout_ms = timeout.as_millis(),
                    "Capture did not close its chunk channel, collection cut short"
                );
                abort.abort();
            }
        }

        std::mem::take(&mut *lock(&self.chunks))
    }

    /// Stop collecting and drop everything collected.
    pub(crate) fn abort(self) {
        self.task.abort();
        lock(&self.chunks).clear();
    }
}
