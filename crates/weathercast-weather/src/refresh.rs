//! Background cache warming.
//!
//! Postal codes submitted to a [`RefreshQueue`] are fetched by a single
//! [`RefreshWorker`] and written into the same keyspace the request path
//! reads. Requests never wait on the worker.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::fetcher::WeatherFetcher;

/// Handle for enqueueing refresh jobs. Cheap to clone.
#[derive(Debug, Clone)]
pub struct RefreshQueue {
    tx: mpsc::UnboundedSender<String>,
}

impl RefreshQueue {
    /// Enqueue a refresh. Returns false if the worker has stopped.
    pub fn submit(&self, postal_code: impl Into<String>) -> bool {
        let postal_code = postal_code.into();
        let trimmed = postal_code.trim();
        if trimmed.is_empty() {
            tracing::debug!("Ignoring blank refresh request");
            return false;
        }

        match self.tx.send(trimmed.to_string()) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Refresh worker gone, dropping {}", e.0);
                false
            }
        }
    }
}

pub struct RefreshWorker {
    fetcher: Arc<WeatherFetcher>,
    rx: mpsc::UnboundedReceiver<String>,
}

impl RefreshWorker {
    /// Drain the queue until every [`RefreshQueue`] handle is dropped.
    /// Returns the number of successful refreshes.
    pub async fn run(mut self) -> usize {
        let mut refreshed = 0;

        while let Some(postal_code) = self.rx.recv().await {
            let outcome = self.fetcher.refresh(&postal_code).await;
            match outcome.error() {
                None => {
                    refreshed += 1;
                    tracing::info!("Refreshed weather for {}", postal_code);
                }
                Some(e) => tracing::warn!("Refresh for {} failed: {}", postal_code, e),
            }
        }

        tracing::debug!("Refresh queue closed after {} refreshes", refreshed);
        refreshed
    }

    pub fn spawn(self) -> JoinHandle<usize> {
        tokio::spawn(self.run())
    }
}

/// Create a connected queue and worker for `fetcher`.
pub fn refresh_channel(fetcher: Arc<WeatherFetcher>) -> (RefreshQueue, RefreshWorker) {
    let (tx, rx) = mpsc::unbounded_channel();
    (RefreshQueue { tx }, RefreshWorker { fetcher, rx })
}
