//! Voice transcript intake.
//!
//! A speech recognizer (external) produces interim guesses that get replaced,
//! and final segments that are committed. Only committed text ever becomes an
//! answer. Producers push through a [`TranscriptSink`]; the consumer drains a
//! [`TranscriptSubscription`] until the producer hangs up or the subscription
//! is cancelled.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "text", rename_all = "snake_case")]
pub enum TranscriptEvent {
    /// Provisional text for the utterance in progress; superseded by the next event.
    Interim(String),
    /// Committed text for a finished utterance.
    Final(String),
}

/// Accumulates committed segments. Interim guesses are held until the next event replaces them.
#[derive(Debug, Default, Clone)]
pub struct TranscriptBuffer {
    committed: Vec<String>,
    interim: String,
}

impl TranscriptBuffer {
    pub fn push(&mut self, event: TranscriptEvent) {
        match event {
            TranscriptEvent::Interim(text) => self.interim = text,
            TranscriptEvent::Final(text) => {
                self.interim.clear();
                let text = text.trim();
                if !text.is_empty() {
                    self.committed.push(text.to_string());
                }
            }
        }
    }

    /// Committed text, segments joined by single spaces.
    pub fn committed_text(&self) -> String {
        self.committed.join(" ")
    }
}

/// Producer half. Dropping every sink ends the subscription.
#[derive(Clone)]
pub struct TranscriptSink {
    tx: mpsc::Sender<TranscriptEvent>,
}

impl TranscriptSink {
    /// Returns false once the subscription is gone.
    pub async fn send(&self, event: TranscriptEvent) -> bool {
        self.tx.send(event).await.is_ok()
    }
}

/// Stops a subscription from another task.
#[derive(Clone)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

pub struct TranscriptSubscription {
    rx: mpsc::Receiver<TranscriptEvent>,
    cancelled: watch::Receiver<bool>,
    cancel: CancelHandle,
    buffer: TranscriptBuffer,
}

/// Creates a bounded sink/subscription pair.
pub fn channel(capacity: usize) -> (TranscriptSink, TranscriptSubscription) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let (cancel_tx, cancelled) = watch::channel(false);
    (
        TranscriptSink { tx },
        TranscriptSubscription {
            rx,
            cancelled,
            cancel: CancelHandle { tx: cancel_tx },
            buffer: TranscriptBuffer::default(),
        },
    )
}

impl TranscriptSubscription {
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Drains events until the producer closes or the subscription is cancelled,
    /// then returns the committed text. Interim text still pending is discarded.
    pub async fn collect_final(mut self) -> String {
        loop {
            if *self.cancelled.borrow() {
                debug!("Transcript subscription cancelled");
                break;
            }
            tokio::select! {
                event = self.rx.recv() => match event {
                    Some(event) => self.buffer.push(event),
                    None => break,
                },
                changed = self.cancelled.changed() => {
                    if changed.is_err() || *self.cancelled.borrow() {
                        debug!("Transcript subscription cancelled");
                        break;
                    }
                }
            }
        }
        self.rx.close();
        if !self.buffer.interim.is_empty() {
            debug!(
                "Dropping {} chars of uncommitted interim text",
                self.buffer.interim.len()
            );
        }
        self.buffer.committed_text()
    }

    /// Like [`collect_final`](Self::collect_final), but cancels itself once
    /// `limit` elapses and returns whatever was committed by then.
    pub async fn collect_final_within(self, limit: Duration) -> String {
        let cancel = self.cancel_handle();
        let deadline = tokio::spawn(async move {
            tokio::time::sleep(limit).await;
            warn!("Transcript not closed within {limit:?}, cancelling");
            cancel.cancel();
        });
        let text = self.collect_final().await;
        deadline.abort();
        text
    }
}
