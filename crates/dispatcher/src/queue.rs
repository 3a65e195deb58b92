//! Bounded drop-newest queue
//!
//! `try_enqueue` never waits: it either accepts the item or hands back
//! `false` and the item is gone. Items already queued are never evicted.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Create a queue holding at most `capacity` items (minimum 1)
pub fn bounded<T>(capacity: usize) -> (QueueSender<T>, QueueReceiver<T>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (QueueSender { tx }, QueueReceiver { rx })
}

/// Producer side; cheap to clone, any number of producers
#[derive(Debug)]
pub struct QueueSender<T> {
    tx: mpsc::Sender<T>,
}

impl<T> Clone for QueueSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> QueueSender<T> {
    /// Offer one item; true = accepted, false = dropped
    pub fn try_enqueue(&self, item: T) -> bool {
        self.tx.try_send(item).is_ok()
    }

    /// Items currently queued
    pub fn len(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fixed capacity
    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }

    /// True once the consumer is gone
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer side; owned by exactly one worker
#[derive(Debug)]
pub struct QueueReceiver<T> {
    rx: mpsc::Receiver<T>,
}

impl<T> QueueReceiver<T> {
    /// Wait for the next item; None once every producer is gone and the queue is empty
    pub async fn dequeue(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Wait for the next item or cancellation, whichever comes first
    ///
    /// Cancellation wins when both are ready, so a cancelled worker never
    /// takes another item.
    pub async fn dequeue_or_cancel(&mut self, cancel: &CancellationToken) -> Option<T> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            item = self.rx.recv() => item,
        }
    }

    /// Items currently queued
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
