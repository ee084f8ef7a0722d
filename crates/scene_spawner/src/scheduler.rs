//! Next-tick Task Queue
//!
//! Single-consumer queue drained once per tick on the update thread.
//! Producers may live on any thread; they only ever enqueue.
//!
//! - FIFO by enqueue order
//! - every item is handed out at most once
//! - items enqueued while a drain is being processed wait for the next tick
//! - once closed, nothing is accepted and producers see their sends fail

use crossbeam::channel::{unbounded, Receiver, Sender};

/// Producer side of a [`TickQueue`]
#[derive(Debug)]
pub struct TickSender<T> {
    sender: Sender<T>,
}

impl<T> Clone for TickSender<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T> TickSender<T> {
    /// Enqueue an item for the next tick
    ///
    /// Returns `false` when the queue has been closed or dropped; the item is
    /// discarded.
    pub fn schedule(&self, item: T) -> bool {
        self.sender.send(item).is_ok()
    }
}

/// Consumer side; owned by whoever runs on the update thread
#[derive(Debug)]
pub struct TickQueue<T> {
    sender: Sender<T>,
    receiver: Option<Receiver<T>>,
}

impl<T> Default for TickQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TickQueue<T> {
    /// Create an empty queue
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            sender,
            receiver: Some(receiver),
        }
    }

    /// Get a producer handle
    pub fn sender(&self) -> TickSender<T> {
        TickSender {
            sender: self.sender.clone(),
        }
    }

    /// Enqueue from the consumer's own thread
    ///
    /// Items scheduled after [`close`](Self::close) are dropped.
    pub fn schedule(&self, item: T) {
        if self.sender.send(item).is_err() {
            log::trace!("Tick queue closed; dropping item");
        }
    }

    /// Take every item queued before this call
    pub fn drain(&self) -> Vec<T> {
        let Some(receiver) = &self.receiver else {
            return Vec::new();
        };
        let pending = receiver.len();
        receiver.try_iter().take(pending).collect()
    }

    /// Number of queued items
    pub fn len(&self) -> usize {
        self.receiver.as_ref().map_or(0, Receiver::len)
    }

    /// Whether nothing is queued
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether [`close`](Self::close) has run
    pub fn is_closed(&self) -> bool {
        self.receiver.is_none()
    }

    /// Drop every queued item and stop accepting new ones
    ///
    /// Returns how many items were dropped. Later calls return `0`.
    pub fn close(&mut self) -> usize {
        self.receiver.take().map_or(0, |receiver| receiver.try_iter().count())
    }
}
