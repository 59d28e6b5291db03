//! A bounded queue realized on a native bounded channel.
//!
//! `crossbeam_channel::bounded` already provides everything the queue needs:
//! a fixed capacity, FIFO delivery, blocking, non-blocking and timed access,
//! and `Select` to wait on the channel and a [`CancelToken`] at once. The
//! queue owns both ends, so the channel never disconnects.

use crate::cancel::CancelToken;
use crate::error::{EnqueueError, QueueError};

use std::fmt;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Select, SendTimeoutError, Sender};

/// A fixed-capacity MPMC queue backed by a crossbeam channel.
pub struct ChannelQueue<T> {
  capacity: usize,
  tx: Sender<T>,
  rx: Receiver<T>,
}

impl<T> ChannelQueue<T> {
  /// Creates a queue holding at most `capacity` elements.
  ///
  /// # Panics
  ///
  /// Panics if `capacity` is 0 (that would be a rendezvous channel, not a
  /// queue).
  pub fn new(capacity: usize) -> Self {
    assert!(capacity > 0, "bounded queue capacity must be greater than 0");
    let (tx, rx) = crossbeam_channel::bounded(capacity);
    Self { capacity, tx, rx }
  }

  /// Stores `value`, blocking while the queue is full, until `cancel` fires.
  pub fn enqueue(&self, cancel: &CancelToken, value: T) -> Result<(), EnqueueError<T>> {
    if let Err(kind) = cancel.check() {
      return Err(EnqueueError::new(kind, value));
    }

    let mut sel = Select::new();
    let send_op = sel.send(&self.tx);
    let cancel_op = sel.recv(cancel.done());

    let oper = match cancel.deadline() {
      Some(deadline) => match sel.select_deadline(deadline) {
        Ok(oper) => oper,
        Err(_) => {
          tracing::debug!("channel enqueue deadline exceeded");
          return Err(EnqueueError::new(QueueError::DeadlineExceeded, value));
        }
      },
      None => sel.select(),
    };

    match oper.index() {
      i if i == send_op => oper
        .send(&self.tx, value)
        .map_err(|err| EnqueueError::new(QueueError::QueueFull, err.into_inner())),
      i => {
        debug_assert_eq!(i, cancel_op);
        // Completes the selected operation; it always reports disconnection.
        let _ = oper.recv(cancel.done());
        tracing::debug!("channel enqueue cancelled");
        Err(EnqueueError::new(QueueError::Cancelled, value))
      }
    }
  }

  /// Stores `value` only if there is room right now.
  pub fn try_enqueue(&self, value: T) -> Result<(), EnqueueError<T>> {
    self
      .tx
      .try_send(value)
      .map_err(|err| EnqueueError::new(QueueError::QueueFull, err.into_inner()))
  }

  /// Stores `value`, waiting at most `timeout` for room.
  pub fn try_enqueue_timeout(&self, value: T, timeout: Duration) -> Result<(), EnqueueError<T>> {
    self.tx.send_timeout(value, timeout).map_err(|err| match err {
      SendTimeoutError::Timeout(value) | SendTimeoutError::Disconnected(value) => {
        EnqueueError::new(QueueError::QueueFull, value)
      }
    })
  }

  /// Removes the oldest element, blocking while the queue is empty, until
  /// `cancel` fires.
  pub fn dequeue(&self, cancel: &CancelToken) -> Result<T, QueueError> {
    cancel.check()?;

    let mut sel = Select::new();
    let recv_op = sel.recv(&self.rx);
    let cancel_op = sel.recv(cancel.done());

    let oper = match cancel.deadline() {
      Some(deadline) => sel.select_deadline(deadline).map_err(|_| {
        tracing::debug!("channel dequeue deadline exceeded");
        QueueError::DeadlineExceeded
      })?,
      None => sel.select(),
    };

    match oper.index() {
      i if i == recv_op => oper.recv(&self.rx).map_err(|_| QueueError::QueueEmpty),
      i => {
        debug_assert_eq!(i, cancel_op);
        let _ = oper.recv(cancel.done());
        tracing::debug!("channel dequeue cancelled");
        Err(QueueError::Cancelled)
      }
    }
  }

  /// Removes the oldest element only if one is available right now.
  pub fn try_dequeue(&self) -> Result<T, QueueError> {
    self.rx.try_recv().map_err(|_| QueueError::QueueEmpty)
  }

  /// Removes the oldest element, waiting at most `timeout` for one.
  pub fn try_dequeue_timeout(&self, timeout: Duration) -> Result<T, QueueError> {
    self.rx.recv_timeout(timeout).map_err(|err| match err {
      RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected => QueueError::QueueEmpty,
    })
  }

  /// Number of buffered elements.
  pub fn size(&self) -> usize {
    self.rx.len()
  }

  /// The fixed limit given at construction.
  #[inline]
  pub fn capacity(&self) -> usize {
    self.capacity
  }

  /// Returns `true` if no element is buffered.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.rx.is_empty()
  }

  /// Returns `true` if the buffer holds `capacity` elements.
  #[inline]
  pub fn is_full(&self) -> bool {
    self.tx.is_full()
  }
}

impl<T> fmt::Debug for ChannelQueue<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ChannelQueue")
      .field("capacity", &self.capacity)
      .field("size", &self.rx.len())
      .finish()
  }
}
