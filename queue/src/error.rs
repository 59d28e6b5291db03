// src/error.rs

use core::fmt;

/// The failure kinds shared by every queue in this crate.
///
/// All of them are recoverable: a failed call never leaves a queue in a
/// partially updated state, and no operation retries on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum QueueError {
  /// `remove_front` was called on an unbounded storage holding no elements.
  #[error("queue is empty")]
  EmptyQueue,
  /// A non-blocking or timeout-bounded enqueue found no free slot.
  #[error("queue is full")]
  QueueFull,
  /// A non-blocking or timeout-bounded dequeue found no element.
  #[error("queue has no items available")]
  QueueEmpty,
  /// The caller's `CancelToken` was cancelled while the operation waited.
  #[error("operation cancelled")]
  Cancelled,
  /// The caller's `CancelToken` deadline passed while the operation waited.
  #[error("deadline exceeded")]
  DeadlineExceeded,
  /// `peek_min` or `extract_min` was called on an empty heap.
  #[error("heap is empty")]
  EmptyHeap,
}

/// Error returned by the enqueue family when the value could not be stored.
///
/// The rejected value travels back to the caller so it can be retried or
/// disposed of.
#[derive(PartialEq, Eq, Clone)]
pub struct EnqueueError<T> {
  kind: QueueError,
  value: T,
}

impl<T> EnqueueError<T> {
  pub(crate) fn new(kind: QueueError, value: T) -> Self {
    Self { kind, value }
  }

  /// Why the value was rejected.
  #[inline]
  pub fn kind(&self) -> QueueError {
    self.kind
  }

  /// Consumes the error, returning the rejected value.
  #[inline]
  pub fn into_inner(self) -> T {
    self.value
  }

  /// Splits the error into its kind and the rejected value.
  #[inline]
  pub fn into_parts(self) -> (QueueError, T) {
    (self.kind, self.value)
  }
}

impl<T> fmt::Debug for EnqueueError<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "EnqueueError::{:?}(..)", self.kind)
  }
}

impl<T> fmt::Display for EnqueueError<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Display::fmt(&self.kind, f)
  }
}

impl<T: fmt::Debug> std::error::Error for EnqueueError<T> {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    Some(&self.kind)
  }
}

impl<T> From<EnqueueError<T>> for QueueError {
  fn from(err: EnqueueError<T>) -> Self {
    err.kind
  }
}

/// Errors that can occur when building a queue from a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
  /// The queue was configured with a capacity of zero. A bounded queue needs
  /// at least one slot.
  #[error("bounded queue capacity cannot be zero")]
  ZeroCapacity,
}
