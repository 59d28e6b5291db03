//! The contract shared by every bounded queue realization.

use crate::bounded::BoundedQueue;
use crate::cancel::CancelToken;
use crate::channel::ChannelQueue;
use crate::error::{EnqueueError, QueueError};
use crate::fifo::Fifo;

use std::time::Duration;

/// A bounded FIFO queue with blocking, non-blocking and timed access.
///
/// Implemented by [`BoundedQueue`] and [`ChannelQueue`] so callers can pick a
/// realization at runtime, e.g. behind `Arc<dyn LimitedQueue<T>>`.
pub trait LimitedQueue<T>: Send + Sync {
  /// Stores `value`, blocking while full, until `cancel` fires.
  fn enqueue(&self, cancel: &CancelToken, value: T) -> Result<(), EnqueueError<T>>;

  /// Stores `value` only if there is room right now.
  fn try_enqueue(&self, value: T) -> Result<(), EnqueueError<T>>;

  /// Stores `value`, waiting at most `timeout` for room.
  fn try_enqueue_timeout(&self, value: T, timeout: Duration) -> Result<(), EnqueueError<T>>;

  /// Removes the oldest element, blocking while empty, until `cancel` fires.
  fn dequeue(&self, cancel: &CancelToken) -> Result<T, QueueError>;

  /// Removes the oldest element only if one is available right now.
  fn try_dequeue(&self) -> Result<T, QueueError>;

  /// Removes the oldest element, waiting at most `timeout` for one.
  fn try_dequeue_timeout(&self, timeout: Duration) -> Result<T, QueueError>;

  /// The fixed construction-time limit.
  fn capacity(&self) -> usize;

  /// Number of stored elements right now.
  fn size(&self) -> usize;
}

impl<T, F> LimitedQueue<T> for BoundedQueue<T, F>
where
  T: Send,
  F: Fifo<T> + Send,
{
  fn enqueue(&self, cancel: &CancelToken, value: T) -> Result<(), EnqueueError<T>> {
    BoundedQueue::enqueue(self, cancel, value)
  }

  fn try_enqueue(&self, value: T) -> Result<(), EnqueueError<T>> {
    BoundedQueue::try_enqueue(self, value)
  }

  fn try_enqueue_timeout(&self, value: T, timeout: Duration) -> Result<(), EnqueueError<T>> {
    BoundedQueue::try_enqueue_timeout(self, value, timeout)
  }

  fn dequeue(&self, cancel: &CancelToken) -> Result<T, QueueError> {
    BoundedQueue::dequeue(self, cancel)
  }

  fn try_dequeue(&self) -> Result<T, QueueError> {
    BoundedQueue::try_dequeue(self)
  }

  fn try_dequeue_timeout(&self, timeout: Duration) -> Result<T, QueueError> {
    BoundedQueue::try_dequeue_timeout(self, timeout)
  }

  fn capacity(&self) -> usize {
    BoundedQueue::capacity(self)
  }

  fn size(&self) -> usize {
    BoundedQueue::size(self)
  }
}

impl<T: Send> LimitedQueue<T> for ChannelQueue<T> {
  fn enqueue(&self, cancel: &CancelToken, value: T) -> Result<(), EnqueueError<T>> {
    ChannelQueue::enqueue(self, cancel, value)
  }

  fn try_enqueue(&self, value: T) -> Result<(), EnqueueError<T>> {
    ChannelQueue::try_enqueue(self, value)
  }

  fn try_enqueue_timeout(&self, value: T, timeout: Duration) -> Result<(), EnqueueError<T>> {
    ChannelQueue::try_enqueue_timeout(self, value, timeout)
  }

  fn dequeue(&self, cancel: &CancelToken) -> Result<T, QueueError> {
    ChannelQueue::dequeue(self, cancel)
  }

  fn try_dequeue(&self) -> Result<T, QueueError> {
    ChannelQueue::try_dequeue(self)
  }

  fn try_dequeue_timeout(&self, timeout: Duration) -> Result<T, QueueError> {
    ChannelQueue::try_dequeue_timeout(self, timeout)
  }

  fn capacity(&self) -> usize {
    ChannelQueue::capacity(self)
  }

  fn size(&self) -> usize {
    ChannelQueue::size(self)
  }
}
