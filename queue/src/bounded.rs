//! The bounded, backpressure-aware queue.
//!
//! A [`BoundedQueue`] wraps one [`Fifo`] storage with a fixed capacity and a
//! pair of counting permits:
//!
//! - `capacity_available`: free slots. Producers take one before storing and
//!   consumers give one back after removing.
//! - `items_available`: stored elements. Consumers take one before removing
//!   and producers give one back after storing.
//!
//! Outside an in-flight operation the two counts add up to the capacity and
//! `items_available` equals the number of stored elements. The storage lock
//! is only held for the storage mutation itself, never while waiting for a
//! permit, so a blocked producer does not stall consumers and vice versa.
//!
//! The permits bound how many producers and consumers are in flight; the
//! storage lock fixes the real order of elements. Whatever order producers
//! were admitted in, elements leave in the order they were appended.

use crate::cancel::CancelToken;
use crate::coord::PermitGate;
use crate::error::{EnqueueError, QueueError};
use crate::fifo::{Fifo, LinkedFifo, RingFifo, ShiftingFifo};

use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;

use parking_lot::Mutex;

/// A fixed-capacity, multi-producer multi-consumer FIFO queue.
///
/// Share it between threads or tasks behind an `Arc`. Blocking calls take a
/// [`CancelToken`]; async calls are cancelled by dropping their future.
/// Either way a cancelled call stores nothing, removes nothing and consumes
/// no permit.
pub struct BoundedQueue<T, F = LinkedFifo<T>> {
  capacity: usize,
  backing: Mutex<F>,
  capacity_available: PermitGate,
  items_available: PermitGate,
  _marker: PhantomData<fn() -> T>,
}

impl<T> BoundedQueue<T> {
  /// Creates a queue backed by a [`LinkedFifo`].
  ///
  /// # Panics
  ///
  /// Panics if `capacity` is 0.
  pub fn new(capacity: usize) -> Self {
    Self::with_storage(capacity, LinkedFifo::new())
  }
}

impl<T> BoundedQueue<T, RingFifo<T>> {
  /// Creates a queue backed by a [`RingFifo`] pre-sized to `capacity`, so it
  /// never grows.
  ///
  /// # Panics
  ///
  /// Panics if `capacity` is 0.
  pub fn with_ring(capacity: usize) -> Self {
    Self::with_storage(capacity, RingFifo::with_capacity(capacity))
  }
}

impl<T> BoundedQueue<T, ShiftingFifo<T>> {
  /// Creates a queue backed by the naive [`ShiftingFifo`].
  ///
  /// # Panics
  ///
  /// Panics if `capacity` is 0.
  pub fn with_shifting(capacity: usize) -> Self {
    Self::with_storage(capacity, ShiftingFifo::with_capacity(capacity))
  }
}

impl<T, F: Fifo<T>> BoundedQueue<T, F> {
  /// Creates a queue over an existing, empty storage.
  ///
  /// # Panics
  ///
  /// Panics if `capacity` is 0 or `backing` already holds elements.
  pub fn with_storage(capacity: usize, backing: F) -> Self {
    assert!(capacity > 0, "bounded queue capacity must be greater than 0");
    assert_eq!(backing.count(), 0, "backing storage must start empty");
    Self {
      capacity,
      backing: Mutex::new(backing),
      capacity_available: PermitGate::with_permits(capacity, capacity),
      items_available: PermitGate::with_permits(capacity, 0),
      _marker: PhantomData,
    }
  }

  // --- Enqueue ---

  /// Stores `value`, blocking the current thread while the queue is full.
  ///
  /// Fails with [`QueueError::Cancelled`] or [`QueueError::DeadlineExceeded`]
  /// when `cancel` fires first; the value comes back inside the error.
  pub fn enqueue(&self, cancel: &CancelToken, value: T) -> Result<(), EnqueueError<T>> {
    if let Err(kind) = self.capacity_available.acquire(cancel) {
      return Err(EnqueueError::new(kind, value));
    }
    self.store_admitted(value);
    Ok(())
  }

  /// Stores `value` only if a slot is free right now, otherwise fails with
  /// [`QueueError::QueueFull`].
  pub fn try_enqueue(&self, value: T) -> Result<(), EnqueueError<T>> {
    if !self.capacity_available.try_acquire() {
      return Err(EnqueueError::new(QueueError::QueueFull, value));
    }
    self.store_admitted(value);
    Ok(())
  }

  /// Like [`enqueue`](Self::enqueue), bounded by `timeout`. Fails with
  /// [`QueueError::QueueFull`] if no slot frees up in time.
  ///
  /// A free slot is taken immediately, so a zero timeout behaves like
  /// [`try_enqueue`](Self::try_enqueue).
  pub fn try_enqueue_timeout(&self, value: T, timeout: Duration) -> Result<(), EnqueueError<T>> {
    if self.capacity_available.try_acquire() {
      self.store_admitted(value);
      return Ok(());
    }
    self
      .enqueue(&CancelToken::with_timeout(timeout), value)
      .map_err(|err| match err.into_parts() {
        (QueueError::DeadlineExceeded, value) => EnqueueError::new(QueueError::QueueFull, value),
        (kind, value) => EnqueueError::new(kind, value),
      })
  }

  /// Stores `value`, waiting asynchronously while the queue is full.
  ///
  /// Cancel-safe: the only suspension point is the permit acquire, and the
  /// append happens in the same poll that obtains the permit. Dropping the
  /// future early drops `value` and leaves the queue untouched.
  pub async fn enqueue_async(&self, value: T) {
    self.capacity_available.acquire_async().await;
    self.store_admitted(value);
  }

  // --- Dequeue ---

  /// Removes the oldest element, blocking the current thread while the queue
  /// is empty.
  ///
  /// Fails with [`QueueError::Cancelled`] or [`QueueError::DeadlineExceeded`]
  /// when `cancel` fires first, in which case nothing is removed.
  pub fn dequeue(&self, cancel: &CancelToken) -> Result<T, QueueError> {
    self.items_available.acquire(cancel)?;
    self.take_admitted()
  }

  /// Removes the oldest element only if one is available right now,
  /// otherwise fails with [`QueueError::QueueEmpty`].
  pub fn try_dequeue(&self) -> Result<T, QueueError> {
    if !self.items_available.try_acquire() {
      return Err(QueueError::QueueEmpty);
    }
    self.take_admitted()
  }

  /// Like [`dequeue`](Self::dequeue), bounded by `timeout`. Fails with
  /// [`QueueError::QueueEmpty`] if nothing arrives in time.
  ///
  /// A stored element is taken immediately, so a zero timeout behaves like
  /// [`try_dequeue`](Self::try_dequeue).
  pub fn try_dequeue_timeout(&self, timeout: Duration) -> Result<T, QueueError> {
    if self.items_available.try_acquire() {
      return self.take_admitted();
    }
    self
      .dequeue(&CancelToken::with_timeout(timeout))
      .map_err(|err| match err {
        QueueError::DeadlineExceeded => QueueError::QueueEmpty,
        other => other,
      })
  }

  /// Removes the oldest element, waiting asynchronously while the queue is
  /// empty. Cancel-safe in the same way as [`enqueue_async`](Self::enqueue_async).
  pub async fn dequeue_async(&self) -> Result<T, QueueError> {
    self.items_available.acquire_async().await;
    self.take_admitted()
  }

  // --- Inspection ---

  /// Number of stored elements, read under the storage lock.
  pub fn size(&self) -> usize {
    self.backing.lock().count()
  }

  /// The fixed limit given at construction.
  #[inline]
  pub fn capacity(&self) -> usize {
    self.capacity
  }

  /// Returns `true` if no element is stored.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.size() == 0
  }

  /// Returns `true` if every slot is taken.
  #[inline]
  pub fn is_full(&self) -> bool {
    self.size() == self.capacity
  }

  // --- Internals ---

  /// Second half of every enqueue: the caller already holds one
  /// `capacity_available` permit.
  fn store_admitted(&self, value: T) {
    self.backing.lock().append(value);
    self.items_available.release();
  }

  /// Second half of every dequeue: the caller already holds one
  /// `items_available` permit.
  fn take_admitted(&self) -> Result<T, QueueError> {
    let value = self.backing.lock().remove_front();
    match value {
      Ok(value) => {
        self.capacity_available.release();
        Ok(value)
      }
      Err(err) => {
        tracing::error!(error = %err, "storage empty while an item permit was held");
        Err(err)
      }
    }
  }
}

impl<T, F> fmt::Debug for BoundedQueue<T, F> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("BoundedQueue")
      .field("capacity", &self.capacity)
      .field("capacity_available", &self.capacity_available)
      .field("items_available", &self.items_available)
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use futures_util::FutureExt;
  use std::sync::Arc;
  use std::thread;

  #[test]
  fn happy_path_keeps_order() {
    let queue = BoundedQueue::new(10);
    let cancel = CancelToken::new();
    for i in 0..10 {
      queue.enqueue(&cancel, i).unwrap();
    }
    assert!(queue.is_full());
    for i in 0..10 {
      assert_eq!(queue.dequeue(&cancel), Ok(i));
    }
    assert!(queue.is_empty());
  }

  #[test]
  fn permits_track_storage() {
    let queue = BoundedQueue::with_ring(3);
    queue.try_enqueue('a').unwrap();
    queue.try_enqueue('b').unwrap();
    assert_eq!(queue.items_available.available(), 2);
    assert_eq!(queue.capacity_available.available(), 1);
    assert_eq!(queue.size(), 2);

    queue.try_dequeue().unwrap();
    assert_eq!(queue.items_available.available(), 1);
    assert_eq!(queue.capacity_available.available(), 2);
  }

  #[test]
  fn try_variants_report_full_and_empty() {
    let queue = BoundedQueue::with_shifting(2);
    queue.try_enqueue(1).unwrap();
    queue.try_enqueue(2).unwrap();
    let err = queue.try_enqueue(3).unwrap_err();
    assert_eq!(err.kind(), QueueError::QueueFull);
    assert_eq!(err.into_inner(), 3);

    assert_eq!(queue.try_dequeue(), Ok(1));
    assert_eq!(queue.try_dequeue(), Ok(2));
    assert_eq!(queue.try_dequeue(), Err(QueueError::QueueEmpty));
  }

  #[test]
  fn expired_deadline_on_full_queue_stores_nothing() {
    let queue = BoundedQueue::new(1);
    queue.try_enqueue(1).unwrap();

    let expired = CancelToken::with_timeout(Duration::ZERO);
    let err = queue.enqueue(&expired, 2).unwrap_err();
    assert_eq!(err.kind(), QueueError::DeadlineExceeded);
    assert_eq!(queue.size(), 1);
    assert_eq!(queue.capacity_available.available(), 0);
  }

  #[test]
  fn cancelled_dequeue_removes_nothing() {
    let queue = Arc::new(BoundedQueue::<u32>::new(1));
    let token = CancelToken::new();

    let (consumer, consumer_token) = (queue.clone(), token.clone());
    let handle = thread::spawn(move || consumer.dequeue(&consumer_token));

    thread::sleep(Duration::from_millis(50));
    token.cancel();
    assert_eq!(handle.join().unwrap(), Err(QueueError::Cancelled));

    // The abandoned consumer must not swallow the next element.
    queue.try_enqueue(9).unwrap();
    assert_eq!(queue.try_dequeue(), Ok(9));
  }

  #[test]
  fn timeout_variants_map_to_full_and_empty() {
    let queue = BoundedQueue::new(1);
    assert_eq!(
      queue.try_dequeue_timeout(Duration::from_millis(10)),
      Err(QueueError::QueueEmpty)
    );
    queue.try_enqueue_timeout(1, Duration::from_millis(10)).unwrap();
    let err = queue
      .try_enqueue_timeout(2, Duration::from_millis(10))
      .unwrap_err();
    assert_eq!(err.kind(), QueueError::QueueFull);
    assert_eq!(queue.try_dequeue_timeout(Duration::from_millis(10)), Ok(1));
  }

  #[test]
  fn zero_timeout_uses_free_slot_and_stored_item() {
    let queue = BoundedQueue::with_ring(2);
    queue.try_enqueue_timeout(1, Duration::ZERO).unwrap();
    queue.try_enqueue_timeout(2, Duration::ZERO).unwrap();
    let err = queue.try_enqueue_timeout(3, Duration::ZERO).unwrap_err();
    assert_eq!(err.kind(), QueueError::QueueFull);

    assert_eq!(queue.try_dequeue_timeout(Duration::ZERO), Ok(1));
    assert_eq!(queue.try_dequeue_timeout(Duration::ZERO), Ok(2));
    assert_eq!(
      queue.try_dequeue_timeout(Duration::ZERO),
      Err(QueueError::QueueEmpty)
    );
    assert_eq!(queue.capacity_available.available(), 2);
  }

  #[test]
  fn explicit_expired_token_still_fails_with_room() {
    let queue = BoundedQueue::new(1);
    let err = queue
      .enqueue(&CancelToken::with_timeout(Duration::ZERO), 1)
      .unwrap_err();
    assert_eq!(err.kind(), QueueError::DeadlineExceeded);
    assert!(queue.is_empty());
  }

  #[test]
  fn dropped_enqueue_future_loses_nothing() {
    let queue = BoundedQueue::new(1);
    queue.try_enqueue(1).unwrap();

    let mut pending = Box::pin(queue.enqueue_async(2));
    assert!(pending.as_mut().now_or_never().is_none());
    drop(pending);

    assert_eq!(queue.try_dequeue(), Ok(1));
    // The slot freed above went to the pool, not to the dropped future.
    queue.try_enqueue(3).unwrap();
    assert_eq!(queue.size(), 1);
    assert_eq!(queue.try_dequeue(), Ok(3));
  }

  #[tokio::test]
  async fn async_enqueue_waits_for_room() {
    let queue = Arc::new(BoundedQueue::new(1));
    queue.enqueue_async(1).await;

    let producer = queue.clone();
    let task = tokio::spawn(async move { producer.enqueue_async(2).await });

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!task.is_finished(), "enqueue should be waiting");

    assert_eq!(queue.dequeue_async().await, Ok(1));
    task.await.unwrap();
    assert_eq!(queue.dequeue_async().await, Ok(2));
  }

  #[tokio::test]
  async fn async_dequeue_with_timeout_is_cancel_safe() {
    let queue = BoundedQueue::<u8>::new(2);
    let timed_out = tokio::time::timeout(Duration::from_millis(20), queue.dequeue_async()).await;
    assert!(timed_out.is_err());

    queue.try_enqueue(5).unwrap();
    assert_eq!(queue.try_dequeue(), Ok(5));
    assert_eq!(queue.items_available.available(), 0);
    assert_eq!(queue.capacity_available.available(), 2);
  }

  #[test]
  #[should_panic(expected = "capacity must be greater than 0")]
  fn zero_capacity_panics() {
    let _ = BoundedQueue::<()>::new(0);
  }
}
