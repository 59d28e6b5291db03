//! Unsynchronized, unbounded FIFO storages.
//!
//! Every storage implements [`Fifo`], so the bounded queues can be
//! parametrized over any of them without knowing their internals. None of
//! them is thread-safe on its own; the bounded queues wrap them in a lock.

mod linked;
mod ring;
mod shifting;

pub use linked::LinkedFifo;
pub use ring::RingFifo;
pub use shifting::ShiftingFifo;

use crate::error::QueueError;

/// Append-at-end, remove-from-front storage.
///
/// Invariant: `count()` always equals the number of appended elements minus
/// the number removed, and elements leave in the order they entered.
pub trait Fifo<T> {
  /// Appends `value` at the end. Never fails.
  fn append(&mut self, value: T);

  /// Removes and returns the oldest element.
  ///
  /// Fails with [`QueueError::EmptyQueue`] when no element is stored, in
  /// which case the storage is left untouched.
  fn remove_front(&mut self) -> Result<T, QueueError>;

  /// The exact number of stored elements.
  fn count(&self) -> usize;
}

impl<T, F: Fifo<T> + ?Sized> Fifo<T> for Box<F> {
  #[inline]
  fn append(&mut self, value: T) {
    (**self).append(value)
  }

  #[inline]
  fn remove_front(&mut self) -> Result<T, QueueError> {
    (**self).remove_front()
  }

  #[inline]
  fn count(&self) -> usize {
    (**self).count()
  }
}
