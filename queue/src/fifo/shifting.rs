use super::Fifo;
use crate::error::QueueError;

/// The naive baseline: a vector whose front removal shifts every remaining
/// element down by one.
///
/// Kept for comparison with [`RingFifo`](super::RingFifo) and
/// [`LinkedFifo`](super::LinkedFifo); removal is O(n).
#[derive(Debug)]
pub struct ShiftingFifo<T> {
  items: Vec<T>,
}

impl<T> ShiftingFifo<T> {
  pub fn new() -> Self {
    Self { items: Vec::new() }
  }

  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      items: Vec::with_capacity(capacity),
    }
  }
}

impl<T> Default for ShiftingFifo<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T> Fifo<T> for ShiftingFifo<T> {
  #[inline]
  fn append(&mut self, value: T) {
    self.items.push(value);
  }

  fn remove_front(&mut self) -> Result<T, QueueError> {
    if self.items.is_empty() {
      return Err(QueueError::EmptyQueue);
    }
    Ok(self.items.remove(0))
  }

  #[inline]
  fn count(&self) -> usize {
    self.items.len()
  }
}
