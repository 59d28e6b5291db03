use super::Fifo;
use crate::error::QueueError;

use std::fmt;

/// A growable circular buffer.
///
/// Removal only advances the head, so there is no shifting. When the buffer
/// is full the next append doubles it (or allocates a single slot if it was
/// empty) and lays the elements out again starting at index 0.
pub struct RingFifo<T> {
  slots: Vec<Option<T>>,
  head: usize,
  tail: usize,
  len: usize,
}

impl<T> RingFifo<T> {
  /// Creates an empty ring with no allocated slots.
  pub fn new() -> Self {
    Self::with_capacity(0)
  }

  /// Creates an empty ring with `capacity` pre-allocated slots.
  pub fn with_capacity(capacity: usize) -> Self {
    let mut slots = Vec::with_capacity(capacity);
    slots.resize_with(capacity, || None);
    Self {
      slots,
      head: 0,
      tail: 0,
      len: 0,
    }
  }

  /// Number of slots currently allocated.
  pub fn capacity(&self) -> usize {
    self.slots.len()
  }

  fn grow(&mut self) {
    let old_capacity = self.slots.len();
    let new_capacity = (old_capacity * 2).max(1);

    let mut slots = Vec::with_capacity(new_capacity);
    for offset in 0..self.len {
      let index = (self.head + offset) % old_capacity;
      slots.push(self.slots[index].take());
    }
    slots.resize_with(new_capacity, || None);

    self.slots = slots;
    self.head = 0;
    self.tail = self.len;
  }
}

impl<T> Fifo<T> for RingFifo<T> {
  fn append(&mut self, value: T) {
    if self.len == self.slots.len() {
      self.grow();
    }
    self.slots[self.tail] = Some(value);
    self.tail = (self.tail + 1) % self.slots.len();
    self.len += 1;
  }

  fn remove_front(&mut self) -> Result<T, QueueError> {
    if self.len == 0 {
      return Err(QueueError::EmptyQueue);
    }
    let value = self.slots[self.head].take().ok_or(QueueError::EmptyQueue)?;
    self.head = (self.head + 1) % self.slots.len();
    self.len -= 1;
    Ok(value)
  }

  #[inline]
  fn count(&self) -> usize {
    self.len
  }
}

impl<T> Default for RingFifo<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T> fmt::Debug for RingFifo<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("RingFifo")
      .field("len", &self.len)
      .field("capacity", &self.slots.len())
      .field("head", &self.head)
      .finish()
  }
}
