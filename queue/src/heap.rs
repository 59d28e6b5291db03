//! A binary min-heap ordered by a caller-supplied comparison.
//!
//! Not synchronized; wrap it in a lock to share it.

use crate::error::QueueError;

use std::cmp::Ordering;
use std::fmt;

/// A binary heap whose root is the minimum under `compare`.
///
/// Pass a reversed comparison to get a max-heap.
pub struct Heap<T, C = fn(&T, &T) -> Ordering> {
  items: Vec<T>,
  compare: C,
}

impl<T: Ord> Heap<T> {
  /// A min-heap under `T`'s natural order.
  pub fn new() -> Self {
    Self::with_compare(T::cmp)
  }
}

impl<T: Ord> Default for Heap<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T, C> Heap<T, C>
where
  C: Fn(&T, &T) -> Ordering,
{
  pub fn with_compare(compare: C) -> Self {
    Self::with_capacity_and_compare(0, compare)
  }

  pub fn with_capacity_and_compare(capacity: usize, compare: C) -> Self {
    Self {
      items: Vec::with_capacity(capacity),
      compare,
    }
  }

  pub fn insert(&mut self, value: T) {
    self.items.push(value);
    self.sift_up(self.items.len() - 1);
  }

  /// The minimum element, without removing it.
  pub fn peek_min(&self) -> Result<&T, QueueError> {
    self.items.first().ok_or(QueueError::EmptyHeap)
  }

  /// Removes and returns the minimum element.
  pub fn extract_min(&mut self) -> Result<T, QueueError> {
    if self.items.is_empty() {
      return Err(QueueError::EmptyHeap);
    }
    let value = self.items.swap_remove(0);
    if !self.items.is_empty() {
      self.sift_down(0);
    }
    Ok(value)
  }

  pub fn size(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  fn less(&self, a: usize, b: usize) -> bool {
    (self.compare)(&self.items[a], &self.items[b]) == Ordering::Less
  }

  fn sift_up(&mut self, mut index: usize) {
    while index > 0 {
      let parent = (index - 1) / 2;
      if !self.less(index, parent) {
        break;
      }
      self.items.swap(index, parent);
      index = parent;
    }
  }

  fn sift_down(&mut self, mut index: usize) {
    let len = self.items.len();
    loop {
      let left = 2 * index + 1;
      if left >= len {
        break;
      }
      let right = left + 1;
      let smallest = if right < len && self.less(right, left) {
        right
      } else {
        left
      };
      if !self.less(smallest, index) {
        break;
      }
      self.items.swap(index, smallest);
      index = smallest;
    }
  }
}

impl<T, C> fmt::Debug for Heap<T, C> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Heap").field("size", &self.items.len()).finish()
  }
}
