use super::Fifo;
use crate::error::QueueError;

use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

struct Node<T> {
  value: T,
  next: Option<NonNull<Node<T>>>,
}

/// A singly linked list with head and tail pointers.
///
/// O(1) append and removal, no capacity limit, one allocation per element.
pub struct LinkedFifo<T> {
  head: Option<NonNull<Node<T>>>,
  tail: Option<NonNull<Node<T>>>,
  len: usize,
  _marker: PhantomData<Box<Node<T>>>,
}

// The list exclusively owns its nodes; the raw pointers never escape it.
unsafe impl<T: Send> Send for LinkedFifo<T> {}
unsafe impl<T: Sync> Sync for LinkedFifo<T> {}

impl<T> LinkedFifo<T> {
  /// Creates an empty list.
  pub fn new() -> Self {
    Self {
      head: None,
      tail: None,
      len: 0,
      _marker: PhantomData,
    }
  }
}

impl<T> Fifo<T> for LinkedFifo<T> {
  fn append(&mut self, value: T) {
    let node = NonNull::from(Box::leak(Box::new(Node { value, next: None })));
    match self.tail {
      // SAFETY: `tail` points to a live node owned by this list, and we hold
      // `&mut self`, so no other reference to it exists.
      Some(tail) => unsafe { (*tail.as_ptr()).next = Some(node) },
      None => self.head = Some(node),
    }
    self.tail = Some(node);
    self.len += 1;
  }

  fn remove_front(&mut self) -> Result<T, QueueError> {
    let head = self.head.ok_or(QueueError::EmptyQueue)?;
    // SAFETY: every node was created by `Box::leak` in `append` and is
    // unlinked here exactly once before being reclaimed.
    let node = unsafe { Box::from_raw(head.as_ptr()) };
    self.head = node.next;
    if self.head.is_none() {
      self.tail = None;
    }
    self.len -= 1;
    Ok(node.value)
  }

  #[inline]
  fn count(&self) -> usize {
    self.len
  }
}

impl<T> Drop for LinkedFifo<T> {
  fn drop(&mut self) {
    // Iterative so long lists cannot overflow the stack.
    while self.remove_front().is_ok() {}
  }
}

impl<T> Default for LinkedFifo<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T> fmt::Debug for LinkedFifo<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("LinkedFifo").field("len", &self.len).finish()
  }
}
