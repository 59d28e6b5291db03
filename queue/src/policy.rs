//! Pluggable admission policies: what happens when a queue is full.
//!
//! A policy tracks how many elements are admitted but not yet removed and
//! decides, independently of storage, whether the next one may enter.
//! [`PolicyQueue`] composes a policy with any [`Fifo`] storage.

use crate::error::{EnqueueError, QueueError};
use crate::fifo::Fifo;

use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::{Condvar, Mutex};

/// Backpressure strategy consulted before each admission.
pub trait AdmissionPolicy: Send + Sync {
  /// Reserves room for one element.
  ///
  /// If the limit is reached the behaviour depends on the policy: one
  /// implementation rejects with [`QueueError::QueueFull`], another waits
  /// until room is released. On error nothing is reserved.
  fn ensure_can_admit(&self) -> Result<(), QueueError>;

  /// Gives back the room held by one element that left the queue.
  fn element_removed(&self);
}

/// Fails fast with [`QueueError::QueueFull`] when the limit is reached.
#[derive(Debug)]
pub struct RejectingPolicy {
  max_size: usize,
  size: AtomicUsize,
}

impl RejectingPolicy {
  pub fn new(max_size: usize) -> Self {
    Self {
      max_size,
      size: AtomicUsize::new(0),
    }
  }

  /// Elements currently admitted.
  pub fn current_size(&self) -> usize {
    self.size.load(Ordering::Acquire)
  }

  pub fn max_size(&self) -> usize {
    self.max_size
  }
}

impl AdmissionPolicy for RejectingPolicy {
  fn ensure_can_admit(&self) -> Result<(), QueueError> {
    self
      .size
      .fetch_update(Ordering::AcqRel, Ordering::Acquire, |size| {
        (size < self.max_size).then_some(size + 1)
      })
      .map(|_| ())
      .map_err(|_| QueueError::QueueFull)
  }

  fn element_removed(&self) {
    // Saturating: a stray removal must not wrap the counter.
    let _ = self
      .size
      .fetch_update(Ordering::AcqRel, Ordering::Acquire, |size| size.checked_sub(1));
  }
}

/// Suspends the caller until room is released. Never fails.
#[derive(Debug)]
pub struct BlockingPolicy {
  max_size: usize,
  size: Mutex<usize>,
  room: Condvar,
}

impl BlockingPolicy {
  pub fn new(max_size: usize) -> Self {
    Self {
      max_size,
      size: Mutex::new(0),
      room: Condvar::new(),
    }
  }

  /// Elements currently admitted.
  pub fn current_size(&self) -> usize {
    *self.size.lock()
  }

  pub fn max_size(&self) -> usize {
    self.max_size
  }
}

impl AdmissionPolicy for BlockingPolicy {
  fn ensure_can_admit(&self) -> Result<(), QueueError> {
    let mut size = self.size.lock();
    // A wake only means room was freed at some point; another admitter may
    // have taken it first.
    while *size >= self.max_size {
      tracing::trace!(max_size = self.max_size, "admission waiting for room");
      self.room.wait(&mut size);
    }
    *size += 1;
    Ok(())
  }

  fn element_removed(&self) {
    let mut size = self.size.lock();
    if *size > 0 {
      *size -= 1;
      self.room.notify_one();
    }
  }
}

/// An unbounded storage whose capacity is enforced only by an
/// [`AdmissionPolicy`].
///
/// The policy is the sole capacity accounting, so the bound is exactly the
/// policy's limit. The storage lock is never held while the policy waits.
pub struct PolicyQueue<T, F, P> {
  backing: Mutex<F>,
  policy: P,
  _marker: PhantomData<fn() -> T>,
}

impl<T, F: Fifo<T>, P: AdmissionPolicy> PolicyQueue<T, F, P> {
  pub fn new(backing: F, policy: P) -> Self {
    Self {
      backing: Mutex::new(backing),
      policy,
      _marker: PhantomData,
    }
  }

  /// Admits `value` through the policy, then appends it.
  ///
  /// When the policy rejects, the value is handed back inside the error.
  pub fn push(&self, value: T) -> Result<(), EnqueueError<T>> {
    if let Err(kind) = self.policy.ensure_can_admit() {
      return Err(EnqueueError::new(kind, value));
    }
    self.backing.lock().append(value);
    Ok(())
  }

  /// Removes the oldest element and releases its room in the policy.
  pub fn pop(&self) -> Result<T, QueueError> {
    let value = self.backing.lock().remove_front()?;
    self.policy.element_removed();
    Ok(value)
  }

  pub fn size(&self) -> usize {
    self.backing.lock().count()
  }

  pub fn policy(&self) -> &P {
    &self.policy
  }
}

impl<T, F, P: fmt::Debug> fmt::Debug for PolicyQueue<T, F, P> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("PolicyQueue")
      .field("policy", &self.policy)
      .finish_non_exhaustive()
  }
}
