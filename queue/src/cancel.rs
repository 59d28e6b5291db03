//! Cancellation and deadline token for blocking queue operations.
//!
//! A [`CancelToken`] is handed to every blocking call. The call gives up as
//! soon as the token is cancelled or its deadline passes, and it always
//! gives up without side effects: no element stored, none removed, no
//! permit consumed.

use crate::error::QueueError;

use std::fmt;
use std::sync::Arc;
use std::thread::{self, Thread};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;

struct TokenInner {
  deadline: Option<Instant>,
  /// Dropped on cancel, which disconnects `done` and makes it ready.
  trigger: Mutex<Option<Sender<()>>>,
  done: Receiver<()>,
  /// Threads currently parked on behalf of this token.
  parked: Mutex<Vec<Thread>>,
}

/// A cloneable cancellation handle with an optional deadline.
///
/// Clones share state: cancelling any clone cancels them all. A token created
/// with [`CancelToken::new`] and never cancelled behaves as a background
/// context that never interrupts a wait.
#[derive(Clone)]
pub struct CancelToken {
  inner: Arc<TokenInner>,
}

impl CancelToken {
  /// A token without deadline that only fires on [`cancel`](Self::cancel).
  pub fn new() -> Self {
    Self::build(None)
  }

  /// A token that expires `timeout` from now.
  pub fn with_timeout(timeout: Duration) -> Self {
    Self::build(Instant::now().checked_add(timeout))
  }

  /// A token that expires at `deadline`.
  pub fn with_deadline(deadline: Instant) -> Self {
    Self::build(Some(deadline))
  }

  fn build(deadline: Option<Instant>) -> Self {
    let (trigger, done) = crossbeam_channel::bounded(0);
    Self {
      inner: Arc::new(TokenInner {
        deadline,
        trigger: Mutex::new(Some(trigger)),
        done,
        parked: Mutex::new(Vec::new()),
      }),
    }
  }

  /// Cancels the token and wakes every operation blocked on it.
  ///
  /// Cancelling twice is a no-op.
  pub fn cancel(&self) {
    if self.inner.trigger.lock().take().is_none() {
      return;
    }
    for thread in self.inner.parked.lock().iter() {
      thread.unpark();
    }
  }

  /// Returns `true` once [`cancel`](Self::cancel) has been called on any clone.
  pub fn is_cancelled(&self) -> bool {
    self.inner.trigger.lock().is_none()
  }

  /// The instant after which blocking operations fail, if any.
  pub fn deadline(&self) -> Option<Instant> {
    self.inner.deadline
  }

  /// Fails with [`QueueError::Cancelled`] if cancelled, otherwise with
  /// [`QueueError::DeadlineExceeded`] if the deadline has passed.
  pub fn check(&self) -> Result<(), QueueError> {
    if self.is_cancelled() {
      return Err(QueueError::Cancelled);
    }
    match self.inner.deadline {
      Some(deadline) if Instant::now() >= deadline => Err(QueueError::DeadlineExceeded),
      _ => Ok(()),
    }
  }

  /// Time left until the deadline; `None` when there is no deadline.
  pub(crate) fn remaining(&self) -> Option<Duration> {
    self
      .inner
      .deadline
      .map(|deadline| deadline.saturating_duration_since(Instant::now()))
  }

  /// A receiver that becomes ready (disconnected) once the token is cancelled.
  /// It never yields a message.
  pub(crate) fn done(&self) -> &Receiver<()> {
    &self.inner.done
  }

  /// Registers the current thread to be unparked by [`cancel`](Self::cancel)
  /// until the returned guard is dropped.
  pub(crate) fn register_current(&self) -> ParkRegistration<'_> {
    let thread = thread::current();
    let id = thread.id();
    self.inner.parked.lock().push(thread);
    ParkRegistration { token: self, id }
  }
}

impl Default for CancelToken {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Debug for CancelToken {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CancelToken")
      .field("cancelled", &self.is_cancelled())
      .field("deadline", &self.inner.deadline)
      .field("parked", &self.inner.parked.lock().len())
      .finish()
  }
}

pub(crate) struct ParkRegistration<'a> {
  token: &'a CancelToken,
  id: thread::ThreadId,
}

impl Drop for ParkRegistration<'_> {
  fn drop(&mut self) {
    let mut parked = self.token.inner.parked.lock();
    if let Some(pos) = parked.iter().position(|t| t.id() == self.id) {
      parked.swap_remove(pos);
    }
  }
}
