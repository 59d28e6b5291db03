//! A counting semaphore that supports both synchronous and asynchronous waiters.
//!
//! A `PermitGate` guards its permit count and a unified waiter queue (parked
//! `Thread`s and async `Waker`s) with one `parking_lot::Mutex`. Released
//! permits are handed directly to the oldest waiter, so a newcomer can never
//! steal a permit from someone who has been waiting, and a woken waiter never
//! has to race for what it was woken for.
//!
//! Every acquire is atomic from the caller's point of view: it either takes
//! exactly one permit or, when cancelled, takes none. A permit granted to a
//! waiter that gives up at the same moment is passed on, never lost.

use crate::cancel::CancelToken;
use crate::error::QueueError;

use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll, Waker};
use std::thread::{self, Thread};

use parking_lot::Mutex;

/// Either a parked thread or an async task.
#[derive(Debug)]
enum Waiter {
  Sync(Thread),
  Async(Waker),
}

impl Waiter {
  /// Wakes the underlying thread or task.
  fn wake(self) {
    match self {
      Waiter::Sync(thread) => thread.unpark(),
      Waiter::Async(waker) => waker.wake(),
    }
  }
}

#[derive(Debug)]
struct WaitNode {
  ticket: u64,
  waiter: Waiter,
}

/// The internal state of the `PermitGate`, protected by a `Mutex`.
#[derive(Debug)]
struct GateState {
  /// The number of currently available, unassigned permits.
  permits: usize,
  /// A fair (FIFO) queue of waiting threads and tasks.
  waiters: VecDeque<WaitNode>,
  /// Tickets of waiters that were handed a permit but have not yet seen it.
  granted: HashSet<u64>,
  next_ticket: u64,
}

impl GateState {
  fn enqueue(&mut self, waiter: Waiter) -> u64 {
    let ticket = self.next_ticket;
    self.next_ticket = self.next_ticket.wrapping_add(1);
    self.waiters.push_back(WaitNode { ticket, waiter });
    ticket
  }

  /// Gives one permit back: to the oldest waiter if there is one, otherwise
  /// to the free pool, never exceeding `ceiling`.
  fn release_one(&mut self, ceiling: usize) {
    if let Some(node) = self.waiters.pop_front() {
      tracing::trace!(ticket = node.ticket, "handing permit to waiter");
      self.granted.insert(node.ticket);
      node.waiter.wake();
    } else {
      debug_assert!(self.permits < ceiling, "permit released above ceiling");
      self.permits = (self.permits + 1).min(ceiling);
    }
  }

  /// Withdraws a waiter that is giving up. A permit already granted to it is
  /// passed on so it is not lost.
  fn abandon(&mut self, ticket: u64, ceiling: usize) {
    if self.granted.remove(&ticket) {
      tracing::trace!(ticket, "abandoned waiter passes its permit on");
      self.release_one(ceiling);
    } else if let Some(pos) = self.waiters.iter().position(|n| n.ticket == ticket) {
      self.waiters.remove(pos);
    }
  }
}

/// A counting semaphore with a fixed ceiling, usable from threads and tasks.
pub struct PermitGate {
  ceiling: usize,
  state: Mutex<GateState>,
}

impl fmt::Debug for PermitGate {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let state = self.state.lock();
    f.debug_struct("PermitGate")
      .field("ceiling", &self.ceiling)
      .field("permits", &state.permits)
      .field("waiters", &state.waiters.len())
      .finish()
  }
}

impl PermitGate {
  /// Creates a gate holding all `ceiling` permits.
  pub fn new(ceiling: usize) -> Self {
    Self::with_permits(ceiling, ceiling)
  }

  /// Creates a gate that can hold up to `ceiling` permits, of which `initial`
  /// are available right away.
  pub fn with_permits(ceiling: usize, initial: usize) -> Self {
    assert!(initial <= ceiling, "initial permits exceed the ceiling");
    Self {
      ceiling,
      state: Mutex::new(GateState {
        permits: initial,
        waiters: VecDeque::new(),
        granted: HashSet::new(),
        next_ticket: 0,
      }),
    }
  }

  /// The most permits this gate can hold.
  pub fn ceiling(&self) -> usize {
    self.ceiling
  }

  /// Permits free right now. A snapshot; it may change immediately.
  pub fn available(&self) -> usize {
    self.state.lock().permits
  }

  /// Attempts to acquire a permit without blocking.
  ///
  /// A permit can only be taken if no one is waiting. This gives waiters
  /// priority and prevents permit stealing.
  pub fn try_acquire(&self) -> bool {
    let mut state = self.state.lock();
    if state.waiters.is_empty() && state.permits > 0 {
      state.permits -= 1;
      true
    } else {
      false
    }
  }

  /// Acquires a permit, blocking the current thread until one is handed over
  /// or `cancel` fires.
  ///
  /// A token that is already cancelled or expired fails immediately, even if
  /// a permit is free. On failure no permit is consumed.
  pub fn acquire(&self, cancel: &CancelToken) -> Result<(), QueueError> {
    cancel.check()?;

    let ticket = {
      let mut state = self.state.lock();
      if state.waiters.is_empty() && state.permits > 0 {
        state.permits -= 1;
        return Ok(());
      }
      state.enqueue(Waiter::Sync(thread::current()))
    };

    // Registered before the first check so a concurrent cancel cannot slip
    // between the check and the park.
    let _registration = cancel.register_current();
    tracing::trace!(ticket, "waiting for permit");

    loop {
      {
        let mut state = self.state.lock();
        if state.granted.remove(&ticket) {
          return Ok(());
        }
        if let Err(err) = cancel.check() {
          state.abandon(ticket, self.ceiling);
          tracing::debug!(ticket, error = %err, "permit wait abandoned");
          return Err(err);
        }
      }

      // Spurious wakeups are fine: the grant is re-checked under the lock.
      match cancel.remaining() {
        Some(remaining) => thread::park_timeout(remaining),
        None => thread::park(),
      }
    }
  }

  /// Acquires a permit asynchronously. Dropping the future before it
  /// completes withdraws the request without consuming a permit.
  pub fn acquire_async(&self) -> AcquireFuture<'_> {
    AcquireFuture {
      gate: self,
      ticket: None,
    }
  }

  /// Releases a permit back to the gate, waking the oldest waiter if any.
  pub fn release(&self) {
    self.state.lock().release_one(self.ceiling);
  }
}

/// A future that resolves when a permit is acquired from the `PermitGate`.
#[must_use = "futures do nothing unless you .await or poll them"]
pub struct AcquireFuture<'a> {
  gate: &'a PermitGate,
  ticket: Option<u64>,
}

impl fmt::Debug for AcquireFuture<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AcquireFuture")
      .field("ticket", &self.ticket)
      .finish()
  }
}

impl Future for AcquireFuture<'_> {
  type Output = ();

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    let this = self.get_mut();
    let mut state = this.gate.state.lock();

    match this.ticket {
      None => {
        // Fast path check using the anti-stealing logic.
        if state.waiters.is_empty() && state.permits > 0 {
          state.permits -= 1;
          return Poll::Ready(());
        }
        this.ticket = Some(state.enqueue(Waiter::Async(cx.waker().clone())));
        Poll::Pending
      }
      Some(ticket) => {
        if state.granted.remove(&ticket) {
          this.ticket = None;
          return Poll::Ready(());
        }
        // Still queued; keep the most recent waker.
        if let Some(node) = state.waiters.iter_mut().find(|n| n.ticket == ticket) {
          match &node.waiter {
            Waiter::Async(waker) if waker.will_wake(cx.waker()) => {}
            _ => node.waiter = Waiter::Async(cx.waker().clone()),
          }
        }
        Poll::Pending
      }
    }
  }
}

impl Drop for AcquireFuture<'_> {
  fn drop(&mut self) {
    if let Some(ticket) = self.ticket.take() {
      self.gate.state.lock().abandon(ticket, self.gate.ceiling);
    }
  }
}
