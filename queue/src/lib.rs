//! Generic FIFO queues, from plain unbounded storages up to a bounded,
//! backpressure-aware concurrent queue.
//!
//! - [`fifo`]: unsynchronized storages behind the [`Fifo`] trait.
//! - [`policy`]: pluggable admission policies (reject or block when full).
//! - [`BoundedQueue`]: fixed capacity, strict FIFO, any number of producers
//!   and consumers, with blocking, non-blocking, timed, cancellable and async
//!   operations. Coordinated by a pair of counting permits.
//! - [`ChannelQueue`]: the same contract on top of a native bounded channel.
//! - [`heap`]: a comparison-driven binary heap.

pub mod bounded;
pub mod cancel;
pub mod channel;
pub mod config;
pub mod contract;
pub mod coord;
pub mod error;
pub mod fifo;
pub mod heap;
pub mod policy;

// Public re-exports for convenience
pub use bounded::BoundedQueue;
pub use cancel::CancelToken;
pub use channel::ChannelQueue;
pub use config::{DynBoundedQueue, QueueBuilder, QueueConfig, StorageKind};
pub use contract::LimitedQueue;
pub use error::{BuildError, EnqueueError, QueueError};
pub use fifo::{Fifo, LinkedFifo, RingFifo, ShiftingFifo};
pub use heap::Heap;
pub use policy::{AdmissionPolicy, BlockingPolicy, PolicyQueue, RejectingPolicy};

// Helper function to check if a type is Send + Sync.
// Useful for static assertions in generic code.
#[allow(dead_code)]
fn assert_send_sync<T: Send + Sync>() {}

#[allow(dead_code)]
fn queues_are_send_sync() {
  assert_send_sync::<BoundedQueue<String>>();
  assert_send_sync::<BoundedQueue<String, RingFifo<String>>>();
  assert_send_sync::<DynBoundedQueue<String>>();
  assert_send_sync::<ChannelQueue<String>>();
  assert_send_sync::<CancelToken>();
}
