//! Queue configuration and the builder that turns it into a queue.

use crate::bounded::BoundedQueue;
use crate::channel::ChannelQueue;
use crate::error::BuildError;
use crate::fifo::{Fifo, LinkedFifo, RingFifo, ShiftingFifo};

/// Which unbounded storage backs a [`BoundedQueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StorageKind {
  /// Singly linked nodes. One allocation per element.
  #[default]
  Linked,
  /// Circular buffer pre-sized to the queue capacity.
  Ring,
  /// Naive vector with shifting removal. Baseline only.
  Shifting,
}

impl StorageKind {
  /// Allocates an empty storage of this kind, sized for `capacity` elements
  /// where the kind supports pre-sizing.
  pub fn make<T: Send + 'static>(self, capacity: usize) -> Box<dyn Fifo<T> + Send> {
    match self {
      StorageKind::Linked => Box::new(LinkedFifo::new()),
      StorageKind::Ring => Box::new(RingFifo::with_capacity(capacity)),
      StorageKind::Shifting => Box::new(ShiftingFifo::with_capacity(capacity)),
    }
  }
}

/// Plain-data description of a queue, suitable for loading from a file when
/// the `serde` feature is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QueueConfig {
  pub capacity: usize,
  #[cfg_attr(feature = "serde", serde(default))]
  pub storage: StorageKind,
}

/// A bounded queue whose storage was chosen at runtime.
pub type DynBoundedQueue<T> = BoundedQueue<T, Box<dyn Fifo<T> + Send>>;

/// A builder for [`BoundedQueue`] and [`ChannelQueue`] instances.
#[derive(Debug, Clone, Default)]
pub struct QueueBuilder {
  capacity: usize,
  storage: StorageKind,
}

impl QueueBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  /// Starts from a loaded configuration.
  pub fn from_config(config: &QueueConfig) -> Self {
    Self {
      capacity: config.capacity,
      storage: config.storage,
    }
  }

  /// Sets the maximum number of queued elements. Required; must be non-zero.
  pub fn capacity(mut self, capacity: usize) -> Self {
    self.capacity = capacity;
    self
  }

  /// Sets the storage used by [`build`](Self::build). Ignored by
  /// [`build_channel`](Self::build_channel).
  pub fn storage(mut self, storage: StorageKind) -> Self {
    self.storage = storage;
    self
  }

  /// The configuration this builder currently describes.
  pub fn config(&self) -> QueueConfig {
    QueueConfig {
      capacity: self.capacity,
      storage: self.storage,
    }
  }

  /// Builds a permit-coordinated [`BoundedQueue`].
  pub fn build<T: Send + 'static>(&self) -> Result<DynBoundedQueue<T>, BuildError> {
    self.validate()?;
    tracing::debug!(capacity = self.capacity, storage = ?self.storage, "building bounded queue");
    Ok(BoundedQueue::with_storage(
      self.capacity,
      self.storage.make(self.capacity),
    ))
  }

  /// Builds a channel-backed [`ChannelQueue`].
  pub fn build_channel<T>(&self) -> Result<ChannelQueue<T>, BuildError> {
    self.validate()?;
    tracing::debug!(capacity = self.capacity, "building channel queue");
    Ok(ChannelQueue::new(self.capacity))
  }

  fn validate(&self) -> Result<(), BuildError> {
    if self.capacity == 0 {
      return Err(BuildError::ZeroCapacity);
    }
    Ok(())
  }
}
