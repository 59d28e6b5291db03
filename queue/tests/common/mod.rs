#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use fibre_queue::{BoundedQueue, ChannelQueue, LimitedQueue};

pub const SHORT_TIMEOUT: Duration = Duration::from_millis(10);
pub const LONG_TIMEOUT: Duration = Duration::from_secs(5);
pub const ITEMS_LOW: usize = 100;
pub const ITEMS_HIGH: usize = 10_000;

pub type SharedQueue = Arc<dyn LimitedQueue<usize>>;

/// Every bounded realization, each with the given capacity.
pub fn all_queues(capacity: usize) -> Vec<(&'static str, SharedQueue)> {
  vec![
    ("linked", Arc::new(BoundedQueue::<usize>::new(capacity)) as SharedQueue),
    ("ring", Arc::new(BoundedQueue::<usize, _>::with_ring(capacity)) as SharedQueue),
    ("shifting", Arc::new(BoundedQueue::<usize, _>::with_shifting(capacity)) as SharedQueue),
    ("channel", Arc::new(ChannelQueue::<usize>::new(capacity)) as SharedQueue),
  ]
}
