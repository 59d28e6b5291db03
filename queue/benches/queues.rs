// benches/queues.rs

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fibre_queue::{BoundedQueue, CancelToken, ChannelQueue, LimitedQueue};
use std::{
  sync::Arc,
  thread,
  time::{Duration, Instant},
};

const ITEM_VALUE: u64 = 42;
const CAPACITY: usize = 1000;
const TOTAL_ITEMS: usize = 100_000;

// --- Queue Factories ---
fn make_queue(name: &str) -> Arc<dyn LimitedQueue<u64>> {
  match name {
    "linked" => Arc::new(BoundedQueue::<u64>::new(CAPACITY)) as Arc<dyn LimitedQueue<u64>>,
    "ring" => Arc::new(BoundedQueue::<u64, _>::with_ring(CAPACITY)),
    "shifting" => Arc::new(BoundedQueue::<u64, _>::with_shifting(CAPACITY)),
    _ => Arc::new(ChannelQueue::<u64>::new(CAPACITY)),
  }
}

const REALIZATIONS: [&str; 4] = ["linked", "ring", "shifting", "channel"];

// --- Benchmark Logic ---

/// Fill to capacity then drain, on a single thread.
fn fill_and_drain(c: &mut Criterion) {
  let mut group = c.benchmark_group("fill_and_drain");
  group.throughput(Throughput::Elements(CAPACITY as u64));

  for name in REALIZATIONS {
    group.bench_function(BenchmarkId::from_parameter(name), |b| {
      let queue = make_queue(name);
      b.iter(|| {
        for _ in 0..CAPACITY {
          queue.try_enqueue(ITEM_VALUE).unwrap();
        }
        for _ in 0..CAPACITY {
          criterion::black_box(queue.try_dequeue().unwrap());
        }
      });
    });
  }
  group.finish();
}

/// P producers and C consumers moving TOTAL_ITEMS through a shared queue.
fn contended(c: &mut Criterion) {
  let mut group = c.benchmark_group("contended");
  group.throughput(Throughput::Elements(TOTAL_ITEMS as u64));
  group.sample_size(10);

  for (producers, consumers) in [(1, 1), (4, 4), (8, 2)] {
    for name in REALIZATIONS {
      if name == "shifting" {
        continue;
      }
      let id = BenchmarkId::new(name, format!("{producers}p{consumers}c"));
      group.bench_function(id, |b| {
        b.iter_custom(|iters| {
          let mut total = Duration::ZERO;
          for _ in 0..iters {
            total += run_contended(name, producers, consumers);
          }
          total
        });
      });
    }
  }
  group.finish();
}

fn run_contended(name: &str, producers: usize, consumers: usize) -> Duration {
  let queue = make_queue(name);
  let per_producer = TOTAL_ITEMS / producers;
  let per_consumer = per_producer * producers / consumers;
  let start = Instant::now();

  let mut handles = Vec::with_capacity(producers + consumers);
  for _ in 0..producers {
    let queue = queue.clone();
    handles.push(thread::spawn(move || {
      let cancel = CancelToken::new();
      for _ in 0..per_producer {
        queue.enqueue(&cancel, ITEM_VALUE).unwrap();
      }
    }));
  }
  for _ in 0..consumers {
    let queue = queue.clone();
    handles.push(thread::spawn(move || {
      let cancel = CancelToken::new();
      for _ in 0..per_consumer {
        criterion::black_box(queue.dequeue(&cancel).unwrap());
      }
    }));
  }
  for handle in handles {
    handle.join().unwrap();
  }

  start.elapsed()
}

criterion_group!(benches, fill_and_drain, contended);
criterion_main!(benches);
