mod common;
use common::*;

use fibre_queue::{CancelToken, QueueError};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

#[test]
fn happy_path() {
  let capacity = 10;
  for (name, queue) in all_queues(capacity) {
    let cancel = CancelToken::new();
    for i in 0..capacity {
      queue.enqueue(&cancel, i).unwrap();
    }
    assert_eq!(queue.size(), capacity, "{name}");
    for i in 0..capacity {
      assert_eq!(queue.dequeue(&cancel), Ok(i), "{name}");
    }
    assert_eq!(queue.size(), 0, "{name}");
  }
}

#[test]
fn try_enqueue_past_capacity_is_full_and_try_dequeue_past_empty_is_empty() {
  let capacity = 5;
  for (name, queue) in all_queues(capacity) {
    assert_eq!(queue.capacity(), capacity, "{name}");
    for i in 0..capacity {
      queue.try_enqueue(i).unwrap();
    }
    let err = queue.try_enqueue(capacity).unwrap_err();
    assert_eq!(err.kind(), QueueError::QueueFull, "{name}");
    assert_eq!(err.into_inner(), capacity, "{name}");

    for i in 0..capacity {
      assert_eq!(queue.try_dequeue(), Ok(i), "{name}");
    }
    for _ in 0..capacity {
      assert_eq!(queue.try_dequeue(), Err(QueueError::QueueEmpty), "{name}");
    }
  }
}

#[test]
fn blocking_enqueue_resumes_after_dequeue() {
  let steps = ITEMS_LOW;
  for (name, queue) in all_queues(10) {
    let mut producers = Vec::new();
    for i in 0..steps {
      let queue = queue.clone();
      producers.push(thread::spawn(move || queue.enqueue(&CancelToken::new(), i)));
    }

    let cancel = CancelToken::new();
    let mut seen = vec![false; steps];
    for _ in 0..steps {
      let value = queue.dequeue(&cancel).unwrap();
      assert!(!seen[value], "{name}: {value} delivered twice");
      seen[value] = true;
    }
    for producer in producers {
      producer.join().unwrap().unwrap();
    }
    assert!(seen.iter().all(|s| *s), "{name}: lost values");
    assert_eq!(queue.size(), 0, "{name}");
  }
}

#[test]
fn expired_deadline_on_full_queue() {
  for (name, queue) in all_queues(1) {
    queue.try_enqueue(0).unwrap();
    let expired = CancelToken::with_timeout(Duration::ZERO);
    let err = queue.enqueue(&expired, 1).unwrap_err();
    assert_eq!(err.kind(), QueueError::DeadlineExceeded, "{name}");
    assert_eq!(queue.size(), 1, "{name}");
  }
}

#[test]
fn cancel_wakes_blocked_dequeue() {
  for (name, queue) in all_queues(2) {
    let token = CancelToken::new();
    let (tx, rx) = mpsc::channel();
    let (consumer, consumer_token) = (queue.clone(), token.clone());
    let handle = thread::spawn(move || tx.send(consumer.dequeue(&consumer_token)).unwrap());

    thread::sleep(Duration::from_millis(50));
    assert!(rx.try_recv().is_err(), "{name}: dequeue should be blocked");
    token.cancel();
    assert_eq!(
      rx.recv_timeout(LONG_TIMEOUT).unwrap(),
      Err(QueueError::Cancelled),
      "{name}"
    );
    handle.join().unwrap();

    // The cancelled consumer must not have claimed anything.
    queue.try_enqueue(4).unwrap();
    assert_eq!(queue.try_dequeue(), Ok(4), "{name}");
  }
}

#[test]
fn timed_enqueues_fail_on_full_queue_then_succeed_once_drained() {
  let capacity = 2;
  for (name, queue) in all_queues(capacity) {
    let cancel = CancelToken::new();
    for i in 0..capacity {
      queue.enqueue(&cancel, i).unwrap();
    }

    let mut timed_out = Vec::new();
    for i in 0..capacity {
      let queue = queue.clone();
      timed_out.push(thread::spawn(move || {
        queue.enqueue(&CancelToken::with_timeout(SHORT_TIMEOUT), 100 + i)
      }));
    }
    for handle in timed_out {
      let err = handle.join().unwrap().unwrap_err();
      assert_eq!(err.kind(), QueueError::DeadlineExceeded, "{name}");
    }

    let mut waiting = Vec::new();
    for i in 0..capacity {
      let queue = queue.clone();
      waiting.push(thread::spawn(move || {
        queue.enqueue(&CancelToken::with_timeout(LONG_TIMEOUT), 200 + i)
      }));
    }
    for _ in 0..capacity {
      queue.dequeue(&cancel).unwrap();
    }
    for handle in waiting {
      handle.join().unwrap().unwrap();
    }
    assert_eq!(queue.size(), capacity, "{name}");
  }
}

#[test]
fn dequeue_timeout_reports_empty() {
  for (name, queue) in all_queues(1) {
    assert_eq!(
      queue.try_dequeue_timeout(SHORT_TIMEOUT),
      Err(QueueError::QueueEmpty),
      "{name}"
    );
  }
}

#[test]
fn timed_calls_succeed_immediately_when_possible() {
  for (name, queue) in all_queues(2) {
    for timeout in [Duration::ZERO, SHORT_TIMEOUT] {
      queue.try_enqueue_timeout(1, timeout).unwrap();
      assert_eq!(queue.size(), 1, "{name} {timeout:?}");
      queue.try_enqueue_timeout(2, timeout).unwrap();
      assert_eq!(queue.size(), 2, "{name} {timeout:?}");

      assert_eq!(queue.try_dequeue_timeout(timeout), Ok(1), "{name} {timeout:?}");
      assert_eq!(queue.size(), 1, "{name} {timeout:?}");
      assert_eq!(queue.try_dequeue_timeout(timeout), Ok(2), "{name} {timeout:?}");
      assert_eq!(queue.size(), 0, "{name} {timeout:?}");
    }
  }
}
