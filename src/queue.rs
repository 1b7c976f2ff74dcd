// Copyright 2025 Chisomo Makombo Sakala
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Lock-free hand-off between the controller and the workers.
//!
//! Both queues pop without blocking: an empty [`TaskQueue`] is the only
//! signal a worker gets to stop.

use crate::matrix::Task;
use crate::store::TaskResult;
use crossbeam::queue::SegQueue;

/// Pending tasks, filled once before any worker starts.
#[derive(Debug, Default)]
pub struct TaskQueue {
  inner: SegQueue<Task>,
}

impl TaskQueue {
  pub fn preload(tasks: impl IntoIterator<Item = Task>) -> Self {
    let inner = SegQueue::new();
    for task in tasks {
      inner.push(task);
    }
    Self { inner }
  }

  /// Removes the next task, or returns `None` once the queue is exhausted.
  pub fn pop(&self) -> Option<Task> {
    self.inner.pop()
  }

  pub fn len(&self) -> usize {
    self.inner.len()
  }

  pub fn is_empty(&self) -> bool {
    self.inner.is_empty()
  }
}

/// Results pushed by workers in completion order.
#[derive(Debug, Default)]
pub struct ResultCollector {
  inner: SegQueue<TaskResult>,
}

impl ResultCollector {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&self, result: TaskResult) {
    self.inner.push(result);
  }

  pub fn len(&self) -> usize {
    self.inner.len()
  }

  pub fn is_empty(&self) -> bool {
    self.inner.is_empty()
  }

  /// Pops every collected result. Only call once all workers have finished.
  pub fn drain(&self) -> Vec<TaskResult> {
    std::iter::from_fn(|| self.inner.pop()).collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::matrix::default_matrix;
  use std::collections::HashSet;
  use std::sync::Arc;
  use std::thread;

  #[test]
  fn queue_is_fifo_and_reports_exhaustion() {
    let queue = TaskQueue::preload([Task::new("FAST", "ORB"), Task::new("ORB", "FAST")]);

    assert_eq!(queue.len(), 2);
    assert_eq!(queue.pop(), Some(Task::new("FAST", "ORB")));
    assert_eq!(queue.pop(), Some(Task::new("ORB", "FAST")));
    assert_eq!(queue.pop(), None);
    assert!(queue.is_empty());
  }

  #[test]
  fn concurrent_pops_hand_out_each_task_once() {
    let queue = Arc::new(TaskQueue::preload(default_matrix()));

    let handles: Vec<_> = (0..8)
      .map(|_| {
        let queue = Arc::clone(&queue);
        thread::spawn(move || std::iter::from_fn(|| queue.pop()).collect::<Vec<_>>())
      })
      .collect();

    let popped: Vec<Task> = handles
      .into_iter()
      .flat_map(|h| h.join().unwrap())
      .collect();
    let unique: HashSet<_> = popped.iter().cloned().collect();

    assert_eq!(popped.len(), 42);
    assert_eq!(unique.len(), 42);
    assert!(queue.is_empty());
  }

  #[test]
  fn drain_empties_the_collector_in_push_order() {
    let collector = ResultCollector::new();
    collector.push(TaskResult::failed("A_B"));
    collector.push(TaskResult::failed("C_D"));

    let keys: Vec<_> = collector.drain().into_iter().map(|r| r.key).collect();
    assert_eq!(keys, ["A_B", "C_D"]);
    assert!(collector.is_empty());
  }
}
