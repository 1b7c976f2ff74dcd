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
use crate::command::CommandArgs;
use crate::config::Config;
use crate::error::BenchmarkError;
use crate::error::HarnessError;
use crate::invoker::Invocation;
use crate::invoker::invoke;
use crate::matrix::Task;
use crate::parser::MetricParser;
use crate::queue::ResultCollector;
use crate::queue::TaskQueue;
use crate::store;
use crate::store::ResultSet;
use crate::store::TaskResult;
use parking_lot::Mutex;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Instrument;
use tracing::Span;

/// Serializes the per-worker start/finish lines. Guards no data.
#[derive(Debug, Default)]
pub struct ConsoleLock {
  lock: Mutex<()>,
}

impl ConsoleLock {
  pub fn announce(&self, worker: usize, event: &str) {
    let _guard = self.lock.lock();
    tracing::info!(worker, "Thread {} {}", worker, event);
  }
}

/// Everything a worker needs to turn one task into one result.
#[derive(Debug)]
pub struct TaskRunner {
  command: CommandArgs,
  log_dir: PathBuf,
  parser: MetricParser,
  console: ConsoleLock,
}

impl TaskRunner {
  pub fn new(command: CommandArgs, log_dir: impl Into<PathBuf>) -> Result<Self, BenchmarkError> {
    Ok(Self {
      command,
      log_dir: log_dir.into(),
      parser: MetricParser::new()?,
      console: ConsoleLock::default(),
    })
  }

  /// Invokes the executable for `task` and classifies the outcome.
  ///
  /// Failures of any kind become an absent result; they never escape.
  pub fn run(&self, task: &Task) -> TaskResult {
    let key = task.key();

    let stdout = match invoke(&self.command, task) {
      Ok(Invocation::Succeeded { stdout }) => stdout,
      Ok(Invocation::Failed { stderr, code }) => {
        tracing::warn!(
          task = %key,
          ?code,
          stderr = %String::from_utf8_lossy(&stderr).trim_end(),
          "Tracker reported errors"
        );
        return TaskResult::failed(key);
      }
      Err(e) => {
        tracing::warn!(task = %key, error = %e, "Failed to run tracker");
        return TaskResult::failed(key);
      }
    };

    let metrics = self.parser.parse(&String::from_utf8_lossy(&stdout));

    let log_path = self.log_dir.join(format!("{key}.log"));
    if let Err(e) = fs::write(&log_path, &stdout) {
      tracing::error!(task = %key, path = %log_path.display(), error = %e, "Failed to write task log");
    }

    TaskResult::parsed(key, metrics)
  }
}

/// Body of one worker: pop, run, push, until the queue reports empty.
fn worker_loop(
  id: usize,
  parent: &Span,
  queue: &TaskQueue,
  collector: &ResultCollector,
  runner: &TaskRunner,
) -> usize {
  let span = tracing::info_span!(parent: parent, "worker", worker = id);
  let _enter = span.enter();

  runner.console.announce(id, "starts");

  let mut processed = 0;
  while let Some(task) = queue.pop() {
    tracing::debug!(task = %task, "Processing");
    collector.push(runner.run(&task));
    processed += 1;
  }

  runner.console.announce(id, "finishes");
  processed
}

/// Starts `workers` OS threads draining `queue` and waits for all of them.
///
/// With `workers == 0` nothing runs and the queue is left as it was.
pub async fn run_workers(
  workers: usize,
  queue: Arc<TaskQueue>,
  collector: Arc<ResultCollector>,
  runner: Arc<TaskRunner>,
) -> Result<(), BenchmarkError> {
  let handles: Vec<_> = (0..workers)
    .map(|id| {
      let queue = Arc::clone(&queue);
      let collector = Arc::clone(&collector);
      let runner = Arc::clone(&runner);
      let parent = Span::current();
      tokio::task::spawn_blocking(move || worker_loop(id, &parent, &queue, &collector, &runner))
    })
    .collect();

  for (worker, handle) in handles.into_iter().enumerate() {
    let processed = handle
      .await
      .map_err(|source| BenchmarkError::Worker { worker, source })?;
    tracing::debug!(worker, processed, "Worker joined");
  }

  Ok(())
}

/// Main benchmark runner.
///
/// Runs every task in `config`, prints each result as a JSON line on stdout
/// and persists the result set in both formats under `config.output_dir`.
///
/// If tasks remain queued once the workers are done (only possible with
/// zero workers) the run fails with [`BenchmarkError::Undrained`] and
/// neither file is written, rather than persisting an empty result set.
pub async fn run_benchmarks(config: &Config) -> Result<ResultSet, HarnessError> {
  let span = tracing::info_span!(
    "run_benchmarks",
    executable = %config.command.command.display(),
    workers = config.workers,
  );

  async {
    let total = config.tasks.len();
    tracing::info!(tasks = total, "--- Starting Benchmark Matrix ---");

    let queue = Arc::new(TaskQueue::preload(config.tasks.iter().cloned()));
    let collector = Arc::new(ResultCollector::new());
    let runner = Arc::new(TaskRunner::new(config.command.clone(), &config.output_dir)?);

    run_workers(config.workers, Arc::clone(&queue), Arc::clone(&collector), runner).await?;

    if !queue.is_empty() {
      return Err(
        BenchmarkError::Undrained {
          remaining: queue.len(),
          workers: config.workers,
        }
        .into(),
      );
    }

    let results = ResultSet::from(collector.drain());
    for result in &results {
      let line = serde_json::to_string(result).map_err(|source| BenchmarkError::SerializeResult {
        key: result.key.clone(),
        source,
      })?;
      println!("{}", line);
    }

    tracing::info!(
      completed = results.len(),
      failed = results.absent_count(),
      "--- Benchmark matrix complete ---"
    );

    store::save(&config.output_dir, &results)?;

    Ok::<_, HarnessError>(results)
  }
  .instrument(span)
  .await
}
