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
#![cfg(unix)]

use featbench::benchmark::TaskRunner;
use featbench::benchmark::run_benchmarks;
use featbench::benchmark::run_workers;
use featbench::command::CommandArgs;
use featbench::config::Config;
use featbench::error::BenchmarkError;
use featbench::error::HarnessError;
use featbench::matrix::Task;
use featbench::matrix::default_matrix;
use featbench::parser::Category;
use featbench::parser::Metric;
use featbench::queue::ResultCollector;
use featbench::queue::TaskQueue;
use featbench::store;
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tempfile::tempdir;

const SYNTHETIC_OUTPUT: &str = "\
#1 : LOAD IMAGE INTO BUFFER done
detector n=1200 t=14.5
descriptor t=2.25
matcher n=950 t=0.75
";

/// Writes `body` as a shell script and returns a command running it through
/// `/bin/sh`, so the script itself never needs to be executable.
fn stub(dir: &Path, body: &str) -> CommandArgs {
  let script = dir.join("tracker.sh");
  fs::write(&script, body).unwrap();
  CommandArgs {
    command: "/bin/sh".into(),
    args: vec![script.display().to_string()],
  }
}

fn always_succeeds(dir: &Path) -> CommandArgs {
  stub(dir, &format!("cat <<'OUT'\n{SYNTHETIC_OUTPUT}OUT\n"))
}

fn scratch() -> (TempDir, TempDir) {
  (tempdir().unwrap(), tempdir().unwrap())
}

#[test]
fn failed_task_is_absent_and_writes_no_log() {
  let (bin, out) = scratch();
  let command = stub(bin.path(), "echo 'matcher n=1 t=1.0'\necho 'cannot open camera' >&2\n");
  let runner = TaskRunner::new(command, out.path()).unwrap();

  let result = runner.run(&Task::new("HARRIS", "FREAK"));

  assert_eq!(result.key, "HARRIS_FREAK");
  assert!(result.is_absent());
  assert!(!out.path().join("HARRIS_FREAK.log").exists());
}

#[test]
fn successful_task_is_parsed_and_logged_verbatim() {
  let (bin, out) = scratch();
  let stdout = "matcher pass n=10 t=1.5\nmatcher pass n=20 t=2.5\nmatcher pass n=30 t=3.5\n";
  let command = stub(bin.path(), &format!("printf '%s' '{stdout}'\n"));
  let runner = TaskRunner::new(command, out.path()).unwrap();

  let result = runner.run(&Task::new("FAST", "BRIEF"));
  let metrics = result.metrics.expect("task should succeed");

  let n = metrics.series(Category::Matcher, Metric::N).unwrap();
  let t = metrics.series(Category::Matcher, Metric::T).unwrap();
  assert_eq!(n.as_counts(), Some(&[10, 20, 30][..]));
  assert_eq!(t.as_values(), Some(&[1.5, 2.5, 3.5][..]));

  let log = fs::read(out.path().join("FAST_BRIEF.log")).unwrap();
  assert_eq!(log, stdout.as_bytes());
}

#[test]
fn log_write_failure_keeps_the_parsed_result() {
  let (bin, out) = scratch();
  let command = stub(bin.path(), "echo 'detector n=42 t=3.0'\n");
  let missing = out.path().join("missing");
  let runner = TaskRunner::new(command, &missing).unwrap();

  let result = runner.run(&Task::new("BRISK", "BRISK"));

  assert!(!result.is_absent());
  let metrics = result.metrics.unwrap();
  assert_eq!(
    metrics.series(Category::Detector, Metric::N).unwrap().as_counts(),
    Some(&[42][..])
  );
  assert!(!missing.exists());
}

#[test]
fn invalid_utf8_stdout_is_parsed_lossily_and_logged_raw() {
  let (bin, out) = scratch();
  let command = stub(
    bin.path(),
    "echo 'detector n=4 t=1.0'\nprintf 'garbage \\377\\n'\necho 'detector n=5 t=2.0'\n",
  );
  let runner = TaskRunner::new(command, out.path()).unwrap();

  let result = runner.run(&Task::new("AKAZE", "AKAZE"));
  let metrics = result.metrics.expect("task should succeed");

  assert_eq!(
    metrics.series(Category::Detector, Metric::N).unwrap().as_counts(),
    Some(&[4, 5][..])
  );
  let log = fs::read(out.path().join("AKAZE_AKAZE.log")).unwrap();
  assert!(log.contains(&0xFF));
  assert!(log.ends_with(b"detector n=5 t=2.0\n"));
}

#[test]
fn missing_executable_is_recorded_as_absent() {
  let out = tempdir().unwrap();
  let runner = TaskRunner::new(CommandArgs::new("/nonexistent/tracker"), out.path()).unwrap();

  let result = runner.run(&Task::new("ORB", "ORB"));
  assert!(result.is_absent());
}

#[tokio::test]
async fn zero_workers_leave_the_queue_undrained() {
  let (bin, out) = scratch();
  let runner = Arc::new(TaskRunner::new(always_succeeds(bin.path()), out.path()).unwrap());
  let queue = Arc::new(TaskQueue::preload(default_matrix()));
  let collector = Arc::new(ResultCollector::new());

  run_workers(0, Arc::clone(&queue), Arc::clone(&collector), runner)
    .await
    .unwrap();

  assert_eq!(queue.len(), 42);
  assert!(collector.is_empty());
}

#[tokio::test]
async fn surplus_workers_exit_without_work() {
  let (bin, out) = scratch();
  let runner = Arc::new(TaskRunner::new(always_succeeds(bin.path()), out.path()).unwrap());
  let queue = Arc::new(TaskQueue::preload([Task::new("SIFT", "SIFT"), Task::new("ORB", "BRISK")]));
  let collector = Arc::new(ResultCollector::new());

  run_workers(8, Arc::clone(&queue), Arc::clone(&collector), runner)
    .await
    .unwrap();

  assert!(queue.is_empty());
  let keys: HashSet<_> = collector.drain().into_iter().map(|r| r.key).collect();
  assert_eq!(keys, HashSet::from(["SIFT_SIFT".to_string(), "ORB_BRISK".to_string()]));
}

#[tokio::test]
async fn default_matrix_end_to_end() {
  let (bin, out) = scratch();
  let config = Config::new(always_succeeds(bin.path()), 8, out.path().to_path_buf(), default_matrix());

  let results = run_benchmarks(&config).await.unwrap();

  assert_eq!(results.len(), 42);
  assert_eq!(results.absent_count(), 0);

  let expected: HashSet<String> = default_matrix().iter().map(Task::key).collect();
  let keys: HashSet<String> = results.iter().map(|r| r.key.clone()).collect();
  assert_eq!(keys, expected);

  for result in &results {
    let metrics = result.metrics.as_ref().unwrap();
    assert_eq!(
      metrics.series(Category::Detector, Metric::N).unwrap().as_counts(),
      Some(&[1200][..])
    );
    assert!(out.path().join(format!("{}.log", result.key)).exists());
  }

  let binary = store::read_binary(&out.path().join(store::BINARY_FILE)).unwrap();
  assert_eq!(binary, results);

  let json: Value =
    serde_json::from_str(&fs::read_to_string(out.path().join(store::JSON_FILE)).unwrap()).unwrap();
  let entries = json.as_array().unwrap();
  assert_eq!(entries.len(), 42);
  let json_keys: HashSet<String> = entries
    .iter()
    .map(|e| e[0].as_str().unwrap().to_string())
    .collect();
  assert_eq!(json_keys, expected);
  assert_eq!(entries[0][1]["descriptor"]["t"], serde_json::json!([2.25]));
}

#[tokio::test]
async fn failures_are_contained_per_task() {
  let (bin, out) = scratch();
  let command = stub(
    bin.path(),
    "if [ \"$2\" = \"SIFT\" ]; then echo 'SIFT unavailable' >&2; fi\necho 'detector n=5 t=1.0'\n",
  );
  let config = Config::new(command, 4, out.path().to_path_buf(), default_matrix());

  let results = run_benchmarks(&config).await.unwrap();

  assert_eq!(results.len(), 42);
  assert_eq!(results.absent_count(), 6);
  for result in &results {
    assert_eq!(result.is_absent(), result.key.starts_with("SIFT_"));
    assert_eq!(
      out.path().join(format!("{}.log", result.key)).exists(),
      !result.is_absent()
    );
  }

  let json: Value =
    serde_json::from_str(&fs::read_to_string(out.path().join(store::JSON_FILE)).unwrap()).unwrap();
  let nulls = json
    .as_array()
    .unwrap()
    .iter()
    .filter(|e| e[1].is_null())
    .count();
  assert_eq!(nulls, 6);
}

#[tokio::test]
async fn run_with_zero_workers_is_an_error_and_persists_nothing() {
  let (bin, out) = scratch();
  let config = Config::new(always_succeeds(bin.path()), 0, out.path().to_path_buf(), default_matrix());

  let err = run_benchmarks(&config).await.unwrap_err();

  assert!(matches!(
    err,
    HarnessError::Benchmark(BenchmarkError::Undrained { remaining: 42, workers: 0 })
  ));
  assert!(!out.path().join(store::BINARY_FILE).exists());
  assert!(!out.path().join(store::JSON_FILE).exists());
}
