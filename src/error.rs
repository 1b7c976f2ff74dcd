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
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error enum for the featbench library.
#[derive(Error, Debug)]
pub enum HarnessError {
  #[error("Configuration error")]
  Config(#[from] ConfigError),

  #[error("Benchmark run failed")]
  Benchmark(#[from] BenchmarkError),

  #[error("Failed to persist results")]
  Store(#[from] StoreError),
}

/// Errors related to configuration resolution (src/config.rs).
#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("Failed to load configuration")]
  Load(#[from] Box<figment::Error>),

  #[error("Output directory does not exist: {0}")]
  OutputDirNotFound(PathBuf),
}

impl From<figment::Error> for ConfigError {
  fn from(err: figment::Error) -> Self {
    ConfigError::Load(Box::new(err))
  }
}

/// Errors related to the benchmark execution (src/benchmark.rs).
#[derive(Error, Debug)]
pub enum BenchmarkError {
  #[error("Failed to compile metric patterns")]
  Patterns(#[from] regex::Error),

  #[error("Worker {worker} did not finish")]
  Worker {
    worker: usize,
    #[source]
    source: tokio::task::JoinError,
  },

  #[error("{remaining} task(s) left in the queue after all workers finished (workers = {workers})")]
  Undrained { remaining: usize, workers: usize },

  #[error("Failed to serialize result for {key}")]
  SerializeResult {
    key: String,
    #[source]
    source: serde_json::Error,
  },
}

/// Errors related to writing or reading persisted results (src/store.rs).
#[derive(Error, Debug)]
pub enum StoreError {
  #[error("Failed to write {path}")]
  Write {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to read {path}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to encode binary archive: {0}")]
  Encode(String),

  #[error("Invalid binary archive: {0}")]
  Decode(String),

  #[error("JSON serialization error: {0}")]
  Json(#[from] serde_json::Error),
}
