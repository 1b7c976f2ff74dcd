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
//! Persisted forms of a finished run.
//!
//! The full [`ResultSet`] is written twice, one file after the other, with
//! no atomicity between them:
//!
//! * `logs.bin`: an `rkyv` archive, read back with [`read_binary`].
//! * `logs.json`: `[[key, value-or-null], ...]`, where `value` maps category
//!   name to metric name to an array of numbers.

use crate::error::StoreError;
use crate::parser::ParsedResult;
use rkyv::Archive;
use rkyv::Deserialize as RkyvDeserialize;
use rkyv::Infallible;
use rkyv::Serialize as RkyvSerialize;
use serde::Serialize;
use serde::Serializer;
use std::fs;
use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

pub const BINARY_FILE: &str = "logs.bin";
pub const JSON_FILE: &str = "logs.json";

/// Outcome of one task. `metrics` is `None` when the run failed.
#[derive(Debug, Clone, PartialEq, Archive, RkyvSerialize, RkyvDeserialize)]
#[archive(check_bytes)]
pub struct TaskResult {
  pub key: String,
  pub metrics: Option<ParsedResult>,
}

impl TaskResult {
  pub fn parsed(key: impl Into<String>, metrics: ParsedResult) -> Self {
    Self {
      key: key.into(),
      metrics: Some(metrics),
    }
  }

  pub fn failed(key: impl Into<String>) -> Self {
    Self {
      key: key.into(),
      metrics: None,
    }
  }

  pub fn is_absent(&self) -> bool {
    self.metrics.is_none()
  }
}

impl Serialize for TaskResult {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    (&self.key, &self.metrics).serialize(serializer)
  }
}

/// Every task's result, in completion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Archive, RkyvSerialize, RkyvDeserialize)]
#[archive(check_bytes)]
#[serde(transparent)]
pub struct ResultSet {
  pub results: Vec<TaskResult>,
}

impl ResultSet {
  pub fn len(&self) -> usize {
    self.results.len()
  }

  pub fn is_empty(&self) -> bool {
    self.results.is_empty()
  }

  pub fn iter(&self) -> std::slice::Iter<'_, TaskResult> {
    self.results.iter()
  }

  pub fn absent_count(&self) -> usize {
    self.results.iter().filter(|r| r.is_absent()).count()
  }
}

impl From<Vec<TaskResult>> for ResultSet {
  fn from(results: Vec<TaskResult>) -> Self {
    Self { results }
  }
}

impl<'a> IntoIterator for &'a ResultSet {
  type Item = &'a TaskResult;
  type IntoIter = std::slice::Iter<'a, TaskResult>;

  fn into_iter(self) -> Self::IntoIter {
    self.results.iter()
  }
}

/// Writes the binary archive to `path`.
pub fn write_binary(path: &Path, results: &ResultSet) -> Result<(), StoreError> {
  let bytes = rkyv::to_bytes::<_, 4096>(results).map_err(|e| StoreError::Encode(e.to_string()))?;

  fs::write(path, &bytes).map_err(|source| StoreError::Write {
    path: path.to_path_buf(),
    source,
  })
}

/// Loads and validates a binary archive written by [`write_binary`].
pub fn read_binary(path: &Path) -> Result<ResultSet, StoreError> {
  let bytes = fs::read(path).map_err(|source| StoreError::Read {
    path: path.to_path_buf(),
    source,
  })?;

  let mut buf = rkyv::AlignedVec::with_capacity(bytes.len());
  buf.extend_from_slice(&bytes);

  let archived = rkyv::check_archived_root::<ResultSet>(&buf)
    .map_err(|e| StoreError::Decode(e.to_string()))?;

  match archived.deserialize(&mut Infallible) {
    Ok(results) => Ok(results),
    Err(never) => match never {},
  }
}

/// Writes the JSON document to `path`.
pub fn write_json(path: &Path, results: &ResultSet) -> Result<(), StoreError> {
  let write_err = |source: std::io::Error| StoreError::Write {
    path: path.to_path_buf(),
    source,
  };

  let file = File::create(path).map_err(write_err)?;
  let mut writer = BufWriter::new(file);
  serde_json::to_writer(&mut writer, results)?;
  writer.flush().map_err(write_err)
}

/// Writes both formats into `dir`, binary first. Returns the two paths.
pub fn save(dir: &Path, results: &ResultSet) -> Result<(PathBuf, PathBuf), StoreError> {
  let binary_path = dir.join(BINARY_FILE);
  let json_path = dir.join(JSON_FILE);

  write_binary(&binary_path, results)?;
  tracing::info!(path = %binary_path.display(), "Binary results written");

  write_json(&json_path, results)?;
  tracing::info!(path = %json_path.display(), "JSON results written");

  Ok((binary_path, json_path))
}
