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
use std::fmt;

/// Keypoint detectors the tracking executable understands (`-det`).
pub const DETECTORS: [&str; 7] = ["SHITOMASI", "HARRIS", "FAST", "BRISK", "ORB", "AKAZE", "SIFT"];

/// Keypoint descriptors the tracking executable understands (`-des`).
pub const DESCRIPTORS: [&str; 6] = ["BRISK", "BRIEF", "ORB", "FREAK", "AKAZE", "SIFT"];

/// One detector/descriptor combination to benchmark.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Task {
  pub detector: String,
  pub descriptor: String,
}

impl Task {
  pub fn new(detector: impl Into<String>, descriptor: impl Into<String>) -> Self {
    Self {
      detector: detector.into(),
      descriptor: descriptor.into(),
    }
  }

  /// The result key, `<detector>_<descriptor>`.
  ///
  /// Also the stem of the per-task log file.
  pub fn key(&self) -> String {
    format!("{}_{}", self.detector, self.descriptor)
  }
}

impl fmt::Display for Task {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}_{}", self.detector, self.descriptor)
  }
}

/// The full detector x descriptor cross product, detector-major.
pub fn default_matrix() -> Vec<Task> {
  DETECTORS
    .iter()
    .flat_map(|det| DESCRIPTORS.iter().map(move |des| Task::new(*det, *des)))
    .collect()
}
