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

/// The tracking executable and the base arguments placed in front of the
/// per-task `-det`/`-des` flags.
#[derive(Debug, Clone)]
pub struct CommandArgs {
  /// The command to execute (e.g., "python3" or "../build/2D_feature_tracking").
  pub command: PathBuf,

  /// Base arguments (e.g., ["./tracker.py"]).
  pub args: Vec<String>,
}

impl CommandArgs {
  pub fn new(command: impl Into<PathBuf>) -> Self {
    Self {
      command: command.into(),
      args: Vec::new(),
    }
  }
}
