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
use crate::cli::RunArgs;
use crate::command::CommandArgs;
use crate::error::ConfigError;
use crate::matrix::Task;
use crate::matrix::default_matrix;
use figment::Figment;
use figment::providers::Env;
use figment::providers::Format;
use figment::providers::Json;
use figment::providers::Serialized;
use serde::Deserialize;
use serde::Serialize;
use std::path::PathBuf;

/// Prefix of the environment variables that override file settings.
pub const ENV_PREFIX: &str = "FEATBENCH_";

// --- Default Values ---
fn default_executable() -> PathBuf {
  PathBuf::from("../build/2D_feature_tracking")
}

fn default_workers() -> usize {
  8
}

fn default_output_dir() -> PathBuf {
  PathBuf::from(".")
}

/// Appends ".exe" to a path on Windows.
fn ensure_exe_suffix(path: PathBuf) -> PathBuf {
  #[cfg(target_os = "windows")]
  {
    if path.extension().is_none() {
      let mut p = path.into_os_string();
      p.push(".exe");
      return PathBuf::from(p);
    }
  }
  path
}

/// Raw settings as merged from defaults, file, environment and CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
  #[serde(default = "default_executable")]
  pub executable: PathBuf,
  #[serde(default)]
  pub args: Vec<String>,
  #[serde(default = "default_workers")]
  pub workers: usize,
  #[serde(default = "default_output_dir")]
  pub output_dir: PathBuf,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      executable: default_executable(),
      args: Vec::new(),
      workers: default_workers(),
      output_dir: default_output_dir(),
    }
  }
}

/// CLI flags that were actually given; unset ones leave lower layers alone.
#[derive(Debug, Serialize)]
struct CliOverrides {
  #[serde(skip_serializing_if = "Option::is_none")]
  executable: Option<PathBuf>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  args: Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  workers: Option<usize>,
  #[serde(skip_serializing_if = "Option::is_none")]
  output_dir: Option<PathBuf>,
}

/// Fully validated and resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
  pub command: CommandArgs,
  pub workers: usize,
  pub output_dir: PathBuf,
  pub tasks: Vec<Task>,
}

impl Config {
  /// Configuration for an explicit task list, bypassing file and environment.
  pub fn new(command: CommandArgs, workers: usize, output_dir: PathBuf, tasks: Vec<Task>) -> Self {
    Self {
      command,
      workers,
      output_dir,
      tasks,
    }
  }
}

impl TryFrom<Settings> for Config {
  type Error = ConfigError;

  fn try_from(settings: Settings) -> Result<Self, Self::Error> {
    if !settings.output_dir.is_dir() {
      return Err(ConfigError::OutputDirNotFound(settings.output_dir));
    }

    if settings.workers == 0 {
      tracing::warn!("Worker count is 0; no task will run");
    }

    Ok(Config {
      command: CommandArgs {
        command: ensure_exe_suffix(settings.executable),
        args: settings.args,
      },
      workers: settings.workers,
      output_dir: settings.output_dir,
      tasks: default_matrix(),
    })
  }
}

impl TryFrom<RunArgs> for Config {
  type Error = ConfigError;

  fn try_from(
    RunArgs {
      config,
      executable,
      workers,
      output_dir,
      executable_args,
    }: RunArgs,
  ) -> Result<Self, Self::Error> {
    let overrides = CliOverrides {
      executable,
      args: executable_args,
      workers,
      output_dir,
    };

    let settings: Settings = Figment::from(Serialized::defaults(Settings::default()))
      .merge(Json::file(&config))
      .merge(Env::prefixed(ENV_PREFIX).only(&["executable", "workers", "output_dir"]))
      .merge(Serialized::defaults(overrides))
      .extract()?;

    tracing::debug!(?settings, config_file = %config.display(), "Resolved settings");

    Config::try_from(settings)
  }
}
