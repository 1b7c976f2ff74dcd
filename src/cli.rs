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
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
  version,
  about = "Benchmark every detector/descriptor combination of a feature-tracking executable"
)]
pub struct Cli {
  #[command(subcommand)]
  pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
  /// Run the whole detector x descriptor matrix and persist the results.
  Run(RunArgs),

  /// Print the key of every task in the matrix, one per line.
  List,
}

#[derive(Debug, Args)]
pub struct RunArgs {
  /// JSON configuration file. Missing files are ignored.
  #[arg(long, default_value = "featbench.json")]
  pub config: PathBuf,

  /// Path to the tracking executable.
  #[arg(long)]
  pub executable: Option<PathBuf>,

  /// Number of worker threads.
  #[arg(long, short = 'j')]
  pub workers: Option<usize>,

  /// Directory receiving the per-task logs and the aggregate result files.
  #[arg(long)]
  pub output_dir: Option<PathBuf>,

  /// All remaining arguments are passed to the executable before `-det`/`-des`.
  #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
  pub executable_args: Vec<String>,
}
