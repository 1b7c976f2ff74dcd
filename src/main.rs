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
use Commands::List;
use Commands::Run;
use anyhow::Result;
use clap::Parser;
use featbench::benchmark::run_benchmarks;
use featbench::cli::Cli;
use featbench::cli::Commands;
use featbench::config::Config;
use featbench::logging::setup_tracing;
use featbench::matrix::default_matrix;

#[tokio::main]
async fn main() -> Result<()> {
  let _log_guard = setup_tracing()?;

  let Cli { command } = Cli::parse();
  let main_span = tracing::info_span!("orchestrator");
  let _enter = main_span.enter();

  match command {
    List => {
      for task in default_matrix() {
        println!("{}", task.key());
      }
    }
    Run(run_args) => {
      tracing::info!("Initializing Benchmark Run...");

      let config = Config::try_from(run_args)?;

      let results = run_benchmarks(&config).await?;

      tracing::info!(
        results = results.len(),
        failed = results.absent_count(),
        "Benchmark Run Complete."
      );
    }
  }

  Ok(())
}
