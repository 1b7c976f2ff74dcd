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

//! # Featbench
//!
//! `featbench` benchmarks a 2D feature-tracking executable over every
//! combination of keypoint detector and descriptor. Each combination runs
//! as a separate process; its stdout is parsed into per-stage metric
//! series and the whole matrix is persisted for later analysis.
//!
//! ## Core Modules
//!
//! * [`matrix`]: The fixed detector and descriptor lists and the [`matrix::Task`] pair.
//! * [`parser`]: Turns one run's stdout into a [`parser::ParsedResult`].
//! * [`invoker`]: Runs the executable for one task and classifies the outcome.
//! * [`queue`]: Lock-free task queue and result collector shared by workers.
//! * [`benchmark`]: The worker pool and the `run_benchmarks` controller.
//! * [`store`]: Writes and reads the binary and JSON result files.
//! * [`config`]: Resolves `RunArgs`, config file and environment into a `Config`.
//! * [`cli`]: Defines the `clap`-based command-line interface.
//! * [`command`]: Defines the shared `CommandArgs` struct.
//! * [`error`]: Defines the custom error types for the library.
//! * [`logging`]: Provides the `setup_tracing` utility.

pub mod benchmark;
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod invoker;
pub mod logging;
pub mod matrix;
pub mod parser;
pub mod queue;
pub mod store;
