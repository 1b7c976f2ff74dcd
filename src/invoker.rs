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
use crate::matrix::Task;
use std::io;
use std::process::Command;
use std::process::Stdio;

/// Captured outcome of one run of the tracking executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
  /// Nothing was written to stderr.
  Succeeded { stdout: Vec<u8> },
  /// Something was written to stderr, whatever the exit code.
  Failed { stderr: Vec<u8>, code: Option<i32> },
}

impl Invocation {
  pub fn is_success(&self) -> bool {
    matches!(self, Invocation::Succeeded { .. })
  }
}

/// Runs `<command> [args..] -det <detector> -des <descriptor>` to completion.
///
/// Blocks until the child exits; there is no timeout. An `Err` means the
/// process could not be started or its pipes could not be read.
pub fn invoke(command: &CommandArgs, task: &Task) -> io::Result<Invocation> {
  let mut cmd = Command::new(&command.command);
  cmd
    .args(&command.args)
    .arg("-det")
    .arg(&task.detector)
    .arg("-des")
    .arg(&task.descriptor)
    .stdin(Stdio::null());

  tracing::debug!(cmd = ?cmd, "Spawning tracker");
  let output = cmd.output()?;

  if output.stderr.is_empty() {
    Ok(Invocation::Succeeded {
      stdout: output.stdout,
    })
  } else {
    Ok(Invocation::Failed {
      stderr: output.stderr,
      code: output.status.code(),
    })
  }
}

#[cfg(all(test, unix))]
mod tests {
  use super::*;

  fn sh(script: &str) -> CommandArgs {
    CommandArgs {
      command: "/bin/sh".into(),
      args: vec!["-c".to_string(), script.to_string(), "tracker".to_string()],
    }
  }

  #[test]
  fn passes_detector_and_descriptor_flags() {
    let task = Task::new("FAST", "BRIEF");
    let outcome = invoke(&sh(r#"printf '%s\n' "$*""#), &task).unwrap();

    assert_eq!(
      outcome,
      Invocation::Succeeded {
        stdout: b"-det FAST -des BRIEF\n".to_vec()
      }
    );
  }

  #[test]
  fn any_stderr_output_is_a_failure_even_on_exit_zero() {
    let task = Task::new("ORB", "ORB");
    let outcome = invoke(&sh("echo detector n=1; echo oops >&2; exit 0"), &task).unwrap();

    assert!(!outcome.is_success());
    match outcome {
      Invocation::Failed { stderr, code } => {
        assert_eq!(stderr, b"oops\n");
        assert_eq!(code, Some(0));
      }
      other => panic!("unexpected outcome {other:?}"),
    }
  }

  #[test]
  fn nonzero_exit_with_clean_stderr_is_a_success() {
    let outcome = invoke(&sh("echo matcher n=2; exit 3"), &Task::new("SIFT", "SIFT")).unwrap();
    assert!(outcome.is_success());
  }

  #[test]
  fn missing_executable_is_an_io_error() {
    let command = CommandArgs::new("/nonexistent/featbench-tracker");
    assert!(invoke(&command, &Task::new("FAST", "ORB")).is_err());
  }
}
