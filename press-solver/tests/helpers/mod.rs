//! Runs the solver binary for the integration tests.
#![allow(
    dead_code,
    reason = "is used in integration tests but unable to find a way to silence these warnings"
)]

use std::fs::File;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::ExitStatus;
use std::process::Stdio;
use std::time::Duration;

use regex::Regex;
use wait_timeout::ChildExt;

const TEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug)]
pub(crate) struct SolverRun {
    pub(crate) status: ExitStatus,
    pub(crate) stdout: String,
    pub(crate) stderr: String,
}

impl SolverRun {
    /// The value printed after `label:` on its own line, if any.
    pub(crate) fn reported(&self, label: &str) -> Option<String> {
        let pattern = Regex::new(&format!(r"(?m)^{}: (.+)$", regex::escape(label)))
            .expect("valid pattern");

        pattern
            .captures(&self.stdout)
            .map(|captures| captures[1].trim().to_owned())
    }

    pub(crate) fn indicator_total(&self) -> Option<u64> {
        self.reported("Total minimum indicator button presses")
            .map(|value| value.parse().expect("a number"))
    }

    pub(crate) fn joltage_total(&self) -> Option<u64> {
        self.reported("Total minimum joltage button presses")
            .map(|value| value.parse().expect("a number"))
    }
}

pub(crate) fn instance(name: &str) -> PathBuf {
    PathBuf::from(format!(
        "{}/tests/instances/{name}.txt",
        env!("CARGO_MANIFEST_DIR")
    ))
}

/// Runs the solver on `instance_path` with the given arguments; `prefix` keeps the output files
/// of concurrently running tests apart.
pub(crate) fn run_solver_with_options(
    instance_path: impl AsRef<Path>,
    args: impl IntoIterator<Item = String>,
    prefix: &str,
) -> SolverRun {
    let instance_path = instance_path.as_ref();
    let solver = PathBuf::from(env!("CARGO_BIN_EXE_press-solver"));

    let log_file_path = instance_path.with_extension(format!("{prefix}.log"));
    let err_file_path = instance_path.with_extension(format!("{prefix}.err"));

    let mut command = Command::new(solver);
    for arg in args {
        let _ = command.arg(arg);
    }

    let mut child = command
        .arg(instance_path)
        .stdout(File::create(&log_file_path).expect("Failed to create log file."))
        .stderr(File::create(&err_file_path).expect("Failed to create error file."))
        .stdin(Stdio::null())
        .spawn()
        .expect("Failed to run solver.");

    let status = match child.wait_timeout(TEST_TIMEOUT) {
        Ok(None) => {
            let _ = child.kill();
            panic!("solver took more than {} seconds", TEST_TIMEOUT.as_secs())
        }
        Ok(Some(status)) => status,
        Err(e) => panic!("error starting solver: {e}"),
    };

    let stdout = std::fs::read_to_string(&log_file_path).expect("Failed to read log file.");
    let stderr = std::fs::read_to_string(&err_file_path).expect("Failed to read error file.");
    std::fs::remove_file(log_file_path).expect("Failed to remove log file.");
    std::fs::remove_file(err_file_path).expect("Failed to remove error file.");

    SolverRun {
        status,
        stdout,
        stderr,
    }
}

pub(crate) fn run_solver(instance_path: impl AsRef<Path>, prefix: &str) -> SolverRun {
    run_solver_with_options(instance_path, std::iter::empty(), prefix)
}
