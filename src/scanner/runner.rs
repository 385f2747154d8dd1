//! External process execution.
//!
//! Runs one tool as a child process with arguments passed as a discrete
//! argv list (no shell), captures both output streams and the exit code,
//! and enforces a timeout.

use crate::models::{InvocationOutcome, ToolInvocationResult};
use std::process::Stdio;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

/// The executable could not be started at all.
#[derive(Error, Debug)]
#[error("Failed to launch {executable}: {source}")]
pub struct LaunchError {
    pub executable: String,
    #[source]
    pub source: std::io::Error,
}

/// Runs external tools with a per-invocation timeout.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    timeout: Duration,
}

impl ProcessRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run a tool to completion.
    ///
    /// A nonzero exit code, empty output or a timeout is a normal result.
    /// Only a failure to spawn the process is returned as an error.
    ///
    /// The child is killed if this future is dropped before it finishes.
    pub async fn run(
        &self,
        tool: &str,
        executable: &str,
        args: &[String],
    ) -> Result<ToolInvocationResult, LaunchError> {
        let start_time = Instant::now();

        let child = Command::new(executable)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| LaunchError {
                executable: executable.to_string(),
                source,
            })?;

        debug!(pid = ?child.id(), "Spawned {} {:?}", executable, args);

        // Dropping the wait future on timeout drops the child, which kills it.
        let result = match timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => ToolInvocationResult {
                tool: tool.to_string(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                returncode: output.status.code(),
                outcome: InvocationOutcome::Exited,
                duration_ms: elapsed_ms(start_time),
            },
            Ok(Err(e)) => {
                warn!("Failed to collect output from {}: {}", executable, e);
                ToolInvocationResult {
                    tool: tool.to_string(),
                    stdout: String::new(),
                    stderr: format!("Failed to collect output: {}", e),
                    returncode: None,
                    outcome: InvocationOutcome::Exited,
                    duration_ms: elapsed_ms(start_time),
                }
            }
            Err(_) => {
                warn!("{} timed out after {:?}, killed", tool, self.timeout);
                ToolInvocationResult {
                    tool: tool.to_string(),
                    stdout: String::new(),
                    stderr: format!("Timed out after {}s", self.timeout.as_secs_f64()),
                    returncode: None,
                    outcome: InvocationOutcome::Timeout,
                    duration_ms: elapsed_ms(start_time),
                }
            }
        };

        debug!(
            returncode = ?result.returncode,
            outcome = %result.outcome,
            stdout_bytes = result.stdout.len(),
            stderr_bytes = result.stderr.len(),
            "{} finished in {}ms",
            tool,
            result.duration_ms
        );

        Ok(result)
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis().try_into().unwrap_or(u64::MAX)
}
