use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, trace, warn};

use crate::{AgentConfig, AgentError, AgentOutput};

/// Utility for spawning agent processes
pub struct ProcessSpawner;

impl ProcessSpawner {
    /// Spawn a process, optionally feed `stdin_input`, and capture its output.
    ///
    /// The child is killed if the configured timeout elapses first.
    pub async fn spawn(
        binary: &Path,
        args: &[&str],
        stdin_input: Option<&str>,
        config: &AgentConfig,
    ) -> Result<AgentOutput, AgentError> {
        let start = Instant::now();

        debug!(
            binary = %binary.display(),
            arg_count = args.len(),
            stdin_bytes = stdin_input.map(str::len).unwrap_or(0),
            working_dir = %config.working_dir.display(),
            "Spawning agent process"
        );

        let mut cmd = Command::new(binary);
        cmd.args(args)
            .current_dir(&config.working_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(if stdin_input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .kill_on_drop(true);

        for (key, value) in &config.env_vars {
            cmd.env(key, value);
        }

        let mut child = cmd.spawn().map_err(|e| match e.kind() {
            ErrorKind::NotFound => AgentError::NotFound(binary.display().to_string()),
            _ => AgentError::SpawnFailed(e),
        })?;

        // Written from a separate task so a chatty child cannot deadlock us
        // on a full stdout pipe while we are still writing its input.
        if let (Some(input), Some(mut stdin)) = (stdin_input, child.stdin.take()) {
            let input = input.to_owned();
            tokio::spawn(async move {
                if let Err(e) = stdin.write_all(input.as_bytes()).await {
                    warn!(error = %e, "Failed to write agent stdin");
                }
            });
        }

        let wait = child.wait_with_output();
        let output = match config.timeout {
            Some(limit) => tokio::time::timeout(limit, wait)
                .await
                .map_err(|_| AgentError::Timeout(limit))??,
            None => wait.await?,
        };
        let duration = start.elapsed();

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        let exit_code = output.status.code().unwrap_or(-1);

        trace!(
            stdout_lines = stdout.lines().count(),
            stderr_lines = stderr.lines().count(),
            "Captured agent output"
        );
        debug!(
            exit_code,
            duration_ms = duration.as_millis(),
            "Agent process completed"
        );

        Ok(AgentOutput::new(stdout, stderr, exit_code, duration))
    }
}
