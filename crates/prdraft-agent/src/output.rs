use std::time::Duration;

/// Output captured from an agent execution
#[derive(Debug, Clone)]
pub struct AgentOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code from the process, -1 when killed by a signal
    pub exit_code: i32,
    pub duration: Duration,
}

impl AgentOutput {
    pub fn new(stdout: String, stderr: String, exit_code: i32, duration: Duration) -> Self {
        Self {
            stdout,
            stderr,
            exit_code,
            duration,
        }
    }

    /// Check if the agent exited successfully
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Last non-empty stderr line, for error messages
    pub fn stderr_tail(&self) -> Option<&str> {
        self.stderr
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_and_stderr_tail() {
        let output = AgentOutput::new(
            String::new(),
            "warming up\nrate limited\n\n".to_string(),
            2,
            Duration::from_millis(1500),
        );
        assert!(!output.success());
        assert_eq!(output.stderr_tail(), Some("rate limited"));

        let quiet = AgentOutput::new("ok".to_string(), String::new(), 0, Duration::ZERO);
        assert!(quiet.success());
        assert_eq!(quiet.stderr_tail(), None);
    }
}
