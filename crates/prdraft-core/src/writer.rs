use prdraft_agent::{Agent, AgentConfig, AgentError, AgentOutput};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

/// A generated pull request description
#[derive(Debug, Clone, Serialize)]
pub struct PrDescription {
    /// The agent's answer, trimmed
    pub text: String,
    pub agent: String,
    #[serde(rename = "duration_secs", serialize_with = "as_secs")]
    pub duration: Duration,
}

fn as_secs<S: serde::Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

/// Runs the description agent on a prepared prompt
pub struct DescriptionWriter<'a> {
    agent: &'a dyn Agent,
}

impl<'a> DescriptionWriter<'a> {
    pub fn new(agent: &'a dyn Agent) -> Self {
        Self { agent }
    }

    /// Run the agent on `prompt` and hand back whatever it produced
    pub async fn request(
        &self,
        prompt: &str,
        config: &AgentConfig,
    ) -> Result<AgentOutput, WriterError> {
        debug!(
            agent = self.agent.name(),
            prompt_len = prompt.len(),
            "Requesting description"
        );

        let output = self.agent.execute(prompt, config).await?;

        info!(
            exit_code = output.exit_code,
            duration_secs = output.duration.as_secs_f64(),
            "Description agent completed"
        );
        Ok(output)
    }

    /// Turn the agent's output into a description.
    ///
    /// A non-zero exit or a blank answer is an error.
    pub fn finish(&self, output: AgentOutput) -> Result<PrDescription, WriterError> {
        if !output.success() {
            return Err(WriterError::AgentFailed {
                exit_code: output.exit_code,
                detail: output.stderr_tail().unwrap_or("no error output").to_string(),
            });
        }

        let text = output.stdout.trim();
        if text.is_empty() {
            return Err(WriterError::EmptyResponse);
        }

        Ok(PrDescription {
            text: text.to_string(),
            agent: self.agent.name().to_string(),
            duration: output.duration,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WriterError {
    #[error("Agent execution error: {0}")]
    Agent(#[from] AgentError),

    #[error("Agent exited with code {exit_code}: {detail}")]
    AgentFailed { exit_code: i32, detail: String },

    #[error("Agent returned an empty description")]
    EmptyResponse,
}
