use std::sync::Arc;
use tracing::{info, warn};

use prdraft_agent::{Agent, AgentConfig};
use prdraft_git::{Patch, PatchExtractor, PatchRequest, DEFAULT_REMOTE};
use prdraft_logging::{LogEvent, Logger};

use crate::error::RunError;
use crate::outcome::PipelineOutcome;
use crate::prompts::{DescriptionPrompts, PromptContext, DEFAULT_MAX_DIFF_BYTES};
use crate::writer::DescriptionWriter;

/// Extracts the patch between two branches and has the agent describe it
pub struct Pipeline<'a> {
    agent: &'a dyn Agent,
    agent_config: AgentConfig,
    logger: Arc<Logger>,
    remote: String,
    max_diff_bytes: usize,
}

impl<'a> Pipeline<'a> {
    pub fn new(agent: &'a dyn Agent, agent_config: AgentConfig, logger: Arc<Logger>) -> Self {
        Self {
            agent,
            agent_config,
            logger,
            remote: DEFAULT_REMOTE.to_string(),
            max_diff_bytes: DEFAULT_MAX_DIFF_BYTES,
        }
    }

    /// Remote whose HEAD names the default base branch
    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    pub fn with_max_diff_bytes(mut self, max_diff_bytes: usize) -> Self {
        self.max_diff_bytes = max_diff_bytes;
        self
    }

    pub async fn ensure_agent_available(&self) -> Result<(), RunError> {
        if self.agent.is_available().await {
            Ok(())
        } else {
            Err(RunError::AgentUnavailable {
                agent: self.agent.name().to_string(),
                binary: self.agent.binary_path().to_path_buf(),
            })
        }
    }

    /// Compute the patch only, without involving the agent
    pub fn extract(&self, request: &PatchRequest) -> Result<Patch, RunError> {
        self.logger.log(&LogEvent::RunStarted {
            repo_path: request.repo_path.clone(),
            feature_branch: request.feature_branch.clone(),
            base_branch: request.base_branch.clone(),
        });

        let patch = PatchExtractor::new(&self.logger)
            .with_remote(self.remote.as_str())
            .extract(request)?;
        Ok(patch)
    }

    /// Run extraction and, when there is something to describe, the agent.
    ///
    /// Identical branches short-circuit to [`PipelineOutcome::NoChanges`]
    /// before the agent is even looked up.
    pub async fn run(&self, request: &PatchRequest) -> Result<PipelineOutcome, RunError> {
        let patch = self.extract(request)?;

        if patch.is_empty() {
            warn!(
                feature = %patch.feature_branch,
                base = %patch.base_branch,
                "Branches are identical, skipping the agent"
            );
            self.logger.log(&LogEvent::PatchEmpty {
                feature_branch: patch.feature_branch.clone(),
                base_branch: patch.base_branch.clone(),
            });
            return Ok(PipelineOutcome::NoChanges {
                feature_branch: patch.feature_branch,
                base_branch: patch.base_branch,
            });
        }

        self.ensure_agent_available().await?;
        self.describe(patch).await
    }

    /// Have the agent describe an already extracted, non-empty patch
    pub async fn describe(&self, patch: Patch) -> Result<PipelineOutcome, RunError> {
        let context = PromptContext {
            feature_branch: &patch.feature_branch,
            base_branch: &patch.base_branch,
            max_diff_bytes: self.max_diff_bytes,
        };
        let (_, diff_truncated) = DescriptionPrompts::truncate_diff(&patch.text, self.max_diff_bytes);
        if diff_truncated {
            warn!(
                diff_len = patch.text.len(),
                max_diff_bytes = self.max_diff_bytes,
                "Diff truncated for the agent"
            );
        }
        let prompt = DescriptionPrompts::build(&patch.text, context);

        self.logger.log(&LogEvent::AgentStarted {
            agent: self.agent.name().to_string(),
            model: self.agent_config.model.clone(),
            prompt_bytes: prompt.len(),
        });

        let writer = DescriptionWriter::new(self.agent);
        let output = writer.request(&prompt, &self.agent_config).await?;
        self.logger.log(&LogEvent::AgentCompleted {
            agent: self.agent.name().to_string(),
            exit_code: output.exit_code,
            duration_secs: output.duration.as_secs_f64(),
        });

        let description = writer.finish(output)?;
        info!(chars = description.text.len(), "Description generated");
        self.logger.log(&LogEvent::DescriptionReady {
            chars: description.text.chars().count(),
        });

        Ok(PipelineOutcome::Described {
            feature_branch: patch.feature_branch,
            base_branch: patch.base_branch,
            base_source: patch.base_source,
            summary: patch.summary,
            diff_truncated,
            description,
        })
    }
}
