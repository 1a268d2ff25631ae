use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use git2::{Commit, Oid, Repository, RepositoryInitOptions, Signature};
use prdraft_agent::{Agent, AgentConfig, AgentError, AgentOutput, AgentType};
use prdraft_core::{Pipeline, PipelineOutcome, RunError, WriterError};
use prdraft_git::{BranchRole, PatchError, PatchRequest};
use prdraft_logging::{BaseSource, LogFormat, Logger};
use tempfile::TempDir;

/// Agent double that records prompts and replies with a canned output.
struct StubAgent {
    stdout: String,
    exit_code: i32,
    available: bool,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl StubAgent {
    fn replying(stdout: &str) -> Self {
        Self {
            stdout: stdout.to_string(),
            exit_code: 0,
            available: true,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    fn failing(exit_code: i32) -> Self {
        Self {
            exit_code,
            ..Self::replying("")
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl Agent for StubAgent {
    fn name(&self) -> &str {
        "Stub"
    }

    fn agent_type(&self) -> AgentType {
        AgentType::ClaudeCode
    }

    async fn execute(&self, prompt: &str, _config: &AgentConfig) -> Result<AgentOutput, AgentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        Ok(AgentOutput::new(
            self.stdout.clone(),
            if self.exit_code == 0 {
                String::new()
            } else {
                "quota exceeded".to_string()
            },
            self.exit_code,
            Duration::from_millis(250),
        ))
    }

    async fn is_available(&self) -> bool {
        self.available
    }

    fn binary_path(&self) -> &Path {
        Path::new("stub")
    }
}

/// Helper: write files into the work tree and commit them onto `update_ref`.
fn commit_files(
    repo: &Repository,
    update_ref: &str,
    parents: &[&Commit<'_>],
    files: &[(&str, &str)],
    message: &str,
) -> Oid {
    let workdir = repo.workdir().unwrap().to_path_buf();
    let mut index = repo.index().unwrap();
    for &(name, content) in files {
        fs::write(workdir.join(name), content).unwrap();
        index.add_path(Path::new(name)).unwrap();
    }
    index.write().unwrap();

    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let sig = Signature::now("Test User", "test@example.com").unwrap();
    repo.commit(Some(update_ref), &sig, &sig, message, &tree, parents)
        .unwrap()
}

/// Helper: `main` with README.md, `feature` adding a file, `same` at `main`.
fn create_test_repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    let mut opts = RepositoryInitOptions::new();
    opts.initial_head("main");
    let repo = Repository::init_opts(dir.path(), &opts).unwrap();

    let main_oid = commit_files(
        &repo,
        "HEAD",
        &[],
        &[("README.md", "This is the main branch.\n")],
        "Initial commit on main",
    );
    let main_commit = repo.find_commit(main_oid).unwrap();

    repo.branch("feature", &main_commit, false).unwrap();
    commit_files(
        &repo,
        "refs/heads/feature",
        &[&main_commit],
        &[("feature_file.txt", "A new file.\n")],
        "Add feature file",
    );
    repo.branch("same", &main_commit, false).unwrap();

    dir
}

fn pipeline<'a>(agent: &'a StubAgent, dir: &Path) -> Pipeline<'a> {
    let logger = Arc::new(Logger::new(LogFormat::Compact));
    Pipeline::new(agent, AgentConfig::new(PathBuf::from(dir)), logger)
}

#[tokio::test]
async fn test_identical_branches_skip_the_agent() {
    let dir = create_test_repo();
    let agent = StubAgent::replying("should not be used");
    let request = PatchRequest::new(dir.path(), "same").with_base_branch("main");

    let outcome = pipeline(&agent, dir.path()).run(&request).await.unwrap();

    assert!(outcome.is_no_changes());
    assert!(outcome.description().is_none());
    assert_eq!(outcome.base_branch(), "main");
    assert_eq!(agent.calls(), 0);
}

#[tokio::test]
async fn test_feature_branch_is_described() {
    let dir = create_test_repo();
    let agent = StubAgent::replying("\n\n# Add feature file\n\nAdds feature_file.txt.\n\n");
    let request = PatchRequest::new(dir.path(), "feature");

    let outcome = pipeline(&agent, dir.path()).run(&request).await.unwrap();

    assert_eq!(agent.calls(), 1);
    let prompt = agent.last_prompt().unwrap();
    assert!(prompt.contains("+++ b/feature_file.txt"));
    assert!(prompt.contains("merging `feature` into `main`"));

    match outcome {
        PipelineOutcome::Described {
            base_branch,
            base_source,
            summary,
            diff_truncated,
            description,
            ..
        } => {
            assert_eq!(base_branch, "main");
            assert_eq!(base_source, BaseSource::LocalFallback);
            assert_eq!(summary.files_changed, 1);
            assert!(!diff_truncated);
            assert_eq!(description.text, "# Add feature file\n\nAdds feature_file.txt.");
            assert_eq!(description.agent, "Stub");
        }
        other => panic!("expected a description, got {:?}", other),
    }
}

#[tokio::test]
async fn test_large_diff_is_truncated_for_the_agent() {
    let dir = create_test_repo();
    let agent = StubAgent::replying("Short description");
    let request = PatchRequest::new(dir.path(), "feature").with_base_branch("main");

    let outcome = pipeline(&agent, dir.path())
        .with_max_diff_bytes(40)
        .run(&request)
        .await
        .unwrap();

    assert!(outcome.is_truncated());
    assert!(agent.last_prompt().unwrap().contains("the diff was cut"));
}

#[tokio::test]
async fn test_agent_failure_is_reported() {
    let dir = create_test_repo();
    let agent = StubAgent::failing(2);
    let request = PatchRequest::new(dir.path(), "feature").with_base_branch("main");

    let err = pipeline(&agent, dir.path()).run(&request).await.unwrap_err();

    assert!(matches!(
        err,
        RunError::Writer(WriterError::AgentFailed { exit_code: 2, ref detail }) if detail == "quota exceeded"
    ));
}

#[tokio::test]
async fn test_agent_completion_is_logged_with_real_exit_code() {
    let dir = create_test_repo();
    let log_dir = TempDir::new().unwrap();
    let log_path = log_dir.path().join("run.jsonl");
    let logger = Arc::new(Logger::with_file(LogFormat::Compact, &log_path).unwrap());
    let agent = StubAgent::failing(2);
    let request = PatchRequest::new(dir.path(), "feature").with_base_branch("main");

    let result = Pipeline::new(&agent, AgentConfig::new(PathBuf::from(dir.path())), logger)
        .run(&request)
        .await;
    assert!(result.is_err());

    let events: Vec<serde_json::Value> = fs::read_to_string(&log_path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    let completed = events
        .iter()
        .find(|event| event["event"] == "agent_completed")
        .expect("agent_completed event");
    assert_eq!(completed["agent"], "Stub");
    assert_eq!(completed["exit_code"], 2);
    assert_eq!(completed["duration_secs"], 0.25);
    assert!(!events.iter().any(|event| event["event"] == "description_ready"));
}

#[tokio::test]
async fn test_blank_agent_answer_is_an_error() {
    let dir = create_test_repo();
    let agent = StubAgent::replying("   \n");
    let request = PatchRequest::new(dir.path(), "feature").with_base_branch("main");

    let err = pipeline(&agent, dir.path()).run(&request).await.unwrap_err();

    assert!(matches!(err, RunError::Writer(WriterError::EmptyResponse)));
}

#[tokio::test]
async fn test_patch_errors_stop_before_the_agent() {
    let dir = create_test_repo();
    let agent = StubAgent::replying("unused");
    let request = PatchRequest::new(dir.path(), "missing").with_base_branch("main");

    let err = pipeline(&agent, dir.path()).run(&request).await.unwrap_err();

    assert!(matches!(
        err,
        RunError::Patch(PatchError::BranchNotFound {
            role: BranchRole::Feature,
            ..
        })
    ));
    assert_eq!(err.to_string(), "Feature branch 'missing' not found");
    assert_eq!(agent.calls(), 0);
}

#[tokio::test]
async fn test_unavailable_agent() {
    let dir = create_test_repo();
    let agent = StubAgent {
        available: false,
        ..StubAgent::replying("unused")
    };
    let request = PatchRequest::new(dir.path(), "feature").with_base_branch("main");

    let err = pipeline(&agent, dir.path()).run(&request).await.unwrap_err();

    assert!(matches!(
        err,
        RunError::AgentUnavailable { ref agent, ref binary } if agent == "Stub" && binary == Path::new("stub")
    ));
    assert!(err.to_string().contains("at 'stub'"));
    assert_eq!(agent.calls(), 0);
}

#[tokio::test]
async fn test_identical_branches_do_not_need_an_agent() {
    let dir = create_test_repo();
    let agent = StubAgent {
        available: false,
        ..StubAgent::replying("unused")
    };
    let request = PatchRequest::new(dir.path(), "same").with_base_branch("main");

    let outcome = pipeline(&agent, dir.path()).run(&request).await.unwrap();

    assert!(outcome.is_no_changes());
}

#[test]
fn test_exit_codes() {
    let patch_err = RunError::Patch(PatchError::AmbiguousBaseBranch);
    let writer_err = RunError::Writer(WriterError::EmptyResponse);
    let missing_agent = RunError::AgentUnavailable {
        agent: "Stub".to_string(),
        binary: PathBuf::from("stub"),
    };

    assert_eq!(patch_err.exit_code(), 2);
    assert_eq!(writer_err.exit_code(), 3);
    assert_eq!(missing_agent.exit_code(), 3);
}
