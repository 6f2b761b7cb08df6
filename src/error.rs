use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// A single problem found while validating the publish configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    /// Config key the issue belongs to (e.g. `html_output_path`)
    pub field: &'static str,
    pub problem: IssueKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    Empty,
    Missing(PathBuf),
    NotADirectory(PathBuf),
    NotARepository(PathBuf),
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.problem {
            IssueKind::Empty => write!(f, "{} is not set", self.field),
            IssueKind::Missing(path) => {
                write!(f, "{} does not exist: {}", self.field, path.display())
            }
            IssueKind::NotADirectory(path) => {
                write!(f, "{} is not a directory: {}", self.field, path.display())
            }
            IssueKind::NotARepository(path) => {
                write!(
                    f,
                    "{} is not a git working tree: {}",
                    self.field,
                    path.display()
                )
            }
        }
    }
}

fn join_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

fn display_code(code: &Option<i32>) -> String {
    code.map(|c| c.to_string())
        .unwrap_or_else(|| "none".to_string())
}

/// Unified error type for note-publish operations
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration: {}", join_issues(.0))]
    InvalidConfig(Vec<ConfigIssue>),

    #[error("Command `{command}` failed with exit code {}: {stderr}", display_code(.code))]
    CommandExecution {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Command `{command}` could not be started: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cancelled by user")]
    Cancelled,

    #[error("Another publish is already running (lock file {})", .lock.display())]
    AlreadyRunning { lock: PathBuf },

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in note-publish
pub type Result<T> = std::result::Result<T, PublishError>;

impl PublishError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        PublishError::Config(msg.into())
    }

    /// True for both flavours of subprocess failure.
    pub fn is_command_failure(&self) -> bool {
        matches!(
            self,
            PublishError::CommandExecution { .. } | PublishError::Spawn { .. }
        )
    }
}
