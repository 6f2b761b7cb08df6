//! Main workflow orchestration logic
//!
//! Wires the terminal collaborators, the in-flight locks and the
//! [`Publisher`] together. Kept apart from `main.rs` so the workflow can be
//! called programmatically without depending on clap.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::Config;
use crate::error::{ConfigIssue, IssueKind, PublishError, Result};
use crate::git::{self, PublishLock};
use crate::publish::{self, plan, Publisher, RunOutcome, Trigger};
use crate::runner::SystemRunner;
use crate::ui::{self, FixedPrompt, MessagePrompt, TerminalPrompt, TerminalUi};

/// Arguments for the publish workflow
///
/// Mirrors the CLI flags in a form that does not depend on clap.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PublishWorkflowArgs {
    /// Commit message to use instead of prompting
    pub message: Option<String>,

    /// Use the default message without prompting
    pub assume_yes: bool,

    /// Preview mode - print the steps, run nothing
    pub dry_run: bool,

    /// Print a progress line this often while a command runs
    pub heartbeat: Option<Duration>,
}

/// Result of the publish workflow
#[derive(Debug)]
pub enum WorkflowResult {
    DryRun,
    Ran(RunOutcome),
}

impl WorkflowResult {
    pub fn exit_code(&self) -> i32 {
        match self {
            WorkflowResult::DryRun => 0,
            WorkflowResult::Ran(outcome) => outcome.exit_code(),
        }
    }
}

/// Repositories a trigger will commit in, in the order they are used.
pub fn repositories(config: &Config, trigger: Trigger) -> Vec<(&'static str, PathBuf)> {
    let source = ("markdown_source_path", config.markdown_source_dir());
    match trigger {
        Trigger::SyncSource => vec![source],
        Trigger::Publish { sync_source } => {
            let site_field = if config.site_repository_override().is_some() {
                "git.site_repository"
            } else {
                "generator_project_path"
            };
            let mut repos = vec![(site_field, config.site_repository_dir())];
            if sync_source && config.also_sync_markdown {
                repos.push(source);
            }
            repos
        }
    }
}

/// Flags repositories that are not git working trees.
pub fn repository_issues(config: &Config, trigger: Trigger) -> Vec<ConfigIssue> {
    repositories(config, trigger)
        .into_iter()
        .filter(|(_, path)| !git::is_work_tree(path))
        .map(|(field, path)| ConfigIssue {
            field,
            problem: IssueKind::NotARepository(path),
        })
        .collect()
}

/// Every issue `check` reports: paths first, then repositories.
pub fn all_issues(config: &Config, trigger: Trigger) -> Vec<ConfigIssue> {
    let issues = config.validate();
    if !issues.is_empty() {
        return issues;
    }
    repository_issues(config, trigger)
}

fn acquire_locks(config: &Config, trigger: Trigger) -> Result<Vec<PublishLock>> {
    let mut locks: Vec<PublishLock> = Vec::new();
    for (_, path) in repositories(config, trigger) {
        let lock = match PublishLock::acquire(&path) {
            Ok(lock) => lock,
            // site and source may share one repository
            Err(PublishError::AlreadyRunning { lock })
                if locks.iter().any(|held| held.path() == lock) =>
            {
                continue
            }
            Err(e) => return Err(e),
        };
        locks.push(lock);
    }
    Ok(locks)
}

fn print_plan(config: &Config, trigger: Trigger, message: &str) {
    match trigger {
        Trigger::Publish { sync_source } => {
            let steps = plan::site_plan(config, message);
            ui::display_plan(
                "Dry run: site publish",
                &steps.iter().map(|s| s.describe()).collect::<Vec<_>>(),
            );
            if sync_source && config.also_sync_markdown {
                let steps = plan::source_plan(config, message);
                ui::display_plan(
                    "Dry run: source sync",
                    &steps.iter().map(|s| s.describe()).collect::<Vec<_>>(),
                );
            }
        }
        Trigger::SyncSource => {
            let steps = plan::source_plan(config, message);
            ui::display_plan(
                "Dry run: source sync",
                &steps.iter().map(|s| s.describe()).collect::<Vec<_>>(),
            );
        }
    }
}

/// Main publish workflow
///
/// 1. Validate configured paths and repositories
/// 2. Take the in-flight lock of every repository the run commits in
/// 3. Run the requested flows through a [`Publisher`]
///
/// Validation problems come back as `Ok(WorkflowResult::Ran(RunOutcome::InvalidConfig))`
/// after being displayed; `Err` is reserved for a refused lock or a git error
/// while taking it.
pub fn run_publish_workflow(
    args: &PublishWorkflowArgs,
    config: &Config,
    trigger: Trigger,
) -> Result<WorkflowResult> {
    let issues = all_issues(config, trigger);
    if !issues.is_empty() {
        ui::display_config_issues(&issues);
        return Ok(WorkflowResult::Ran(RunOutcome::InvalidConfig(issues)));
    }

    if args.dry_run {
        let message = args
            .message
            .clone()
            .unwrap_or_else(publish::default_message);
        print_plan(config, trigger, &message);
        return Ok(WorkflowResult::DryRun);
    }

    let _locks = acquire_locks(config, trigger)?;

    let terminal = TerminalUi;
    let mut runner = SystemRunner::new();
    if let Some(interval) = args.heartbeat {
        runner = runner.heartbeat(interval);
    }

    let fixed;
    let interactive;
    let prompt: &dyn MessagePrompt = if args.assume_yes || args.message.is_some() {
        fixed = FixedPrompt::new(args.message.clone());
        &fixed
    } else {
        interactive = TerminalPrompt::stdin();
        &interactive
    };

    let publisher = Publisher::new(config, &runner, prompt, &terminal, &terminal);
    Ok(WorkflowResult::Ran(publisher.run(trigger)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_repositories_for_publish_with_sync() {
        let config = Config {
            generator_project_path: "/garden".to_string(),
            markdown_source_path: "/notes".to_string(),
            also_sync_markdown: true,
            ..Config::default()
        };

        let repos = repositories(&config, Trigger::Publish { sync_source: true });
        assert_eq!(
            repos,
            vec![
                ("generator_project_path", PathBuf::from("/garden")),
                ("markdown_source_path", PathBuf::from("/notes")),
            ]
        );

        let repos = repositories(&config, Trigger::Publish { sync_source: false });
        assert_eq!(repos.len(), 1);
    }

    #[test]
    fn test_blank_site_repository_reports_generator_field() {
        let mut config = Config {
            generator_project_path: "/garden".to_string(),
            ..Config::default()
        };
        config.git.site_repository = Some("   ".to_string());

        let repos = repositories(&config, Trigger::Publish { sync_source: false });
        assert_eq!(
            repos,
            vec![("generator_project_path", PathBuf::from("/garden"))]
        );

        config.git.site_repository = Some("/site".to_string());
        let repos = repositories(&config, Trigger::Publish { sync_source: false });
        assert_eq!(repos, vec![("git.site_repository", PathBuf::from("/site"))]);
    }

    #[test]
    fn test_repository_issues_flag_plain_dirs() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            markdown_source_path: dir.path().to_string_lossy().into_owned(),
            ..Config::default()
        };

        let issues = repository_issues(&config, Trigger::SyncSource);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "markdown_source_path");
        assert!(matches!(issues[0].problem, IssueKind::NotARepository(_)));
    }

    #[test]
    #[serial_test::serial]
    fn test_shared_repository_locked_once() {
        let dir = TempDir::new().unwrap();
        git2::Repository::init(dir.path()).unwrap();
        let path = dir.path().to_string_lossy().into_owned();
        let config = Config {
            generator_project_path: path.clone(),
            markdown_source_path: path.clone(),
            html_output_path: path,
            also_sync_markdown: true,
            ..Config::default()
        };

        let locks = acquire_locks(&config, Trigger::Publish { sync_source: true }).unwrap();
        assert_eq!(locks.len(), 1);
    }

    #[test]
    fn test_dry_run_runs_nothing() {
        let dir = TempDir::new().unwrap();
        git2::Repository::init(dir.path()).unwrap();
        let path = dir.path().to_string_lossy().into_owned();
        let config = Config {
            generator_project_path: path.clone(),
            markdown_source_path: path.clone(),
            html_output_path: path,
            ..Config::default()
        };
        let args = PublishWorkflowArgs {
            dry_run: true,
            ..PublishWorkflowArgs::default()
        };

        let result =
            run_publish_workflow(&args, &config, Trigger::Publish { sync_source: true }).unwrap();
        assert!(matches!(result, WorkflowResult::DryRun));
        assert!(!dir.path().join("vercel.json").exists());
    }
}
