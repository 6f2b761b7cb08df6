//! Publish orchestration.
//!
//! A [`Publisher`] runs one of two fixed, strictly sequential flows:
//!
//! - **site**: build → deployment descriptor → commit message → `git add .`
//!   → `git commit` → `git pull` → `git push`, in the site repository
//! - **source**: commit message → `git add .` → `git commit` → `git push`,
//!   in the markdown source directory
//!
//! Every step waits for the previous one. The first failure stops the flow
//! where it is: nothing is rolled back or retried. [`Publisher::run`] is the
//! error boundary; it turns every failure into a notice plus a terminal
//! status and reports the result as a [`RunOutcome`].

use std::cell::Cell;
use std::path::Path;

use crate::config::Config;
use crate::error::{ConfigIssue, PublishError, Result};
use crate::git::{self, CommitInfo};
use crate::runner::{CommandRunner, Invocation};
use crate::ui::{MessagePrompt, Notifier, StatusIndicator};

pub mod deploy;
pub mod message;
pub mod mock;
pub mod plan;
pub mod state;

pub use message::{default_message, resolve_message};
pub use state::{PublishState, Step};

/// Which flow a result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Site,
    Source,
}

impl Flow {
    pub fn name(&self) -> &'static str {
        match self {
            Flow::Site => "site publish",
            Flow::Source => "source sync",
        }
    }
}

/// A flow that reached `Done`.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowReport {
    pub flow: Flow,
    pub message: String,
    /// HEAD after the push, when the repository could be inspected.
    pub head: Option<CommitInfo>,
}

#[derive(Debug)]
pub enum FlowOutcome {
    Completed(FlowReport),
    Cancelled { flow: Flow },
    Failed {
        flow: Flow,
        state: PublishState,
        error: PublishError,
    },
}

/// What a trigger produced.
#[derive(Debug)]
pub enum RunOutcome {
    /// Validation failed; nothing ran.
    InvalidConfig(Vec<ConfigIssue>),
    /// One entry per flow that was started, in order.
    Finished(Vec<FlowOutcome>),
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        match self {
            RunOutcome::InvalidConfig(_) => false,
            RunOutcome::Finished(flows) => flows
                .iter()
                .all(|flow| matches!(flow, FlowOutcome::Completed(_))),
        }
    }

    /// 0 on success, 130 if the user cancelled, 1 for any failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::InvalidConfig(_) => 1,
            RunOutcome::Finished(flows) => {
                if flows
                    .iter()
                    .any(|flow| matches!(flow, FlowOutcome::Failed { .. }))
                {
                    1
                } else if flows
                    .iter()
                    .any(|flow| matches!(flow, FlowOutcome::Cancelled { .. }))
                {
                    130
                } else {
                    0
                }
            }
        }
    }
}

/// What the trigger asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Publish the site; then sync the source if the config says so and
    /// `sync_source` is true.
    Publish { sync_source: bool },
    /// Only sync the markdown source.
    SyncSource,
}

/// Sequences the publish steps over injected collaborators.
pub struct Publisher<'a> {
    config: &'a Config,
    runner: &'a dyn CommandRunner,
    prompt: &'a dyn MessagePrompt,
    notifier: &'a dyn Notifier,
    status: &'a dyn StatusIndicator,
    default_message: fn() -> String,
    state: Cell<PublishState>,
}

impl<'a> Publisher<'a> {
    pub fn new(
        config: &'a Config,
        runner: &'a dyn CommandRunner,
        prompt: &'a dyn MessagePrompt,
        notifier: &'a dyn Notifier,
        status: &'a dyn StatusIndicator,
    ) -> Self {
        Publisher {
            config,
            runner,
            prompt,
            notifier,
            status,
            default_message,
            state: Cell::new(PublishState::Idle),
        }
    }

    /// Replace the `Updated at <time>` generator.
    pub fn with_default_message(mut self, source: fn() -> String) -> Self {
        self.default_message = source;
        self
    }

    pub fn state(&self) -> PublishState {
        self.state.get()
    }

    fn enter(&self, state: PublishState) {
        self.state.set(state);
        self.status.set_status(state);
    }

    fn exec(&self, invocation: Invocation, cwd: &Path) -> Result<String> {
        self.runner.run(&invocation, cwd)
    }

    /// Validates, runs the requested flows, and reports every failure.
    ///
    /// Never returns an error: all failures end up in the outcome, a notice,
    /// and the final status.
    pub fn run(&self, trigger: Trigger) -> RunOutcome {
        self.state.set(PublishState::Idle);

        let issues = self.config.validate();
        if !issues.is_empty() {
            for issue in &issues {
                self.notifier.notify(&issue.to_string());
            }
            self.enter(PublishState::Failed {
                step: Step::Validate,
            });
            return RunOutcome::InvalidConfig(issues);
        }

        let mut outcomes = Vec::new();
        match trigger {
            Trigger::Publish { sync_source } => {
                let site = self.guarded(Flow::Site, || self.publish_site());
                let site_ok = matches!(site, FlowOutcome::Completed(_));
                outcomes.push(site);

                if site_ok && sync_source && self.config.also_sync_markdown {
                    outcomes.push(self.guarded(Flow::Source, || self.sync_source()));
                }
            }
            Trigger::SyncSource => {
                outcomes.push(self.guarded(Flow::Source, || self.sync_source()));
            }
        }

        RunOutcome::Finished(outcomes)
    }

    fn guarded(&self, flow: Flow, body: impl FnOnce() -> Result<FlowReport>) -> FlowOutcome {
        self.notifier.notify(&format!("Starting {}", flow.name()));

        match body() {
            Ok(report) => {
                self.notifier
                    .notify(&format!("{} complete: {}", flow.name(), report.message));
                FlowOutcome::Completed(report)
            }
            Err(PublishError::Cancelled) => {
                self.enter(PublishState::Cancelled);
                self.notifier
                    .notify(&format!("{} cancelled before commit", flow.name()));
                FlowOutcome::Cancelled { flow }
            }
            Err(error) => {
                let state = PublishState::Failed {
                    step: self.state().step(),
                };
                self.enter(state);
                self.notifier
                    .notify(&format!("{} failed: {}", flow.name(), error));
                FlowOutcome::Failed { flow, state, error }
            }
        }
    }

    /// Builds the site and publishes it. Stops at the first failing step.
    pub fn publish_site(&self) -> Result<FlowReport> {
        let config = self.config;
        let repo = config.site_repository_dir();

        self.enter(PublishState::Building);
        self.exec(plan::build_invocation(config), &config.generator_project_dir())?;
        deploy::write_descriptor(&config.html_output_dir(), &config.deploy)?;

        let message = self.ask_message()?;

        self.enter(PublishState::Committing);
        self.exec(git::add_all(), &repo)?;
        self.exec(git::commit(&message), &repo)?;

        self.enter(PublishState::Pulling);
        self.exec(git::pull(), &repo)?;

        self.enter(PublishState::Pushing);
        self.exec(git::push(&config.git.remote, &config.git.branch), &repo)?;

        self.enter(PublishState::Done);
        Ok(self.report(Flow::Site, message, &repo))
    }

    /// Commits and pushes the markdown source directory. No build, no pull.
    pub fn sync_source(&self) -> Result<FlowReport> {
        let config = self.config;
        let repo = config.markdown_source_dir();

        let message = self.ask_message()?;

        self.enter(PublishState::Committing);
        self.exec(git::add_all(), &repo)?;
        self.exec(git::commit(&message), &repo)?;

        self.enter(PublishState::Pushing);
        self.exec(git::push(&config.git.remote, &config.git.branch), &repo)?;

        self.enter(PublishState::Done);
        Ok(self.report(Flow::Source, message, &repo))
    }

    /// Prompts with a fresh default; blank means default, cancel aborts.
    fn ask_message(&self) -> Result<String> {
        self.enter(PublishState::AwaitingMessage);
        let default = (self.default_message)();
        let outcome = self.prompt.prompt(&default)?;
        resolve_message(outcome, &default).ok_or(PublishError::Cancelled)
    }

    fn report(&self, flow: Flow, message: String, repo: &Path) -> FlowReport {
        FlowReport {
            flow,
            message,
            head: git::head_commit(repo).ok().flatten(),
        }
    }
}
