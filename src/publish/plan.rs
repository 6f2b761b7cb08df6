//! The fixed step lists of both flows, shared by the orchestrator and `--dry-run`.

use std::path::PathBuf;

use crate::config::{expand_path, Config};
use crate::git;
use crate::runner::{quote_path, Invocation};

/// What one step of a flow does.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Run(Invocation),
    WriteDescriptor(PathBuf),
    Prompt,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedStep {
    pub action: Action,
    pub cwd: PathBuf,
}

impl PlannedStep {
    fn run(invocation: Invocation, cwd: PathBuf) -> Self {
        PlannedStep {
            action: Action::Run(invocation),
            cwd,
        }
    }

    pub fn describe(&self) -> String {
        match &self.action {
            Action::Run(invocation) => {
                format!("{} (in {})", invocation, self.cwd.display())
            }
            Action::WriteDescriptor(path) => format!("write {}", path.display()),
            Action::Prompt => "ask for a commit message".to_string(),
        }
    }
}

/// The generator build, with `{source}`/`{output}` replaced by quoted paths.
pub fn build_invocation(config: &Config) -> Invocation {
    let generator = &config.generator;
    let script = generator
        .command
        .replace(
            "{source}",
            &quote_path(&config.markdown_source_dir().to_string_lossy()),
        )
        .replace(
            "{output}",
            &quote_path(&config.html_output_dir().to_string_lossy()),
        );

    let extra_path: Vec<PathBuf> = generator
        .path_prepend
        .iter()
        .map(|dir| expand_path(dir))
        .collect();

    Invocation::shell(&generator.shell, script).prepend_path(&extra_path)
}

/// Build, descriptor, prompt, add, commit, pull, push.
pub fn site_plan(config: &Config, message: &str) -> Vec<PlannedStep> {
    let repo = config.site_repository_dir();
    let mut steps = vec![PlannedStep::run(
        build_invocation(config),
        config.generator_project_dir(),
    )];

    if config.deploy.write_descriptor {
        let html = config.html_output_dir();
        steps.push(PlannedStep {
            action: Action::WriteDescriptor(html.join(&config.deploy.descriptor_file)),
            cwd: html,
        });
    }

    steps.push(PlannedStep {
        action: Action::Prompt,
        cwd: repo.clone(),
    });
    steps.extend([
        PlannedStep::run(git::add_all(), repo.clone()),
        PlannedStep::run(git::commit(message), repo.clone()),
        PlannedStep::run(git::pull(), repo.clone()),
        PlannedStep::run(git::push(&config.git.remote, &config.git.branch), repo),
    ]);
    steps
}

/// Prompt, add, commit, push in the markdown source directory.
pub fn source_plan(config: &Config, message: &str) -> Vec<PlannedStep> {
    let repo = config.markdown_source_dir();
    vec![
        PlannedStep {
            action: Action::Prompt,
            cwd: repo.clone(),
        },
        PlannedStep::run(git::add_all(), repo.clone()),
        PlannedStep::run(git::commit(message), repo.clone()),
        PlannedStep::run(git::push(&config.git.remote, &config.git.branch), repo),
    ]
}
