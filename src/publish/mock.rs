//! In-memory collaborators for driving [`Publisher`](super::Publisher) in tests.
//!
//! All mocks append to one shared [`Journal`], so a test can assert the
//! exact interleaving of commands, prompts, notices and status changes.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::{PublishError, Result};
use crate::publish::PublishState;
use crate::runner::{CommandRunner, Invocation};
use crate::ui::{MessagePrompt, Notifier, PromptOutcome, StatusIndicator};

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Run { command: String, cwd: PathBuf },
    Prompt { default_message: String },
    Notify(String),
    Status(PublishState),
}

/// Shared, ordered record of everything the mocks saw.
#[derive(Debug, Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<Event>>>);

impl Journal {
    pub fn new() -> Self {
        Journal::default()
    }

    fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    /// Commands run so far, rendered as strings.
    pub fn commands(&self) -> Vec<String> {
        self.0
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Event::Run { command, .. } => Some(command.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn statuses(&self) -> Vec<PublishState> {
        self.0
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Event::Status(state) => Some(*state),
                _ => None,
            })
            .collect()
    }

    pub fn notices(&self) -> Vec<String> {
        self.0
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Event::Notify(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn prompts(&self) -> usize {
        self.0
            .borrow()
            .iter()
            .filter(|event| matches!(event, Event::Prompt { .. }))
            .count()
    }
}

/// Records every invocation and succeeds, unless told to fail a command.
pub struct MockRunner {
    journal: Journal,
    fail_prefixes: Vec<String>,
}

impl MockRunner {
    pub fn new(journal: &Journal) -> Self {
        MockRunner {
            journal: journal.clone(),
            fail_prefixes: Vec::new(),
        }
    }

    /// Fail (exit code 1) any command whose rendering starts with `prefix`.
    pub fn fail_on(mut self, prefix: impl Into<String>) -> Self {
        self.fail_prefixes.push(prefix.into());
        self
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, invocation: &Invocation, cwd: &Path) -> Result<String> {
        let command = invocation.to_string();
        self.journal.push(Event::Run {
            command: command.clone(),
            cwd: cwd.to_path_buf(),
        });

        if self.fail_prefixes.iter().any(|p| command.starts_with(p)) {
            return Err(PublishError::CommandExecution {
                command,
                code: Some(1),
                stderr: "mock failure".to_string(),
            });
        }
        Ok(String::new())
    }
}

/// Answers prompts from a queue; an exhausted queue cancels.
pub struct MockPrompt {
    journal: Journal,
    answers: RefCell<Vec<PromptOutcome>>,
    on_prompt: Option<Box<dyn Fn()>>,
}

impl MockPrompt {
    pub fn new(journal: &Journal, answers: Vec<PromptOutcome>) -> Self {
        let mut answers = answers;
        answers.reverse();
        MockPrompt {
            journal: journal.clone(),
            answers: RefCell::new(answers),
            on_prompt: None,
        }
    }

    /// Always submit `text`.
    pub fn submitting(journal: &Journal, text: &str) -> Self {
        MockPrompt::new(
            journal,
            vec![PromptOutcome::Submitted(text.to_string()); 8],
        )
    }

    /// Run `hook` whenever the prompt is shown (e.g. to inspect the filesystem).
    pub fn on_prompt(mut self, hook: impl Fn() + 'static) -> Self {
        self.on_prompt = Some(Box::new(hook));
        self
    }
}

impl MessagePrompt for MockPrompt {
    fn prompt(&self, default_message: &str) -> Result<PromptOutcome> {
        self.journal.push(Event::Prompt {
            default_message: default_message.to_string(),
        });
        if let Some(hook) = &self.on_prompt {
            hook();
        }
        Ok(self
            .answers
            .borrow_mut()
            .pop()
            .unwrap_or(PromptOutcome::Cancelled))
    }
}

/// Records notices and status changes.
pub struct MockUi {
    journal: Journal,
}

impl MockUi {
    pub fn new(journal: &Journal) -> Self {
        MockUi {
            journal: journal.clone(),
        }
    }
}

impl Notifier for MockUi {
    fn notify(&self, text: &str) {
        self.journal.push(Event::Notify(text.to_string()));
    }
}

impl StatusIndicator for MockUi {
    fn set_status(&self, state: PublishState) {
        self.journal.push(Event::Status(state));
    }
}
