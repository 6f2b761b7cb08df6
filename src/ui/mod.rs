//! User interface module - host collaborators, prompts and formatting.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - `heartbeat` - Elapsed-time ticker for long steps
//! - This module - The collaborator traits the publish flow talks to, and
//!   their terminal implementations

use std::cell::RefCell;
use std::io::{self, BufRead, Write};

use crate::error::Result;
use crate::publish::PublishState;

pub mod formatter;
pub mod heartbeat;

// Re-export formatter functions for convenience
pub use formatter::{
    display_command, display_config_issues, display_error, display_head_commit, display_plan,
    display_status, display_success, display_warning, is_verbose, set_verbose,
};
pub use heartbeat::Heartbeat;

/// User-visible notices.
pub trait Notifier {
    fn notify(&self, text: &str);
}

/// Short-lived status text updated on every state transition.
pub trait StatusIndicator {
    fn set_status(&self, state: PublishState);
}

/// What the commit-message prompt resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    /// Raw text the user submitted. May be empty.
    Submitted(String),
    Cancelled,
}

/// Asks the user for a commit message, pre-filled with `default_message`.
pub trait MessagePrompt {
    fn prompt(&self, default_message: &str) -> Result<PromptOutcome>;
}

/// Terminal host: notices and status lines go to stdout/stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalUi;

impl Notifier for TerminalUi {
    fn notify(&self, text: &str) {
        display_status(text);
    }
}

impl StatusIndicator for TerminalUi {
    fn set_status(&self, state: PublishState) {
        match state {
            PublishState::Idle => {}
            PublishState::Done => display_success(state.label()),
            PublishState::Failed { .. } => display_error(state.label()),
            PublishState::Cancelled => display_warning(state.label()),
            _ => display_status(state.label()),
        }
    }
}

/// Reads the commit message from a line-oriented input.
///
/// An empty line submits an empty message; end of input cancels.
pub struct TerminalPrompt<R, W> {
    input: RefCell<R>,
    output: RefCell<W>,
}

impl TerminalPrompt<io::StdinLock<'static>, io::Stdout> {
    pub fn stdin() -> Self {
        TerminalPrompt::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        TerminalPrompt {
            input: RefCell::new(input),
            output: RefCell::new(output),
        }
    }

    pub fn into_output(self) -> W {
        self.output.into_inner()
    }
}

impl<R: BufRead, W: Write> MessagePrompt for TerminalPrompt<R, W> {
    fn prompt(&self, default_message: &str) -> Result<PromptOutcome> {
        {
            let mut out = self.output.borrow_mut();
            write!(
                out,
                "\nCommit message (Enter to accept, Ctrl-D to cancel)\n[{}]: ",
                default_message
            )?;
            out.flush()?;
        }

        let mut line = String::new();
        let read = self.input.borrow_mut().read_line(&mut line)?;
        if read == 0 {
            return Ok(PromptOutcome::Cancelled);
        }

        Ok(PromptOutcome::Submitted(
            line.trim_end_matches(['\r', '\n']).to_string(),
        ))
    }
}

/// Non-interactive prompt: always submits the same text (empty = use default).
#[derive(Debug, Clone, Default)]
pub struct FixedPrompt {
    message: Option<String>,
}

impl FixedPrompt {
    pub fn new(message: Option<String>) -> Self {
        FixedPrompt { message }
    }
}

impl MessagePrompt for FixedPrompt {
    fn prompt(&self, _default_message: &str) -> Result<PromptOutcome> {
        Ok(PromptOutcome::Submitted(
            self.message.clone().unwrap_or_default(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_terminal_prompt_submits_line() {
        let prompt = TerminalPrompt::new(Cursor::new("fix typo in notes\n"), Vec::new());
        let outcome = prompt.prompt("Updated at now").unwrap();
        assert_eq!(
            outcome,
            PromptOutcome::Submitted("fix typo in notes".to_string())
        );

        let shown = String::from_utf8(prompt.into_output()).unwrap();
        assert!(shown.contains("[Updated at now]"));
    }

    #[test]
    fn test_terminal_prompt_empty_line_is_empty_submission() {
        let prompt = TerminalPrompt::new(Cursor::new("\r\n"), Vec::new());
        assert_eq!(
            prompt.prompt("default").unwrap(),
            PromptOutcome::Submitted(String::new())
        );
    }

    #[test]
    fn test_terminal_prompt_eof_cancels() {
        let prompt = TerminalPrompt::new(Cursor::new(""), Vec::new());
        assert_eq!(prompt.prompt("default").unwrap(), PromptOutcome::Cancelled);
    }

    #[test]
    fn test_fixed_prompt() {
        let prompt = FixedPrompt::new(Some("release notes".to_string()));
        assert_eq!(
            prompt.prompt("ignored").unwrap(),
            PromptOutcome::Submitted("release notes".to_string())
        );
        assert_eq!(
            FixedPrompt::default().prompt("ignored").unwrap(),
            PromptOutcome::Submitted(String::new())
        );
    }
}
