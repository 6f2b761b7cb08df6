//! Subprocess execution.
//!
//! Everything the publish flow runs goes through [`CommandRunner`], so the
//! orchestrator can be driven by a recording fake in tests while
//! [`SystemRunner`] spawns real processes.

use std::io;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

use crate::error::{PublishError, Result};
use crate::ui::{self, Heartbeat, Notifier};

pub mod invocation;

pub use invocation::{quote_arg, quote_path, Invocation};

/// Runs one command in a working directory and returns its trimmed stdout.
pub trait CommandRunner {
    fn run(&self, invocation: &Invocation, cwd: &Path) -> Result<String>;
}

/// Spawns real processes. Holds no state between calls.
#[derive(Default)]
pub struct SystemRunner<'a> {
    failure_notifier: Option<&'a dyn Notifier>,
    heartbeat: Option<Duration>,
}

impl<'a> SystemRunner<'a> {
    pub fn new() -> Self {
        SystemRunner::default()
    }

    /// Also send every failure to `notifier` before returning it.
    pub fn notify_failures(mut self, notifier: &'a dyn Notifier) -> Self {
        self.failure_notifier = Some(notifier);
        self
    }

    /// Print an elapsed-time line every `interval` while a command runs.
    pub fn heartbeat(mut self, interval: Duration) -> Self {
        self.heartbeat = Some(interval);
        self
    }

    fn execute(&self, invocation: &Invocation, cwd: &Path) -> Result<String> {
        let display = invocation.to_string();
        ui::display_command(&display, cwd);

        if !cwd.is_dir() {
            return Err(PublishError::Spawn {
                command: display,
                source: io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("working directory {} does not exist", cwd.display()),
                ),
            });
        }

        let mut cmd = Command::new(invocation.program_name());
        cmd.args(invocation.arguments()).current_dir(cwd);
        for (key, value) in invocation.envs() {
            cmd.env(key, value);
        }

        let ticker = self.heartbeat.map(|interval| {
            let label = display.clone();
            Heartbeat::start(interval, move |elapsed| {
                ui::display_status(&format!(
                    "still running `{}` ({}s)",
                    label,
                    elapsed.as_secs()
                ))
            })
        });
        let output = cmd.output();
        drop(ticker);

        let output = output.map_err(|source| PublishError::Spawn {
            command: display.clone(),
            source,
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            // git reports "nothing to commit" and similar on stdout
            let diagnostics = if stderr.is_empty() {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            } else {
                stderr
            };
            return Err(PublishError::CommandExecution {
                command: display,
                code: output.status.code(),
                stderr: diagnostics,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl CommandRunner for SystemRunner<'_> {
    fn run(&self, invocation: &Invocation, cwd: &Path) -> Result<String> {
        self.execute(invocation, cwd).inspect_err(|err| {
            if let Some(notifier) = self.failure_notifier {
                notifier.notify(&format!("Command failed: {}", err));
            }
        })
    }
}

/// Runs `command` through `sh -c` in `cwd` and returns its trimmed stdout.
///
/// The command line is trusted: pipes, globs and `$VARS` are interpreted by
/// the shell and nothing is escaped.
pub fn run_shell(command: &str, cwd: &Path) -> Result<String> {
    SystemRunner::new().run(&Invocation::shell("sh", command), cwd)
}
