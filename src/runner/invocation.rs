use std::env;
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

/// One external command, described as an argument vector.
///
/// Git steps use [`Invocation::program`]: arguments reach the process
/// verbatim and nothing is escaped. [`Invocation::shell`] is reserved for the
/// site build, whose command line comes from the user's own config and may
/// rely on `PATH` lookup, pipes or `&&`. The script is passed to
/// `<shell> -c` as a single argument and is trusted as written; only the
/// substituted paths are quoted (see [`quote_path`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
    envs: Vec<(String, OsString)>,
    script: Option<String>,
}

impl Invocation {
    pub fn program(program: impl Into<String>) -> Self {
        Invocation {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
            script: None,
        }
    }

    pub fn shell(shell: impl Into<String>, script: impl Into<String>) -> Self {
        let script = script.into();
        Invocation {
            program: shell.into(),
            args: vec!["-c".to_string(), script.clone()],
            envs: Vec::new(),
            script: Some(script),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<OsString>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Prepend `dirs` to the inherited `PATH` for this command only.
    pub fn prepend_path(self, dirs: &[PathBuf]) -> Self {
        if dirs.is_empty() {
            return self;
        }

        let inherited = env::var_os("PATH").unwrap_or_default();
        let entries = dirs
            .iter()
            .cloned()
            .chain(env::split_paths(&inherited))
            .collect::<Vec<_>>();

        match env::join_paths(entries) {
            Ok(path) => self.env("PATH", path),
            // A dir containing the path separator cannot be joined; keep PATH untouched.
            Err(_) => self,
        }
    }

    pub fn program_name(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    pub fn envs(&self) -> &[(String, OsString)] {
        &self.envs
    }

    pub fn is_shell(&self) -> bool {
        self.script.is_some()
    }
}

impl fmt::Display for Invocation {
    /// Shell scripts render as the script; argv commands render quoted.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(script) = &self.script {
            return f.write_str(script);
        }

        f.write_str(&quote_arg(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote_arg(arg))?;
        }
        Ok(())
    }
}

/// Escape a value for use inside single quotes.
/// Replaces `'` with `'\''` (end quote, escaped quote, start quote).
fn escape_single_quote_content(value: &str) -> String {
    value.replace('\'', "'\\''")
}

/// Quote a single argument for display or shell use.
/// - Empty strings become `''`
/// - Strings with shell metacharacters are wrapped in single quotes
pub fn quote_arg(arg: &str) -> String {
    if arg.is_empty() {
        return "''".to_string();
    }

    const SHELL_META: &[char] = &[
        ' ', '\t', '\n', '\'', '"', '\\', '$', '`', '!', '*', '?', '[', ']', '(', ')', '{', '}',
        '<', '>', '|', '&', ';', '#', '~',
    ];

    if !arg.contains(SHELL_META) {
        return arg.to_string();
    }

    format!("'{}'", escape_single_quote_content(arg))
}

/// Quote a path for shell execution (always quotes).
pub fn quote_path(path: &str) -> String {
    format!("'{}'", escape_single_quote_content(path))
}
