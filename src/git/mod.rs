//! Git access.
//!
//! Steps that change the repository or talk to a remote (`add`, `commit`,
//! `pull`, `push`) run the `git` CLI through a [`CommandRunner`](crate::runner::CommandRunner),
//! so they use the user's own credential helpers and hooks exactly as a
//! manual `git push` would. Read-only inspection and the in-flight lock use
//! `git2` directly.

pub mod inspect;
pub mod lock;

pub use inspect::{head_commit, is_work_tree, CommitInfo};
pub use lock::PublishLock;

use crate::runner::Invocation;

/// `git add .` (stages the whole tree, including deletions).
pub fn add_all() -> Invocation {
    Invocation::program("git").args(["add", "."])
}

/// `git commit -m <message>`; the message is passed as one argument, unescaped.
pub fn commit(message: &str) -> Invocation {
    Invocation::program("git").args(["commit", "-m", message])
}

/// `git pull` using the branch's configured upstream.
pub fn pull() -> Invocation {
    Invocation::program("git").arg("pull")
}

/// `git push <remote> <branch>`
pub fn push(remote: &str, branch: &str) -> Invocation {
    Invocation::program("git").args(["push", remote, branch])
}
