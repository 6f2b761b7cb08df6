use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use git2::Repository;

use crate::error::{PublishError, Result};

const LOCK_FILE: &str = "note-publish.lock";

/// Lock files held by this process, for cleanup when it is interrupted.
static HELD: Mutex<Vec<PathBuf>> = Mutex::new(Vec::new());

/// Marks a repository as having a publish in flight.
///
/// The lock is a file inside the repository's git dir, so it is never staged
/// by `git add .`. It is created atomically and removed when the guard drops,
/// or by [`release_held`] when the process is interrupted. A lock whose
/// recorded pid is no longer running is stale and gets replaced.
#[derive(Debug)]
pub struct PublishLock {
    path: PathBuf,
}

impl PublishLock {
    pub fn acquire(repo_path: &Path) -> Result<Self> {
        let repo = Repository::discover(repo_path)?;
        let path = repo.path().join(LOCK_FILE);

        let mut file = match create_lock_file(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                if !is_stale(&path) {
                    return Err(PublishError::AlreadyRunning { lock: path });
                }
                fs::remove_file(&path)?;
                match create_lock_file(&path) {
                    Ok(file) => file,
                    // another run took it between the removal and the create
                    Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                        return Err(PublishError::AlreadyRunning { lock: path });
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            Err(e) => return Err(e.into()),
        };

        writeln!(file, "{}", std::process::id())?;
        if let Ok(mut held) = HELD.lock() {
            held.push(path.clone());
        }
        Ok(PublishLock { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PublishLock {
    fn drop(&mut self) {
        if let Ok(mut held) = HELD.lock() {
            held.retain(|p| p != &self.path);
        }
        let _ = fs::remove_file(&self.path);
    }
}

/// Removes every lock file this process still holds.
///
/// Called from the interrupt handler, where guards never get to drop.
pub fn release_held() {
    if let Ok(mut held) = HELD.lock() {
        for path in held.drain(..) {
            let _ = fs::remove_file(path);
        }
    }
}

fn create_lock_file(path: &Path) -> std::io::Result<fs::File> {
    OpenOptions::new().write(true).create_new(true).open(path)
}

/// True when the lock names a pid that is no longer running.
///
/// An unreadable or empty file is left alone; it may be mid-write.
fn is_stale(path: &Path) -> bool {
    match fs::read_to_string(path) {
        Ok(content) => match content.trim().parse::<u32>() {
            Ok(pid) => !process_alive(pid),
            Err(_) => false,
        },
        Err(_) => false,
    }
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    let Ok(pid) = libc::pid_t::try_from(pid) else {
        return false;
    };
    // signal 0 only checks that the process exists
    if unsafe { libc::kill(pid, 0) } == 0 {
        return true;
    }
    std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

#[cfg(not(unix))]
fn process_alive(_pid: u32) -> bool {
    true
}
