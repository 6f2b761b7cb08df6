//! Periodic "still running" ticker for long subprocesses.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Background ticker that calls `tick` with the elapsed time every `interval`.
///
/// The thread stops when the `Heartbeat` is dropped; drop blocks until it has
/// exited, so no tick fires after the guard is gone.
pub struct Heartbeat {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Heartbeat {
    pub fn start<F>(interval: Duration, tick: F) -> Self
    where
        F: Fn(Duration) + Send + 'static,
    {
        let (stop, rx) = mpsc::channel::<()>();
        let started = Instant::now();

        let handle = thread::spawn(move || loop {
            match rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => tick(started.elapsed()),
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });

        Heartbeat {
            stop: Some(stop),
            handle: Some(handle),
        }
    }

    /// Stops the ticker and waits for its thread.
    pub fn cancel(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Heartbeat {
    fn drop(&mut self) {
        self.shutdown();
    }
}
