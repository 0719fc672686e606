//! Background asset loading tied to a surface's lifetime
//!
//! A request runs on its own thread and reports back over a channel. Every
//! request carries a [`CancelToken`] from the owning surface's [`Lifetime`];
//! once the lifetime ends, late results are dropped instead of applied.

use crate::error::{GlobeError, Result};
use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use tracing::{debug, warn};

/// Maximum size for a downloaded asset (32MB)
const MAX_ASSET_SIZE: u64 = 32 * 1024 * 1024;

/// Marks how long a surface is alive. Ends on drop.
pub struct Lifetime {
    alive: Arc<AtomicBool>,
}

/// Cheap handle checked before a loaded result is used.
#[derive(Clone)]
pub struct CancelToken {
    alive: Arc<AtomicBool>,
}

impl Lifetime {
    pub fn new() -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn token(&self) -> CancelToken {
        CancelToken {
            alive: self.alive.clone(),
        }
    }

    pub fn end(&self) {
        self.alive.store(false, Ordering::Release);
    }
}

impl Drop for Lifetime {
    fn drop(&mut self) {
        self.end();
    }
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        !self.alive.load(Ordering::Acquire)
    }

    /// `Err(Cancelled)` once the owning lifetime has ended.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(GlobeError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Outcome of polling a pending load.
pub enum LoadState<T> {
    Waiting,
    Ready(T),
    Failed(GlobeError),
    /// The surface went away first; the result, if any, was dropped.
    Discarded,
}

/// An in-flight load. Poll once per frame.
pub struct Pending<T> {
    label: String,
    token: CancelToken,
    receiver: Receiver<Result<T>>,
    finished: bool,
}

/// Run `job` on a worker thread; its result is delivered through the returned handle.
pub fn spawn_load<T, F>(label: &str, token: CancelToken, job: F) -> Pending<T>
where
    T: Send + 'static,
    F: FnOnce(&CancelToken) -> Result<T> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let worker_token = token.clone();
    let worker_label = label.to_string();

    thread::spawn(move || {
        if worker_token.is_cancelled() {
            return;
        }
        let result = job(&worker_token);
        if worker_token.is_cancelled() {
            debug!(asset = %worker_label, "load finished after teardown, dropping result");
            return;
        }
        let _ = tx.send(result);
    });

    debug!(asset = %label, "load requested");
    Pending {
        label: label.to_string(),
        token,
        receiver: rx,
        finished: false,
    }
}

impl<T> Pending<T> {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn poll(&mut self) -> LoadState<T> {
        if self.finished {
            return LoadState::Discarded;
        }

        match self.receiver.try_recv() {
            Ok(result) => {
                self.finished = true;
                if self.token.is_cancelled() {
                    debug!(asset = %self.label, "discarding result for torn-down surface");
                    return LoadState::Discarded;
                }
                match result {
                    Ok(value) => LoadState::Ready(value),
                    Err(e) => LoadState::Failed(e),
                }
            }
            Err(TryRecvError::Empty) => {
                if self.token.is_cancelled() {
                    self.finished = true;
                    LoadState::Discarded
                } else {
                    LoadState::Waiting
                }
            }
            Err(TryRecvError::Disconnected) => {
                self.finished = true;
                if !self.token.is_cancelled() {
                    warn!(asset = %self.label, "loader exited without a result");
                }
                LoadState::Discarded
            }
        }
    }
}

/// Read an asset from `file://`, `http(s)://` or a plain path.
pub fn load_bytes(source: &str, token: &CancelToken) -> Result<Vec<u8>> {
    token.check()?;

    if let Some(path) = source.strip_prefix("file://") {
        let path = urlencoding::decode(path).map_err(|e| GlobeError::Fetch {
            url: source.to_string(),
            reason: e.to_string(),
        })?;
        Ok(std::fs::read(Path::new(path.as_ref()))?)
    } else if source.starts_with("http://") || source.starts_with("https://") {
        let fetch_err = |reason: String| GlobeError::Fetch {
            url: source.to_string(),
            reason,
        };

        let response = ureq::get(source).call().map_err(|e| fetch_err(e.to_string()))?;

        if let Some(len) = response
            .header("Content-Length")
            .and_then(|s| s.parse::<u64>().ok())
        {
            if len > MAX_ASSET_SIZE {
                return Err(fetch_err(format!("{len} bytes exceeds limit")));
            }
        }

        let mut bytes = Vec::new();
        response
            .into_reader()
            .take(MAX_ASSET_SIZE)
            .read_to_end(&mut bytes)?;

        token.check()?;
        Ok(bytes)
    } else {
        Ok(std::fs::read(Path::new(source))?)
    }
}
