//! Debounced artifact-set change notifications.
//!
//! A build watcher calls [`ArtifactChangeNotifier::notify`] every time the
//! project's output changes. The notifier owns one tokio task that waits for
//! the burst to settle and then applies only the latest set through
//! [`ProjectRuntime::update_artifact_set`].

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::runtime::ProjectRuntime;
use crate::settings::WatchSettings;

struct Running {
    tx: mpsc::UnboundedSender<Vec<PathBuf>>,
    task: JoinHandle<()>,
}

pub struct ArtifactChangeNotifier {
    debounce: Duration,
    running: Mutex<Option<Running>>,
}

impl ArtifactChangeNotifier {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            running: Mutex::new(None),
        }
    }

    pub fn from_settings(settings: &WatchSettings) -> Self {
        Self::new(settings.debounce())
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Spawn the debounce task feeding `runtime`. Must be called from within
    /// a tokio runtime. Returns `false` if already started.
    pub fn start(&self, runtime: Arc<ProjectRuntime>) -> bool {
        let mut running = self.running.lock();
        if running.is_some() {
            return false;
        }
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(debounce_loop(rx, runtime, self.debounce));
        *running = Some(Running { tx, task });
        debug!(debounce_ms = self.debounce.as_millis() as u64, "artifact notifier started");
        true
    }

    /// Schedule `artifacts` as the next artifact set. Returns `false` when
    /// the notifier is not running.
    pub fn notify<I, P>(&self, artifacts: I) -> bool
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let running = self.running.lock();
        let Some(running) = running.as_ref() else {
            return false;
        };
        let artifacts = artifacts.into_iter().map(Into::into).collect();
        running.tx.send(artifacts).is_ok()
    }

    /// Stop the task. A pending, not yet applied set is discarded.
    pub fn stop(&self) {
        if let Some(running) = self.running.lock().take() {
            running.task.abort();
            debug!("artifact notifier stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .as_ref()
            .is_some_and(|running| !running.task.is_finished())
    }
}

impl Drop for ArtifactChangeNotifier {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn debounce_loop(
    mut rx: mpsc::UnboundedReceiver<Vec<PathBuf>>,
    runtime: Arc<ProjectRuntime>,
    debounce: Duration,
) {
    while let Some(mut latest) = rx.recv().await {
        let deadline = tokio::time::sleep(debounce);
        tokio::pin!(deadline);
        let mut coalesced = 0u64;

        loop {
            tokio::select! {
                _ = &mut deadline => break,
                next = rx.recv() => match next {
                    Some(artifacts) => {
                        latest = artifacts;
                        coalesced += 1;
                        deadline.as_mut().reset(Instant::now() + debounce);
                    }
                    None => break,
                },
            }
        }

        debug!(artifacts = latest.len(), coalesced, "applying artifact set");
        let target = runtime.clone();
        let update = tokio::task::spawn_blocking(move || target.update_artifact_set(latest));
        if let Err(e) = update.await {
            warn!(error = %e, "artifact set update did not complete");
        }
    }
}
