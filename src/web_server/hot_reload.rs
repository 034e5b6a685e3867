use super::server::SharedRewriter;
use crate::config::loader::load_config;
use anyhow::{Context, Result};
use notify::{RecommendedWatcher, RecursiveMode, Result as NotifyResult, Watcher};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Coalesces a burst of file events into one pending reload.
#[derive(Debug, Clone, Default)]
pub struct ReloadGate {
    pending: Arc<AtomicBool>,
}

impl ReloadGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// True for the first event of a burst; later events ride along.
    pub fn arm(&self) -> bool {
        !self.pending.swap(true, Ordering::AcqRel)
    }

    /// Close the burst; events from here on schedule a new reload.
    pub fn disarm(&self) {
        self.pending.store(false, Ordering::Release);
    }
}

/// Rebuilds the shared rewriter whenever the config file changes.
pub struct HotReloader {
    rewriter: SharedRewriter,
    _watcher: RecommendedWatcher,
}

impl std::fmt::Debug for HotReloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HotReloader")
            .field("rewriter", &"<rewriter>")
            .field("_watcher", &"<watcher>")
            .finish()
    }
}

impl HotReloader {
    /// Must be called from within a tokio runtime.
    pub fn new(config_path: &Path, rewriter: SharedRewriter) -> Result<Self> {
        let handle = tokio::runtime::Handle::current();
        let rewriter_clone = rewriter.clone();
        let path_clone = config_path.to_path_buf();
        let gate = ReloadGate::new();

        let watcher = notify::recommended_watcher(move |res: NotifyResult<notify::Event>| {
            if res.is_err() {
                return;
            }
            if !gate.arm() {
                debug!("Reload already pending, coalescing event");
                return;
            }
            let rewriter_ref = rewriter_clone.clone();
            let path_ref = path_clone.clone();
            let gate_ref = gate.clone();
            // notify calls back on its own thread
            handle.spawn(async move {
                reload_rewriter(rewriter_ref, path_ref, gate_ref).await;
            });
        })?;

        let mut watcher = watcher;
        watcher.watch(config_path, RecursiveMode::NonRecursive)?;
        info!("👀 Watching {} for changes", config_path.display());

        Ok(HotReloader {
            rewriter,
            _watcher: watcher,
        })
    }

    pub fn rewriter(&self) -> SharedRewriter {
        self.rewriter.clone()
    }
}

/// Load `path`, build a fresh rewriter and swap it in. The current
/// rewriter stays when loading or compiling fails.
pub async fn reload_now(rewriter: &SharedRewriter, path: &Path) -> Result<()> {
    let config = load_config(path)?;
    let fresh = config
        .build_rewriter()
        .with_context(|| format!("Failed to build rewriter from {}", path.display()))?;

    let mut guard = rewriter.write().await;
    *guard = fresh;
    Ok(())
}

async fn reload_rewriter(rewriter: SharedRewriter, path: PathBuf, gate: ReloadGate) {
    // Debouncing - wait for file operations to complete
    tokio::time::sleep(tokio::time::Duration::from_millis(500)).await;
    gate.disarm();

    match reload_now(&rewriter, &path).await {
        Ok(()) => {
            info!("✅ Rewrite rules reloaded from {}", path.display());
        }
        Err(e) => {
            error!("❌ Failed to reload config: {:#}", e);
            error!("   Keeping existing rewrite rules active");
        }
    }
}
