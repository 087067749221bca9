//! Redirect file watcher for hot reload.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::lifecycle::reload::ReloadFlag;

/// Requests a reload whenever one of the redirect files is written or replaced.
pub struct RedirectFileWatcher {
    files: Vec<PathBuf>,
    reload: Arc<ReloadFlag>,
}

impl RedirectFileWatcher {
    pub fn new(files: &[PathBuf], reload: Arc<ReloadFlag>) -> Self {
        Self {
            files: files.iter().map(|f| canonical(f)).collect(),
            reload,
        }
    }

    /// Start watching in a background thread. Dropping the returned watcher stops it.
    ///
    /// Parent directories are watched so editors that replace a file by
    /// rename are still seen.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let wanted: HashSet<PathBuf> = self.files.iter().cloned().collect();
        let reload = Arc::clone(&self.reload);

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if !(event.kind.is_modify() || event.kind.is_create()) {
                        return;
                    }
                    if let Some(path) = event.paths.iter().find(|p| wanted.contains(*p)) {
                        tracing::info!(file = %path.display(), "Redirect file changed, requesting reload");
                        reload.request();
                    }
                }
                Err(e) => tracing::error!(error = %e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        let dirs: HashSet<&Path> = self.files.iter().filter_map(|f| f.parent()).collect();
        for dir in dirs {
            watcher.watch(dir, RecursiveMode::NonRecursive)?;
        }

        tracing::info!(files = ?self.files, "Redirect file watcher started");
        Ok(watcher)
    }
}

fn canonical(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_change_requests_reload() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("redirects.csv");
        std::fs::write(&file, "/a\thttp://a\tu\t2019-01-01\n").unwrap();

        let reload = Arc::new(ReloadFlag::new());
        let _watcher = RedirectFileWatcher::new(&[file.clone()], Arc::clone(&reload))
            .run()
            .unwrap();

        // unrelated file in the same directory is ignored
        std::fs::write(dir.path().join("other.txt"), "x").unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!reload.is_requested());

        std::fs::write(&file, "/b\thttp://b\tu\t2019-01-01\n").unwrap();
        tokio::time::timeout(Duration::from_secs(5), reload.notified())
            .await
            .unwrap();
        assert!(reload.take());
    }
}
