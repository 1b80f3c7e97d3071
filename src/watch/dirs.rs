//! Presence of processes started from watched directories.

use async_trait::async_trait;

use crate::error::ProbeError;
use crate::notify::escape_html;
use crate::probe::Procfs;

use super::Watch;

/// Counts processes per directory; alerts when a count drops to zero or
/// comes back from zero.
pub struct DirWatch {
    procfs: Procfs,
    dirs: Vec<String>,
}

impl DirWatch {
    /// Creates a watch over `dirs` (notification order is kept).
    pub fn new(procfs: Procfs, dirs: Vec<String>) -> Self {
        Self { procfs, dirs }
    }
}

#[async_trait]
impl Watch for DirWatch {
    type Value = usize;

    fn name(&self) -> &str {
        "dirs"
    }

    fn keys(&self) -> Vec<String> {
        self.dirs.clone()
    }

    async fn sample(&self, key: &str) -> Result<usize, ProbeError> {
        let procfs = self.procfs.clone();
        let dirs = vec![key.to_string()];
        scan(procfs, dirs)
            .await
            .map(|counts| counts.first().copied().unwrap_or(0))
    }

    /// One procfs scan serves every directory.
    async fn sample_all(&self) -> Vec<(String, Result<usize, ProbeError>)> {
        match scan(self.procfs.clone(), self.dirs.clone()).await {
            Ok(counts) => self.dirs.iter().cloned().zip(counts.into_iter().map(Ok)).collect(),
            Err(err) => {
                let reason = err.to_string();
                self.dirs
                    .iter()
                    .map(|d| (d.clone(), Err(ProbeError::missing(format!("process scan: {reason}")))))
                    .collect()
            }
        }
    }

    fn classify(&self, key: &str, prev: &usize, cur: &usize) -> Option<String> {
        let dir = escape_html(key);
        match (*prev, *cur) {
            (p, 0) if p > 0 => Some(format!(
                "⚠️ <b>No processes from directory</b>\n\n<code>{dir}</code>"
            )),
            (0, c) if c > 0 => Some(format!(
                "✅ <b>Processes are back</b>\n\n<code>{dir}</code>\nCount: {c}"
            )),
            _ => None,
        }
    }
}

async fn scan(procfs: Procfs, dirs: Vec<String>) -> Result<Vec<usize>, ProbeError> {
    tokio::task::spawn_blocking(move || procfs.count_by_dirs(&dirs))
        .await
        .map_err(|err| ProbeError::missing(format!("scan worker: {err}")))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::events::{Bus, EventKind};
    use crate::notify::{AuthorizedUsers, Broadcaster};
    use crate::testing::FakeNotifier;
    use crate::watch::{Baselines, Watcher};
    use tempfile::TempDir;

    /// Replaces the fake process table with `n` processes run from `/opt/app`.
    fn set_processes(root: &Path, n: usize) {
        for entry in std::fs::read_dir(root).unwrap() {
            std::fs::remove_dir_all(entry.unwrap().path()).unwrap();
        }
        for pid in 100..100 + n {
            let dir = root.join(pid.to_string());
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(dir.join("cmdline"), "/opt/app/bin/server\0--port\08080\0").unwrap();
        }
    }

    #[tokio::test]
    async fn watcher_reports_gone_then_recovered() {
        let proc_root = TempDir::new().unwrap();
        let notifier = Arc::new(FakeNotifier::new());
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let users = Arc::new(AuthorizedUsers::new([1]).unwrap());
        let broadcaster = Arc::new(Broadcaster::new(notifier.clone(), users, bus.clone()));
        let watch = DirWatch::new(Procfs::new(proc_root.path()), vec!["/opt/app".into()]);
        let mut watcher = Watcher::new(watch, Duration::from_secs(30), broadcaster, bus);

        let mut sent_after_tick = Vec::new();
        for count in [3, 3, 0, 0, 2] {
            set_processes(proc_root.path(), count);
            watcher.tick().await;
            sent_after_tick.push(notifier.sent().len());
        }

        assert_eq!(sent_after_tick, vec![0, 0, 1, 1, 2]);
        let texts: Vec<_> = notifier.sent().into_iter().map(|s| s.text).collect();
        assert!(texts[0].starts_with("⚠️"));
        assert!(texts[1].ends_with("Count: 2"));

        let transitions = std::iter::from_fn(|| rx.try_recv().ok())
            .filter(|e| e.kind == EventKind::WatchTransition)
            .count();
        assert_eq!(transitions, 2);
    }

    #[test]
    fn gone_and_recovered_edges_only() {
        let watch = DirWatch::new(Procfs::default(), vec!["/opt/app".into()]);
        let mut baselines = Baselines::new();
        let notices: Vec<String> = [3usize, 3, 0, 0, 2]
            .into_iter()
            .filter_map(|count| {
                baselines.observe("/opt/app", count, |p, c| watch.classify("/opt/app", p, c))
            })
            .collect();

        assert_eq!(notices.len(), 2);
        assert!(notices[0].starts_with("⚠️"));
        assert!(notices[1].starts_with("✅"));
        assert!(notices[1].ends_with("Count: 2"));
    }

    #[test]
    fn fluctuating_positive_counts_are_quiet() {
        let watch = DirWatch::new(Procfs::default(), Vec::new());
        assert!(watch.classify("/x", &3, &5).is_none());
        assert!(watch.classify("/x", &5, &1).is_none());
    }

    #[tokio::test]
    async fn one_scan_samples_every_dir_in_order() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("7")).unwrap();
        std::fs::write(dir.path().join("7/cmdline"), "/srv/b/run\0").unwrap();

        let watch = DirWatch::new(
            Procfs::new(dir.path()),
            vec!["/srv/b".into(), "/srv/a".into()],
        );
        let got: Vec<_> = watch
            .sample_all()
            .await
            .into_iter()
            .map(|(k, v)| (k, v.unwrap()))
            .collect();
        assert_eq!(got, vec![("/srv/b".to_string(), 1), ("/srv/a".to_string(), 0)]);
    }

    #[tokio::test]
    async fn scan_failure_fails_every_key() {
        let watch = DirWatch::new(
            Procfs::new("/definitely/not/here"),
            vec!["/a".into(), "/b".into()],
        );
        let got = watch.sample_all().await;
        assert_eq!(got.len(), 2);
        assert!(got.iter().all(|(_, res)| res.is_err()));
    }
}
