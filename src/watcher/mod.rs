//! File watching for live reload.
//!
//! Uses notify's `PollWatcher` to compare modification times on an interval.
//! The notify thread only forwards events into a channel; the event loop
//! drains it with [`FileWatcher::poll`] and performs any reload itself.
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use notify::{Event, EventKind, PollWatcher, RecursiveMode, Watcher};

/// Timing for [`FileWatcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchSettings {
    /// How often modification times are compared
    pub poll_interval: Duration,
    /// Quiet period after the last change before reporting it
    pub debounce: Duration,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            debounce: Duration::from_millis(200),
        }
    }
}

/// Outcome of draining the watcher channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchPoll {
    /// Nothing ready
    Idle,
    /// The file changed and the debounce window has passed
    Changed,
    /// The watcher hit an error and has stopped itself
    Failed(String),
}

/// Watches a single file and emits debounced change notifications.
pub struct FileWatcher {
    watcher: Option<PollWatcher>,
    rx: Receiver<notify::Result<Event>>,
    watch_root: PathBuf,
    target_path: PathBuf,
    target_name: Option<OsString>,
    debounce: Duration,
    pending_since: Option<Instant>,
}

impl std::fmt::Debug for FileWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWatcher")
            .field("target_path", &self.target_path)
            .field("watch_root", &self.watch_root)
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}

impl FileWatcher {
    /// Start polling `path`.
    ///
    /// The parent directory is watched so that editors which save by
    /// renaming a temp file over the original are still noticed.
    ///
    /// # Errors
    /// Returns an error if the poller cannot be created or the path cannot be watched.
    pub fn new(path: impl AsRef<Path>, settings: WatchSettings) -> notify::Result<Self> {
        let target_path = path
            .as_ref()
            .canonicalize()
            .unwrap_or_else(|_| path.as_ref().to_path_buf());
        let target_name = target_path.file_name().map(std::ffi::OsStr::to_os_string);
        let watch_root = watch_root_for(&target_path);

        let (tx, rx) = mpsc::channel();
        let config = notify::Config::default().with_poll_interval(settings.poll_interval);
        let mut watcher = PollWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            config,
        )?;
        watcher.watch(&watch_root, RecursiveMode::NonRecursive)?;
        tracing::debug!(path = %target_path.display(), interval = ?settings.poll_interval, "watching");

        Ok(Self {
            watcher: Some(watcher),
            rx,
            watch_root,
            target_path,
            target_name,
            debounce: settings.debounce,
            pending_since: None,
        })
    }

    /// The canonical path of the file being watched.
    pub fn target_path(&self) -> &Path {
        &self.target_path
    }

    pub const fn is_active(&self) -> bool {
        self.watcher.is_some()
    }

    /// Stop polling. Safe to call repeatedly; never waits on the poll thread.
    pub fn stop(&mut self) {
        if self.watcher.take().is_some() {
            tracing::debug!(path = %self.target_path.display(), "watch stopped");
        }
        self.pending_since = None;
    }

    /// Drain pending events and report whether a reload is due.
    pub fn poll(&mut self) -> WatchPoll {
        if !self.is_active() {
            return WatchPoll::Idle;
        }

        let mut saw_relevant_event = false;
        while let Ok(event) = self.rx.try_recv() {
            match event {
                Ok(ev) if self.is_relevant(&ev) => saw_relevant_event = true,
                Ok(ev) => {
                    tracing::trace!(kind = ?ev.kind, paths = ?ev.paths, "ignored watch event");
                }
                Err(err) => {
                    tracing::warn!(path = %self.target_path.display(), %err, "file watcher failed");
                    self.stop();
                    return WatchPoll::Failed(err.to_string());
                }
            }
        }

        if saw_relevant_event {
            self.pending_since = Some(Instant::now());
        }

        let Some(pending_since) = self.pending_since else {
            return WatchPoll::Idle;
        };
        if pending_since.elapsed() >= self.debounce {
            self.pending_since = None;
            return WatchPoll::Changed;
        }
        WatchPoll::Idle
    }

    fn is_relevant(&self, event: &Event) -> bool {
        if matches!(event.kind, EventKind::Access(_)) {
            return false;
        }
        event.paths.iter().any(|path| {
            path == &self.target_path
                || self
                    .target_name
                    .as_ref()
                    .is_some_and(|name| path.file_name().is_some_and(|f| f == name))
        })
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn watch_root_for(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn fast() -> WatchSettings {
        WatchSettings {
            poll_interval: Duration::from_millis(100),
            debounce: Duration::from_millis(50),
        }
    }

    fn wait_for_change(watcher: &mut FileWatcher, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if watcher.poll() == WatchPoll::Changed {
                return true;
            }
            std::thread::sleep(Duration::from_millis(50));
        }
        false
    }

    #[test]
    fn test_event_for_sibling_file_is_ignored() {
        let dir = tempdir().expect("tempdir");
        let canonical_dir = dir.path().canonicalize().expect("canonicalize");
        let path = canonical_dir.join("doc.md");
        std::fs::write(&path, "hi").expect("write");
        let watcher = FileWatcher::new(&path, fast()).expect("watcher");

        let sibling = Event::new(EventKind::Any).add_path(canonical_dir.join("other.md"));
        assert!(!watcher.is_relevant(&sibling));

        let own = Event::new(EventKind::Any).add_path(path);
        assert!(watcher.is_relevant(&own));
    }

    #[test]
    fn test_watch_root_for_relative_file_is_dot() {
        let root = watch_root_for(Path::new("TEST-README.md"));
        assert_eq!(root, PathBuf::from("."));
    }

    #[test]
    fn test_real_file_modification_detected() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("watched.md");
        std::fs::write(&path, "original").expect("write");

        let mut watcher = FileWatcher::new(&path, fast()).expect("watcher");

        // Let the first scan record the original mtime, and step past
        // coarse mtime resolution on some filesystems.
        std::thread::sleep(Duration::from_millis(1100));
        std::fs::write(&path, "modified by another process").expect("write");

        assert!(
            wait_for_change(&mut watcher, Duration::from_secs(5)),
            "watcher should detect real file modification within 5 seconds"
        );
    }

    #[test]
    fn test_no_change_stays_idle() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("quiet.md");
        std::fs::write(&path, "still").expect("write");
        let mut watcher = FileWatcher::new(&path, fast()).expect("watcher");

        std::thread::sleep(Duration::from_millis(300));
        assert_eq!(watcher.poll(), WatchPoll::Idle);
    }

    #[test]
    fn test_stop_is_idempotent_and_silences_poll() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("stop.md");
        std::fs::write(&path, "x").expect("write");
        let mut watcher = FileWatcher::new(&path, fast()).expect("watcher");

        watcher.stop();
        watcher.stop();
        assert!(!watcher.is_active());

        std::fs::write(&path, "changed").expect("write");
        std::thread::sleep(Duration::from_millis(300));
        assert_eq!(watcher.poll(), WatchPoll::Idle);
    }

    #[test]
    fn test_watch_error_stops_watcher() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("err.md");
        std::fs::write(&path, "x").expect("write");
        let mut watcher = FileWatcher::new(&path, fast()).expect("watcher");

        let (tx, rx) = mpsc::channel();
        watcher.rx = rx;
        tx.send(Err(notify::Error::generic("boom"))).expect("send");

        match watcher.poll() {
            WatchPoll::Failed(msg) => assert!(msg.contains("boom")),
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(!watcher.is_active());
        assert_eq!(watcher.poll(), WatchPoll::Idle);
    }

    #[test]
    fn test_change_waits_for_debounce() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("debounce.md");
        std::fs::write(&path, "x").expect("write");
        let mut watcher = FileWatcher::new(
            &path,
            WatchSettings {
                poll_interval: Duration::from_secs(60),
                debounce: Duration::from_millis(150),
            },
        )
        .expect("watcher");

        let (tx, rx) = mpsc::channel();
        watcher.rx = rx;
        let target = watcher.target_path().to_path_buf();
        tx.send(Ok(Event::new(EventKind::Any).add_path(target)))
            .expect("send");

        assert_eq!(watcher.poll(), WatchPoll::Idle, "inside debounce window");
        std::thread::sleep(Duration::from_millis(200));
        assert_eq!(watcher.poll(), WatchPoll::Changed);
        assert_eq!(watcher.poll(), WatchPoll::Idle, "change is reported once");
    }
}
