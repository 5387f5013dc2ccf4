use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use membank_core::fileio::{FileStat, FileSystem, FsError, FsErrorCode, TokioFileSystem};
use membank_core::frontmatter::YamlFrontmatterParser;
use membank_core::index::{IndexError, IndexEvent, IndexSettings, IndexStore};
use tempfile::TempDir;

/// Real filesystem with slow reads and optionally failing writes.
struct FlakyFs {
    inner: TokioFileSystem,
    read_delay: Duration,
    fail_writes: bool,
}

#[async_trait]
impl FileSystem for FlakyFs {
    async fn stat(&self, path: &Path) -> Result<FileStat, FsError> {
        self.inner.stat(path).await
    }

    async fn read_file(&self, path: &Path) -> Result<String, FsError> {
        tokio::time::sleep(self.read_delay).await;
        self.inner.read_file(path).await
    }

    async fn write_file(&self, path: &Path, content: &str) -> Result<(), FsError> {
        if self.fail_writes {
            return Err(FsError::new(FsErrorCode::PermissionDenied, "read-only bank"));
        }
        self.inner.write_file(path, content).await
    }

    async fn mkdir(&self, path: &Path, recursive: bool) -> Result<(), FsError> {
        self.inner.mkdir(path, recursive).await
    }
}

fn bank() -> TempDir {
    let tmp = TempDir::new().unwrap();
    for name in ["a.md", "b.md", "c.md"] {
        std::fs::write(tmp.path().join(name), format!("# {name}\n")).unwrap();
    }
    tmp
}

fn store(root: &Path, read_delay: Duration, fail_writes: bool) -> IndexStore {
    let fs = FlakyFs { inner: TokioFileSystem::default(), read_delay, fail_writes };
    IndexStore::new(IndexSettings::new(root), Arc::new(fs), Arc::new(YamlFrontmatterParser))
}

#[tokio::test]
async fn concurrent_builds_are_rejected() {
    let bank = bank();
    let store = store(bank.path(), Duration::from_millis(30), false);

    let (first, second) = tokio::join!(store.build_index(), store.build_index());

    assert_eq!(first.unwrap().files_indexed, 3);
    assert!(matches!(second, Err(IndexError::BuildInProgress)));
    assert!(!store.is_building());

    // The guard is released: a later build runs normally.
    assert_eq!(store.build_index().await.unwrap().files_indexed, 3);
}

#[tokio::test]
async fn debounced_rebuild_during_build_is_swallowed() {
    let bank = bank();
    let fs = FlakyFs {
        inner: TokioFileSystem::default(),
        read_delay: Duration::from_millis(100),
        fail_writes: false,
    };
    let mut settings = IndexSettings::new(bank.path());
    settings.rebuild_delay = Duration::from_millis(10);
    let store = Arc::new(IndexStore::new(settings, Arc::new(fs), Arc::new(YamlFrontmatterParser)));
    let kinds = Arc::new(Mutex::new(Vec::new()));
    let sink = kinds.clone();
    store.add_event_listener(move |event: &IndexEvent| {
        sink.lock().unwrap().push(event.kind());
        Ok(())
    });

    let running = store.clone();
    let manual = tokio::spawn(async move { running.build_index().await });
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(store.is_building());

    // Fires while the manual build is still reading files.
    assert!(store.trigger_auto_rebuild());
    tokio::time::sleep(Duration::from_millis(50)).await;

    let result = manual.await.unwrap().unwrap();
    assert_eq!(result.files_indexed, 3);
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(*kinds.lock().unwrap(), vec!["index_rebuilt"]);
    assert!(!store.is_building());
    assert_eq!(store.get_index().unwrap().len(), 3);
}

#[tokio::test]
async fn guard_released_after_failed_build() {
    let bank = bank();
    let store = store(bank.path(), Duration::ZERO, true);
    let kinds = Arc::new(Mutex::new(Vec::new()));
    let sink = kinds.clone();
    store.add_event_listener(move |event: &IndexEvent| {
        sink.lock().unwrap().push(event.kind());
        Ok(())
    });

    let err = store.build_index().await.unwrap_err();
    assert!(matches!(err, IndexError::FileWrite { .. }));
    assert!(!store.is_building());
    assert_eq!(*kinds.lock().unwrap(), vec!["index_error"]);

    // In-memory state still reflects the scan.
    assert_eq!(store.get_index().unwrap().len(), 3);

    let err = store.build_index().await.unwrap_err();
    assert!(matches!(err, IndexError::FileWrite { .. }));
}

#[tokio::test]
async fn failed_persist_fails_single_entry_update() {
    let bank = bank();
    let store = store(bank.path(), Duration::ZERO, true);
    store.initialize().await.unwrap();

    let err = store.update_entry("a.md").await.unwrap_err();
    assert!(matches!(err, IndexError::FileWrite { .. }));
}
