//! Filesystem content store
//!
//! Each page is a file named after its object key below a root directory.
//! Payloads are written to a temporary file first and then hard-linked into
//! place, so a key either holds a complete payload or nothing.

use crate::storage::traits::{ContentStore, StoreKey, StoreOutcome, StoreResult};
use async_trait::async_trait;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Directory-backed content store
#[derive(Debug)]
pub struct DirectoryStore {
    root: PathBuf,
    prefix: String,
    temp_counter: AtomicU64,
}

impl DirectoryStore {
    /// Opens a store rooted at `root`, creating the directory if needed
    pub fn new(root: &Path, prefix: &str) -> StoreResult<Self> {
        std::fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
            prefix: prefix.to_string(),
            temp_counter: AtomicU64::new(0),
        })
    }

    /// Path of the file holding `key`
    pub fn path_for(&self, key: &StoreKey) -> PathBuf {
        self.root.join(key.object_key(&self.prefix))
    }

    fn temp_path_for(&self, target: &Path) -> PathBuf {
        let n = self.temp_counter.fetch_add(1, Ordering::Relaxed);
        let mut name = target
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(format!(".tmp-{}-{}", std::process::id(), n));
        target.with_file_name(name)
    }
}

/// Writes `payload` to `temp` and links it into place at `target`
///
/// Returns false if `target` already existed. The temp file is removed on
/// every path; once the link exists a failed removal is only logged.
async fn publish(temp: &Path, target: &Path, payload: &str) -> io::Result<bool> {
    let linked = match write_temp(temp, payload).await {
        // hard_link refuses to replace an existing file
        Ok(()) => fs::hard_link(temp, target).await,
        Err(e) => Err(e),
    };

    if let Err(e) = fs::remove_file(temp).await {
        if e.kind() != ErrorKind::NotFound {
            tracing::warn!(path = %temp.display(), error = %e, "Failed to remove temp file");
        }
    }

    match linked {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(e),
    }
}

async fn write_temp(path: &Path, payload: &str) -> io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(payload.as_bytes()).await?;
    file.sync_all().await
}

#[async_trait]
impl ContentStore for DirectoryStore {
    async fn store_if_absent(&self, key: &StoreKey, payload: &str) -> StoreResult<StoreOutcome> {
        let target = self.path_for(key);

        if fs::try_exists(&target).await? {
            return Ok(StoreOutcome::already_present());
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }

        let temp = self.temp_path_for(&target);
        let written = publish(&temp, &target, payload).await?;

        if written {
            Ok(StoreOutcome::written())
        } else {
            Ok(StoreOutcome::already_present())
        }
    }

    async fn contains(&self, key: &StoreKey) -> StoreResult<bool> {
        Ok(fs::try_exists(self.path_for(key)).await?)
    }

    fn name(&self) -> &'static str {
        "directory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use url::Url;

    fn key(path: &str) -> StoreKey {
        StoreKey::for_url(&Url::parse(&format!("https://example.com{}", path)).unwrap())
    }

    #[tokio::test]
    async fn test_store_is_write_once() {
        let dir = TempDir::new().unwrap();
        let store = DirectoryStore::new(dir.path(), "pages/").unwrap();
        let key = key("/funds");

        let first = store.store_if_absent(&key, "fund text").await.unwrap();
        let second = store.store_if_absent(&key, "fund text").await.unwrap();

        assert!(first.written);
        assert!(!second.written);
        let stored = std::fs::read_to_string(store.path_for(&key)).unwrap();
        assert_eq!(stored, "fund text");
    }

    #[tokio::test]
    async fn test_existing_payload_is_not_overwritten() {
        let dir = TempDir::new().unwrap();
        let store = DirectoryStore::new(dir.path(), "").unwrap();
        let key = key("/funds");

        store.store_if_absent(&key, "original").await.unwrap();
        let outcome = store.store_if_absent(&key, "changed").await.unwrap();

        assert!(!outcome.written);
        let stored = std::fs::read_to_string(store.path_for(&key)).unwrap();
        assert_eq!(stored, "original");
    }

    #[tokio::test]
    async fn test_prefix_creates_subdirectory() {
        let dir = TempDir::new().unwrap();
        let store = DirectoryStore::new(dir.path(), "crawl/funds/").unwrap();
        let key = key("/a");

        store.store_if_absent(&key, "text").await.unwrap();

        let expected = dir
            .path()
            .join("crawl")
            .join("funds")
            .join(format!("{}.txt", key.digest()));
        assert!(expected.exists());
    }

    #[tokio::test]
    async fn test_no_temp_files_left_behind() {
        let dir = TempDir::new().unwrap();
        let store = DirectoryStore::new(dir.path(), "").unwrap();

        store.store_if_absent(&key("/a"), "a").await.unwrap();
        store.store_if_absent(&key("/b"), "b").await.unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.iter().all(|name| name.ends_with(".txt")));
    }

    #[tokio::test]
    async fn test_failed_link_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        let temp = dir.path().join("page.txt.tmp-1");
        let target = dir.path().join("missing").join("page.txt");

        let result = publish(&temp, &target, "text").await;

        assert_eq!(result.unwrap_err().kind(), ErrorKind::NotFound);
        assert!(!temp.exists());
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn test_failed_write_leaves_nothing_behind() {
        let dir = TempDir::new().unwrap();
        let temp = dir.path().join("no-such-dir").join("page.txt.tmp-1");
        let target = dir.path().join("page.txt");

        assert!(publish(&temp, &target, "text").await.is_err());
        assert!(!target.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_existing_target_reports_not_written() {
        let dir = TempDir::new().unwrap();
        let temp = dir.path().join("page.txt.tmp-1");
        let target = dir.path().join("page.txt");
        std::fs::write(&target, "first").unwrap();

        assert!(!publish(&temp, &target, "second").await.unwrap());
        assert!(!temp.exists());
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "first");
    }

    #[tokio::test]
    async fn test_second_instance_sees_previous_run() {
        let dir = TempDir::new().unwrap();
        let key = key("/persisted");

        let first_run = DirectoryStore::new(dir.path(), "").unwrap();
        assert!(first_run.store_if_absent(&key, "text").await.unwrap().written);

        let second_run = DirectoryStore::new(dir.path(), "").unwrap();
        assert!(second_run.contains(&key).await.unwrap());
        assert!(!second_run.store_if_absent(&key, "text").await.unwrap().written);
    }
}
