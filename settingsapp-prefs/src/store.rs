// ABOUTME: File-backed preference store with a change stream and serialized read-modify-write edits.
// ABOUTME: Loads TOML on open, recovers from corrupt files, and writes via temp file + rename.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Mutex, watch};
use tokio_stream::wrappers::WatchStream;

use crate::{PrefKey, PrefType, Preferences};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access preferences file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode preferences: {0}")]
    Encode(#[from] toml::ser::Error),
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Durable preference map. Cloning yields another handle to the same store.
#[derive(Clone)]
pub struct PreferenceStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    path: PathBuf,
    // Serializes edits so each read-modify-write sees the previous commit.
    write_lock: Mutex<()>,
    current: watch::Sender<Preferences>,
    version: AtomicU64,
}

impl PreferenceStore {
    /// Open the store at `path`, loading whatever is on disk.
    /// A missing file is an empty store; an unparsable one is logged and treated as empty.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let prefs = read_preferences(&path).await?;
        let (current, _) = watch::channel(prefs);

        Ok(Self {
            inner: Arc::new(StoreInner {
                path,
                write_lock: Mutex::new(()),
                current,
                version: AtomicU64::new(0),
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Stream of preferences: the current value first, then one item per committed edit.
    /// Slow consumers only see the latest value.
    pub fn data(&self) -> WatchStream<Preferences> {
        WatchStream::new(self.inner.current.subscribe())
    }

    pub fn subscribe(&self) -> watch::Receiver<Preferences> {
        self.inner.current.subscribe()
    }

    pub fn snapshot(&self) -> Preferences {
        self.inner.current.borrow().clone()
    }

    /// Number of edits committed to disk since the store was opened.
    pub fn version(&self) -> u64 {
        self.inner.version.load(Ordering::Acquire)
    }

    /// Atomically read, modify and persist the preferences.
    /// Returns the preferences as committed. Edits that change nothing are not written.
    pub async fn edit<F>(&self, apply: F) -> Result<Preferences, StoreError>
    where
        F: FnOnce(&mut Preferences),
    {
        let _guard = self.inner.write_lock.lock().await;

        let before = self.snapshot();
        let mut after = before.clone();
        apply(&mut after);

        if after == before {
            tracing::debug!("Preference edit made no changes, skipping write");
            return Ok(after);
        }

        write_preferences(&self.inner.path, &after).await?;
        self.inner.current.send_replace(after.clone());
        self.inner.version.fetch_add(1, Ordering::AcqRel);

        Ok(after)
    }

    pub async fn set<T: PrefType>(&self, key: PrefKey<T>, value: T) -> Result<Preferences, StoreError> {
        let prefs = self.edit(|prefs| prefs.set(key, value)).await?;
        tracing::debug!("Saved preference {key}");
        Ok(prefs)
    }

    pub async fn remove<T: PrefType>(&self, key: PrefKey<T>) -> Result<Preferences, StoreError> {
        self.edit(|prefs| {
            prefs.remove(key);
        })
        .await
    }
}

async fn read_preferences(path: &Path) -> Result<Preferences, StoreError> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => match Preferences::from_toml(&contents) {
            Ok(prefs) => {
                tracing::info!("Loaded {} preferences from {}", prefs.len(), path.display());
                Ok(prefs)
            }
            Err(e) => {
                tracing::warn!("Preferences file {} is unreadable (starting fresh): {e}", path.display());
                Ok(Preferences::new())
            }
        },
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!("No preferences file at {}, starting fresh", path.display());
            Ok(Preferences::new())
        }
        Err(e) => Err(StoreError::io(path, e)),
    }
}

async fn write_preferences(path: &Path, prefs: &Preferences) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent, e))?;
        }
    }

    let contents = prefs.to_toml()?;
    let tmp_path = temp_path(path);
    tokio::fs::write(&tmp_path, contents)
        .await
        .map_err(|e| StoreError::io(&tmp_path, e))?;
    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| StoreError::io(path, e))?;

    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    const VOLUME: PrefKey<i32> = PrefKey::new("volume_lvl");
    const DARK: PrefKey<bool> = PrefKey::new("key_darkmode");
    const BLUETOOTH: PrefKey<bool> = PrefKey::new("key_bluetooth");
    const VIBRATION: PrefKey<bool> = PrefKey::new("key_vibration");

    #[tokio::test]
    async fn open_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::open(dir.path().join("settings.toml")).await.unwrap();
        assert!(store.snapshot().is_empty());
        assert_eq!(store.version(), 0);
    }

    #[tokio::test]
    async fn set_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");

        let store = PreferenceStore::open(&path).await.unwrap();
        store.set(VOLUME, 72).await.unwrap();
        store.set(DARK, true).await.unwrap();
        assert_eq!(store.version(), 2);

        let reopened = PreferenceStore::open(&path).await.unwrap();
        let prefs = reopened.snapshot();
        assert_eq!(prefs.get(VOLUME), Some(72));
        assert_eq!(prefs.get(DARK), Some(true));
        assert!(!temp_path(&path).exists());
    }

    #[tokio::test]
    async fn single_key_write_leaves_others_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        let store = PreferenceStore::open(&path).await.unwrap();
        store.set(VOLUME, 10).await.unwrap();
        store.set(BLUETOOTH, true).await.unwrap();

        store.set(VOLUME, 90).await.unwrap();

        let prefs = PreferenceStore::open(&path).await.unwrap().snapshot();
        assert_eq!(prefs.get(VOLUME), Some(90));
        assert_eq!(prefs.get(BLUETOOTH), Some(true));
        assert_eq!(prefs.len(), 2);
    }

    #[tokio::test]
    async fn unchanged_edit_skips_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        let store = PreferenceStore::open(&path).await.unwrap();

        store.set(DARK, true).await.unwrap();
        store.set(DARK, true).await.unwrap();
        assert_eq!(store.version(), 1);

        // Removing an absent key is also a no-op.
        store.remove(VOLUME).await.unwrap();
        assert_eq!(store.version(), 1);
    }

    #[tokio::test]
    async fn corrupt_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "volume_lvl = [unterminated").unwrap();

        let store = PreferenceStore::open(&path).await.unwrap();
        assert!(store.snapshot().is_empty());

        store.set(VOLUME, 5).await.unwrap();
        let reopened = PreferenceStore::open(&path).await.unwrap();
        assert_eq!(reopened.snapshot().get(VOLUME), Some(5));
    }

    #[tokio::test]
    async fn non_scalar_value_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "key_darkmode = true\nvolume_lvl = [1, 2]\n").unwrap();

        let store = PreferenceStore::open(&path).await.unwrap();
        let prefs = store.snapshot();
        assert_eq!(prefs.get(DARK), Some(true));
        assert_eq!(prefs.get(VOLUME), None);
        assert_eq!(prefs.len(), 2);

        store.set(VOLUME, 5).await.unwrap();

        let reopened = PreferenceStore::open(&path).await.unwrap().snapshot();
        assert_eq!(reopened.get(VOLUME), Some(5));
        assert_eq!(reopened.get(DARK), Some(true));
    }

    #[tokio::test]
    async fn data_stream_yields_current_then_changes() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::open(dir.path().join("settings.toml")).await.unwrap();

        let mut data = store.data();
        let first = data.next().await.unwrap();
        assert!(first.is_empty());

        store.set(VIBRATION, false).await.unwrap();
        let second = data.next().await.unwrap();
        assert_eq!(second.get(VIBRATION), Some(false));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writes_to_different_keys_all_land() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        let store = PreferenceStore::open(&path).await.unwrap();

        let tasks = vec![
            tokio::spawn({
                let store = store.clone();
                async move { store.set(VOLUME, 33).await.map(|_| ()) }
            }),
            tokio::spawn({
                let store = store.clone();
                async move { store.set(DARK, true).await.map(|_| ()) }
            }),
            tokio::spawn({
                let store = store.clone();
                async move { store.set(BLUETOOTH, true).await.map(|_| ()) }
            }),
            tokio::spawn({
                let store = store.clone();
                async move { store.set(VIBRATION, false).await.map(|_| ()) }
            }),
        ];
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let prefs = PreferenceStore::open(&path).await.unwrap().snapshot();
        assert_eq!(prefs.get(VOLUME), Some(33));
        assert_eq!(prefs.get(DARK), Some(true));
        assert_eq!(prefs.get(BLUETOOTH), Some(true));
        assert_eq!(prefs.get(VIBRATION), Some(false));
        assert_eq!(store.version(), 4);
    }
}
