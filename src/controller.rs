// ABOUTME: Settings controller: applies the stored snapshot to the controls once and saves control changes.
// ABOUTME: Writes are fire-and-forget tasks on the I/O runtime; failures are logged, never surfaced.

use std::cell::Cell;
use std::fmt;

use futures_util::StreamExt;
use settingsapp_prefs::{PrefKey, PrefType, PreferenceStore};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::settings::{SettingsSnapshot, ToggleKey, VOLUME_LVL};
use crate::state::ApplyState;

/// Something that displays the settings: real widgets or the headless control panel.
pub trait SettingsView {
    fn show_volume(&self, volume: i32);
    fn show_toggle(&self, key: ToggleKey, active: bool);
}

/// Owned by the UI thread. Share it with control handlers through an `Rc`.
pub struct SettingsController {
    store: PreferenceStore,
    runtime: Handle,
    apply_state: Cell<ApplyState>,
    writes_issued: Cell<u64>,
}

impl SettingsController {
    /// `runtime` is where store writes are spawned.
    pub fn new(store: PreferenceStore, runtime: Handle) -> Self {
        Self {
            store,
            runtime,
            apply_state: Cell::new(ApplyState::Pending),
            writes_issued: Cell::new(0),
        }
    }

    pub fn apply_state(&self) -> ApplyState {
        self.apply_state.get()
    }

    /// Number of store writes spawned by control changes.
    pub fn writes_issued(&self) -> u64 {
        self.writes_issued.get()
    }

    /// Take the first snapshot from the store and push it into `view`.
    ///
    /// Control handlers that fire while the snapshot is being applied are
    /// suppressed, so applying never writes back to the store. Later store
    /// changes are not followed. Returns None if a snapshot was already applied
    /// or the store stream ended.
    pub async fn load_once<V: SettingsView + ?Sized>(&self, view: &V) -> Option<SettingsSnapshot> {
        if self.apply_state.get() == ApplyState::Applied {
            tracing::debug!("Settings already applied, ignoring load request");
            return None;
        }

        let prefs = {
            let mut data = self.store.data();
            data.next().await?
        };

        // Another load may have finished while we waited.
        let next = self.apply_state.get().finish_apply()?;

        let snapshot = SettingsSnapshot::from_preferences(&prefs);
        for key in ToggleKey::ALL {
            view.show_toggle(key, snapshot.toggle(key));
        }
        view.show_volume(snapshot.volume);

        self.apply_state.set(next);
        tracing::info!("Applied stored settings: {snapshot:?}");
        Some(snapshot)
    }

    pub fn on_volume_changed(&self, volume: i32) -> Option<JoinHandle<()>> {
        self.save(VOLUME_LVL, volume)
    }

    pub fn on_toggle_changed(&self, key: ToggleKey, active: bool) -> Option<JoinHandle<()>> {
        self.save(key.pref_key(), active)
    }

    fn save<T>(&self, key: PrefKey<T>, value: T) -> Option<JoinHandle<()>>
    where
        T: PrefType + fmt::Debug,
    {
        if !self.apply_state.get().writes_enabled() {
            tracing::debug!("Ignoring {key} = {value:?} while settings are {}", self.apply_state.get());
            return None;
        }

        self.writes_issued.set(self.writes_issued.get() + 1);
        let store = self.store.clone();
        Some(self.runtime.spawn(async move {
            if let Err(e) = store.set(key, value).await {
                tracing::warn!("Failed to save {key}: {e}");
            }
        }))
    }
}
