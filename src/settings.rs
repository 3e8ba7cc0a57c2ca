// ABOUTME: Settings model: the stored keys, their defaults, and the snapshot read from the store.
// ABOUTME: Missing or mistyped keys fall back to defaults on every read.

use std::fmt;

use settingsapp_prefs::{PrefKey, Preferences};

pub const VOLUME_LVL: PrefKey<i32> = PrefKey::new("volume_lvl");
pub const KEY_DARKMODE: PrefKey<bool> = PrefKey::new("key_darkmode");
pub const KEY_BLUETOOTH: PrefKey<bool> = PrefKey::new("key_bluetooth");
pub const KEY_VIBRATION: PrefKey<bool> = PrefKey::new("key_vibration");

pub const DEFAULT_VOLUME: i32 = 50;
pub const DEFAULT_DARK_MODE: bool = false;
pub const DEFAULT_VIBRATION: bool = true;
pub const DEFAULT_BLUETOOTH: bool = false;

/// The boolean settings, each bound to one switch and one stored key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToggleKey {
    DarkMode,
    Bluetooth,
    Vibration,
}

impl ToggleKey {
    pub const ALL: [ToggleKey; 3] = [ToggleKey::DarkMode, ToggleKey::Bluetooth, ToggleKey::Vibration];

    pub fn pref_key(self) -> PrefKey<bool> {
        match self {
            ToggleKey::DarkMode => KEY_DARKMODE,
            ToggleKey::Bluetooth => KEY_BLUETOOTH,
            ToggleKey::Vibration => KEY_VIBRATION,
        }
    }

    pub fn default_value(self) -> bool {
        match self {
            ToggleKey::DarkMode => DEFAULT_DARK_MODE,
            ToggleKey::Bluetooth => DEFAULT_BLUETOOTH,
            ToggleKey::Vibration => DEFAULT_VIBRATION,
        }
    }

    /// Human-readable label for the switch.
    pub fn label(self) -> &'static str {
        match self {
            ToggleKey::DarkMode => "Dark mode",
            ToggleKey::Bluetooth => "Bluetooth",
            ToggleKey::Vibration => "Vibration",
        }
    }
}

impl fmt::Display for ToggleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pref_key().name())
    }
}

/// Current value of every setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingsSnapshot {
    pub volume: i32,
    pub dark_mode: bool,
    pub vibration: bool,
    pub bluetooth: bool,
}

impl Default for SettingsSnapshot {
    fn default() -> Self {
        Self {
            volume: DEFAULT_VOLUME,
            dark_mode: DEFAULT_DARK_MODE,
            vibration: DEFAULT_VIBRATION,
            bluetooth: DEFAULT_BLUETOOTH,
        }
    }
}

impl SettingsSnapshot {
    pub fn from_preferences(prefs: &Preferences) -> Self {
        Self {
            volume: prefs.get(VOLUME_LVL).unwrap_or(DEFAULT_VOLUME),
            dark_mode: prefs.get(KEY_DARKMODE).unwrap_or(DEFAULT_DARK_MODE),
            vibration: prefs.get(KEY_VIBRATION).unwrap_or(DEFAULT_VIBRATION),
            bluetooth: prefs.get(KEY_BLUETOOTH).unwrap_or(DEFAULT_BLUETOOTH),
        }
    }

    pub fn toggle(&self, key: ToggleKey) -> bool {
        match key {
            ToggleKey::DarkMode => self.dark_mode,
            ToggleKey::Bluetooth => self.bluetooth,
            ToggleKey::Vibration => self.vibration,
        }
    }
}

impl From<&Preferences> for SettingsSnapshot {
    fn from(prefs: &Preferences) -> Self {
        Self::from_preferences(prefs)
    }
}
