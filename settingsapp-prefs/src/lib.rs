// ABOUTME: Typed key-value preference storage shared by the settings controller and GUI.
// ABOUTME: Defines typed keys, stored values, the preferences map, and the file-backed store.

mod store;

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

pub use store::{PreferenceStore, StoreError};

/// A value as it is stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    /// Anything else found in the file. Kept so it is written back unchanged,
    /// but no key type reads it.
    Other(toml::Value),
}

/// Types that can be stored under a [`PrefKey`].
pub trait PrefType: Sized + Clone + Send + 'static {
    fn into_value(self) -> Value;

    /// Returns None when the stored value has a different type or does not fit.
    fn from_value(value: &Value) -> Option<Self>;
}

impl PrefType for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl PrefType for i32 {
    fn into_value(self) -> Value {
        Value::Int(i64::from(self))
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(n) => i32::try_from(*n).ok(),
            _ => None,
        }
    }
}

/// A preference key carrying the type of the value stored under it.
pub struct PrefKey<T> {
    name: &'static str,
    _type: PhantomData<fn() -> T>,
}

impl<T> PrefKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _type: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for PrefKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PrefKey<T> {}

impl<T> PartialEq for PrefKey<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<T> Eq for PrefKey<T> {}

impl<T> fmt::Debug for PrefKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PrefKey").field(&self.name).finish()
    }
}

impl<T> fmt::Display for PrefKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Every stored key and its value, read as one unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Preferences {
    entries: BTreeMap<String, Value>,
}

impl Preferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<T: PrefType>(&self, key: PrefKey<T>) -> Option<T> {
        self.entries.get(key.name()).and_then(T::from_value)
    }

    pub fn set<T: PrefType>(&mut self, key: PrefKey<T>, value: T) {
        self.entries.insert(key.name().to_string(), value.into_value());
    }

    pub fn remove<T: PrefType>(&mut self, key: PrefKey<T>) -> Option<T> {
        self.entries
            .remove(key.name())
            .and_then(|value| T::from_value(&value))
    }

    pub fn contains<T>(&self, key: PrefKey<T>) -> bool {
        self.entries.contains_key(key.name())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub(crate) fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VOLUME: PrefKey<i32> = PrefKey::new("volume_lvl");
    const DARK: PrefKey<bool> = PrefKey::new("key_darkmode");

    #[test]
    fn missing_key_reads_as_none() {
        let prefs = Preferences::new();
        assert_eq!(prefs.get(VOLUME), None);
        assert!(!prefs.contains(DARK));
    }

    #[test]
    fn set_then_get_returns_value() {
        let mut prefs = Preferences::new();
        prefs.set(VOLUME, 80);
        prefs.set(DARK, true);
        assert_eq!(prefs.get(VOLUME), Some(80));
        assert_eq!(prefs.get(DARK), Some(true));
        assert_eq!(prefs.len(), 2);
    }

    #[test]
    fn wrong_type_reads_as_none() {
        let prefs = Preferences::from_toml("volume_lvl = true\nkey_darkmode = 3\n").unwrap();
        assert_eq!(prefs.get(VOLUME), None);
        assert_eq!(prefs.get(DARK), None);
        assert!(prefs.contains(VOLUME));
    }

    #[test]
    fn out_of_range_int_reads_as_none() {
        let prefs = Preferences::from_toml("volume_lvl = 9999999999\n").unwrap();
        assert_eq!(prefs.get(VOLUME), None);
        assert!(prefs.contains(VOLUME));
    }

    #[test]
    fn toml_uses_plain_key_names() {
        let mut prefs = Preferences::new();
        prefs.set(DARK, false);
        prefs.set(VOLUME, 42);
        let text = prefs.to_toml().unwrap();
        assert!(text.contains("key_darkmode = false"));
        assert!(text.contains("volume_lvl = 42"));
    }

    #[test]
    fn non_scalar_values_only_affect_their_own_key() {
        let text = "key_darkmode = true\nvolume_lvl = [1, 2]\nratio = 1.5\nname = \"x\"\n";
        let prefs = Preferences::from_toml(text).unwrap();
        assert_eq!(prefs.get(DARK), Some(true));
        assert_eq!(prefs.get(VOLUME), None);
        assert_eq!(prefs.len(), 4);

        let written = prefs.to_toml().unwrap();
        assert_eq!(Preferences::from_toml(&written).unwrap(), prefs);
    }

    #[test]
    fn remove_returns_previous_value() {
        let mut prefs = Preferences::new();
        prefs.set(VOLUME, 10);
        assert_eq!(prefs.remove(VOLUME), Some(10));
        assert!(prefs.is_empty());
    }
}
