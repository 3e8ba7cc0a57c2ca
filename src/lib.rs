// ABOUTME: Settings screen core: settings model, one-shot apply state, controls, and the controller.
// ABOUTME: The GTK front end and tests drive the same SettingsController through SettingsView.

pub mod config;
pub mod controller;
pub mod controls;
pub mod settings;
pub mod state;

pub use config::Config;
pub use controller::{SettingsController, SettingsView};
pub use settings::{SettingsSnapshot, ToggleKey};
pub use state::ApplyState;

pub type DynError = Box<dyn std::error::Error + Send + Sync>;
