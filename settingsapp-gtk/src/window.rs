// ABOUTME: Builds the settings window: switch rows for each toggle and a volume scale.
// ABOUTME: Widgets implement SettingsView; their change signals feed the SettingsController.

use std::ops::RangeInclusive;
use std::rc::Rc;

use gtk4::glib;
use libadwaita as adw;
use adw::prelude::*;

use settingsapp::settings::DEFAULT_VOLUME;
use settingsapp::{Config, SettingsController, SettingsView, ToggleKey};
use settingsapp_prefs::PreferenceStore;
use tokio::runtime::Handle;

/// The widgets bound to stored settings.
struct SettingsWidgets {
    dark_mode_row: adw::SwitchRow,
    bluetooth_row: adw::SwitchRow,
    vibration_row: adw::SwitchRow,
    volume_scale: gtk4::Scale,
}

impl SettingsWidgets {
    fn new(volume_range: RangeInclusive<i32>) -> Self {
        let volume_scale = gtk4::Scale::with_range(
            gtk4::Orientation::Horizontal,
            f64::from(*volume_range.start()),
            f64::from(*volume_range.end()),
            1.0,
        );
        volume_scale.set_value(initial_volume(&volume_range));
        volume_scale.set_digits(0);
        volume_scale.set_round_digits(0);
        volume_scale.set_draw_value(true);
        volume_scale.set_hexpand(true);
        volume_scale.set_valign(gtk4::Align::Center);
        volume_scale.set_width_request(220);

        Self {
            dark_mode_row: switch_row(ToggleKey::DarkMode, "Use a dark color scheme"),
            bluetooth_row: switch_row(ToggleKey::Bluetooth, "Allow connections to nearby devices"),
            vibration_row: switch_row(ToggleKey::Vibration, "Vibrate on notifications"),
            volume_scale,
        }
    }

    fn row(&self, key: ToggleKey) -> &adw::SwitchRow {
        match key {
            ToggleKey::DarkMode => &self.dark_mode_row,
            ToggleKey::Bluetooth => &self.bluetooth_row,
            ToggleKey::Vibration => &self.vibration_row,
        }
    }
}

impl SettingsView for SettingsWidgets {
    fn show_volume(&self, volume: i32) {
        self.volume_scale.set_value(f64::from(volume));
    }

    fn show_toggle(&self, key: ToggleKey, active: bool) {
        self.row(key).set_active(active);
    }
}

/// Slider position before the stored settings arrive.
fn initial_volume(range: &RangeInclusive<i32>) -> f64 {
    f64::from(DEFAULT_VOLUME.clamp(*range.start(), *range.end()))
}

fn switch_row(key: ToggleKey, subtitle: &str) -> adw::SwitchRow {
    adw::SwitchRow::builder()
        .title(key.label())
        .subtitle(subtitle)
        .active(key.default_value())
        .build()
}

pub fn build_window(
    app: &adw::Application,
    config: &Config,
    store: PreferenceStore,
    runtime: Handle,
) -> adw::ApplicationWindow {
    let widgets = Rc::new(SettingsWidgets::new(config.volume_range()));
    let controller = Rc::new(SettingsController::new(store, runtime));

    let groups_box = gtk4::Box::new(gtk4::Orientation::Vertical, 24);
    groups_box.set_margin_top(24);
    groups_box.set_margin_bottom(24);
    groups_box.set_margin_start(12);
    groups_box.set_margin_end(12);

    // -- Display group --
    let display_group = adw::PreferencesGroup::builder()
        .title("Display")
        .build();
    display_group.add(&widgets.dark_mode_row);
    groups_box.append(&display_group);

    // -- Connectivity group --
    let connectivity_group = adw::PreferencesGroup::builder()
        .title("Connectivity")
        .build();
    connectivity_group.add(&widgets.bluetooth_row);
    connectivity_group.add(&widgets.vibration_row);
    groups_box.append(&connectivity_group);

    // -- Sound group --
    let sound_group = adw::PreferencesGroup::builder()
        .title("Sound")
        .build();
    let volume_row = adw::ActionRow::builder()
        .title("Volume")
        .build();
    volume_row.add_suffix(&widgets.volume_scale);
    sound_group.add(&volume_row);
    groups_box.append(&sound_group);

    let clamp = adw::Clamp::builder()
        .maximum_size(600)
        .build();
    clamp.set_child(Some(&groups_box));

    let scrolled = gtk4::ScrolledWindow::builder()
        .hscrollbar_policy(gtk4::PolicyType::Never)
        .vexpand(true)
        .child(&clamp)
        .build();

    let toolbar_view = adw::ToolbarView::new();
    toolbar_view.add_top_bar(&adw::HeaderBar::new());
    toolbar_view.set_content(Some(&scrolled));

    let window = adw::ApplicationWindow::builder()
        .application(app)
        .title("Settings")
        .default_width(420)
        .default_height(480)
        .content(&toolbar_view)
        .build();

    wire_controls(&widgets, &controller);

    // Apply the stored settings once. Handlers stay quiet until this finishes.
    let widgets_for_load = widgets.clone();
    let controller_for_load = controller.clone();
    glib::MainContext::default().spawn_local(async move {
        if controller_for_load.load_once(widgets_for_load.as_ref()).await.is_none() {
            tracing::warn!("No stored settings were applied");
        }
    });

    window
}

fn wire_controls(widgets: &SettingsWidgets, controller: &Rc<SettingsController>) {
    for key in ToggleKey::ALL {
        let controller = controller.clone();
        widgets.row(key).connect_active_notify(move |row| {
            let _ = controller.on_toggle_changed(key, row.is_active());
        });
    }

    // Runs for loaded values too, so the window matches the stored preference.
    widgets.dark_mode_row.connect_active_notify(|row| {
        apply_color_scheme(row.is_active());
    });

    let controller = controller.clone();
    widgets.volume_scale.connect_value_changed(move |scale| {
        let _ = controller.on_volume_changed(scale.value().round() as i32);
    });
}

fn apply_color_scheme(dark: bool) {
    let scheme = if dark {
        adw::ColorScheme::ForceDark
    } else {
        adw::ColorScheme::Default
    };
    adw::StyleManager::default().set_color_scheme(scheme);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slider_starts_at_default_volume() {
        assert_eq!(initial_volume(&(0..=100)), 50.0);
    }

    #[test]
    fn default_volume_is_clamped_to_configured_range() {
        assert_eq!(initial_volume(&(60..=90)), 60.0);
        assert_eq!(initial_volume(&(0..=20)), 20.0);
    }
}
