// ABOUTME: Entry point for the settings GUI.
// ABOUTME: GTK4+libadwaita application; store I/O runs on a background tokio runtime.

mod window;

use libadwaita as adw;
use adw::prelude::*;

use settingsapp::Config;
use settingsapp_prefs::PreferenceStore;

const APP_ID: &str = "io.github.settingsapp.Settings";

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config (using defaults): {e}");
        Config::default()
    });

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("settingsapp-io")
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Fatal: failed to create tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    let store = match runtime.block_on(PreferenceStore::open(config.store_path())) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Fatal: {e}");
            std::process::exit(1);
        }
    };

    let app = adw::Application::builder()
        .application_id(APP_ID)
        .build();

    let handle = runtime.handle().clone();
    app.connect_activate(move |app| {
        if let Some(win) = app.windows().first() {
            win.present();
        } else {
            let win = window::build_window(app, &config, store.clone(), handle.clone());
            win.present();
        }
    });

    app.run();
}
