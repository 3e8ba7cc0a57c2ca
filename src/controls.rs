// ABOUTME: Headless switch and slider controls with typed change observers.
// ABOUTME: ControlPanel groups the four settings controls and binds them to a SettingsController.

use std::cell::{Cell, RefCell};
use std::ops::RangeInclusive;
use std::rc::Rc;

use crate::controller::{SettingsController, SettingsView};
use crate::settings::{DEFAULT_VOLUME, ToggleKey};

type Observer<T> = Box<dyn Fn(T)>;

/// Observers registered on one control. Handlers must not register new
/// observers on the same control while being notified.
struct Observers<T> {
    handlers: RefCell<Vec<Observer<T>>>,
}

impl<T: Copy> Observers<T> {
    fn new() -> Self {
        Self {
            handlers: RefCell::new(Vec::new()),
        }
    }

    fn connect(&self, handler: impl Fn(T) + 'static) {
        self.handlers.borrow_mut().push(Box::new(handler));
    }

    fn notify(&self, value: T) {
        for handler in self.handlers.borrow().iter() {
            handler(value);
        }
    }
}

/// An on/off control. Observers fire on every actual change, whether the
/// user or the program flipped it.
pub struct Switch {
    active: Cell<bool>,
    observers: Observers<bool>,
}

impl Switch {
    pub fn new(active: bool) -> Self {
        Self {
            active: Cell::new(active),
            observers: Observers::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    pub fn set_active(&self, active: bool) {
        if self.active.replace(active) != active {
            self.observers.notify(active);
        }
    }

    pub fn connect_active_notify(&self, handler: impl Fn(bool) + 'static) {
        self.observers.connect(handler);
    }
}

/// A continuous control over an inclusive integer range. Out-of-range values are clamped.
pub struct Slider {
    value: Cell<i32>,
    range: RangeInclusive<i32>,
    observers: Observers<i32>,
}

impl Slider {
    pub fn new(range: RangeInclusive<i32>, value: i32) -> Self {
        let value = value.clamp(*range.start(), *range.end());
        Self {
            value: Cell::new(value),
            range,
            observers: Observers::new(),
        }
    }

    pub fn value(&self) -> i32 {
        self.value.get()
    }

    pub fn range(&self) -> RangeInclusive<i32> {
        self.range.clone()
    }

    pub fn set_value(&self, value: i32) {
        let value = value.clamp(*self.range.start(), *self.range.end());
        if self.value.replace(value) != value {
            self.observers.notify(value);
        }
    }

    pub fn connect_value_changed(&self, handler: impl Fn(i32) + 'static) {
        self.observers.connect(handler);
    }
}

/// The settings screen without a toolkit: three switches and the volume slider.
/// Used as the view in tests; the GTK window wires its own widgets the same way.
pub struct ControlPanel {
    pub dark_mode: Switch,
    pub bluetooth: Switch,
    pub vibration: Switch,
    pub volume: Slider,
}

impl ControlPanel {
    pub fn new(volume_range: RangeInclusive<i32>) -> Self {
        Self {
            dark_mode: Switch::new(ToggleKey::DarkMode.default_value()),
            bluetooth: Switch::new(ToggleKey::Bluetooth.default_value()),
            vibration: Switch::new(ToggleKey::Vibration.default_value()),
            volume: Slider::new(volume_range, DEFAULT_VOLUME),
        }
    }

    pub fn switch(&self, key: ToggleKey) -> &Switch {
        match key {
            ToggleKey::DarkMode => &self.dark_mode,
            ToggleKey::Bluetooth => &self.bluetooth,
            ToggleKey::Vibration => &self.vibration,
        }
    }

    /// Route every control change into the controller.
    pub fn bind(&self, controller: &Rc<SettingsController>) {
        for key in ToggleKey::ALL {
            let controller = controller.clone();
            self.switch(key).connect_active_notify(move |active| {
                let _ = controller.on_toggle_changed(key, active);
            });
        }

        let controller = controller.clone();
        self.volume.connect_value_changed(move |value| {
            let _ = controller.on_volume_changed(value);
        });
    }
}

impl SettingsView for ControlPanel {
    fn show_volume(&self, volume: i32) {
        self.volume.set_value(volume);
    }

    fn show_toggle(&self, key: ToggleKey, active: bool) {
        self.switch(key).set_active(active);
    }
}
