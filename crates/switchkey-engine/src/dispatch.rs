use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use config::Mapping;
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::{ops::HotkeyApi, switch::Outcome, switch::Switcher};

/// Kind of a hotkey event delivered by the platform tap.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EventKind {
    /// Key pressed.
    KeyDown,
    /// Key released.
    KeyUp,
}

/// Routes fired global shortcuts into the switch controller.
///
/// Owns the registration id → mapping table and the process-wide enable
/// gate. Disabling does not unregister anything: shortcuts still fire at
/// the OS level but the handler becomes a no-op, which avoids the cost of
/// re-registering on every toggle.
pub struct Dispatcher {
    api: Arc<dyn HotkeyApi>,
    switcher: Arc<Switcher>,
    enabled: AtomicBool,
    bindings: Mutex<HashMap<u32, Mapping>>,
}

impl Dispatcher {
    /// Build a dispatcher over a hotkey backend and the switcher.
    pub fn new(api: Arc<dyn HotkeyApi>, switcher: Arc<Switcher>, enabled: bool) -> Self {
        Self {
            api,
            switcher,
            enabled: AtomicBool::new(enabled),
            bindings: Mutex::new(HashMap::new()),
        }
    }

    /// Replace all registrations from a mapping list.
    ///
    /// Every previous registration is removed first, so a config reload
    /// implicitly re-registers everything. Disabled mappings are ignored;
    /// mappings whose key cannot be resolved to a physical key are skipped
    /// silently; duplicate chords keep the first mapping. Returns the
    /// number of active registrations.
    pub fn register_all(&self, mappings: &[Mapping]) -> usize {
        let mut bindings = self.bindings.lock();
        for id in bindings.keys() {
            if let Err(e) = self.api.unregister(*id) {
                debug!(id, error = %e, "unregister failed");
            }
        }
        bindings.clear();

        let mut seen = std::collections::HashSet::new();
        for mapping in mappings.iter().filter(|m| m.enabled) {
            let Some(chord) = mapping.hotkey.chord() else {
                trace!(app = %mapping.app_name, key = %mapping.hotkey.key, "unresolvable hotkey; skipping");
                continue;
            };
            let ident = chord.to_string();
            if !seen.insert(ident.clone()) {
                warn!(app = %mapping.app_name, hotkey = %ident, "duplicate hotkey; keeping first binding");
                continue;
            }
            let id = self.api.intercept(chord);
            debug!(app = %mapping.app_name, hotkey = %ident, id, "registered hotkey");
            bindings.insert(id, mapping.clone());
        }
        bindings.len()
    }

    /// Flip the process-wide enable gate.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
        debug!(enabled, "dispatcher gate");
    }

    /// Current state of the enable gate.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Handle one hotkey event.
    ///
    /// Acts exactly once per physical key-down: key-ups and auto-repeats
    /// are ignored, as are events while the gate is disabled or for ids
    /// with no live registration. Presses are not queued; each invocation
    /// runs the switch independently.
    pub async fn dispatch(&self, id: u32, kind: EventKind, repeat: bool) -> Option<Outcome> {
        if kind != EventKind::KeyDown || repeat {
            return None;
        }
        if !self.is_enabled() {
            trace!(id, "dispatcher disabled; ignoring event");
            return None;
        }
        let mapping = self.bindings.lock().get(&id).cloned();
        let Some(mapping) = mapping else {
            trace!(id, "event for unregistered id");
            return None;
        };
        Some(self.switcher.activate(&mapping).await)
    }
}
