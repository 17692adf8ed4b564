//! The two fixed synthetic keystrokes: ⌘H (hide frontmost) and ⌘N
//! (prompt the active app for a new window).
//!
//! Events are posted at the HID tap with the Command flag set, a key-down
//! followed by a key-up, fire-and-forget. The source pid on posted events
//! is our own, which is how the hotkey tap recognizes and ignores them.

use std::collections::HashSet;

use core_graphics::{
    event as cge,
    event_source::{CGEventSource, CGEventSourceStateID},
};
use keyspec::{Key, Modifier, cg_flag_bits};
use switchkey_engine::{Error, KeySynth, Result};
use tracing::debug;

use crate::permissions;

/// CGEvent-backed [`KeySynth`].
#[derive(Default)]
pub struct SystemSynth;

impl SystemSynth {
    /// New synthesizer. Stateless; every call builds its own event source.
    pub fn new() -> Self {
        Self
    }

    fn post_pair(&self, key: Key) -> Result<()> {
        let mods: HashSet<Modifier> = [Modifier::Command].into_iter().collect();
        let flags = cge::CGEventFlags::from_bits_retain(cg_flag_bits(&mods));
        for down in [true, false] {
            let source = CGEventSource::new(CGEventSourceStateID::CombinedSessionState)
                .map_err(|_| self.creation_error("event source"))?;
            let event = cge::CGEvent::new_keyboard_event(source, key.code(), down)
                .map_err(|_| self.creation_error("keyboard event"))?;
            event.set_flags(flags);
            event.post(cge::CGEventTapLocation::HID);
        }
        debug!(key = ?key, "posted_command_keystroke");
        Ok(())
    }

    fn creation_error(&self, what: &'static str) -> Error {
        // Creation failures are almost always a missing permission.
        if !permissions::accessibility_ok() {
            Error::PermissionDenied("Accessibility")
        } else {
            Error::Platform { op: what, code: -1 }
        }
    }
}

impl KeySynth for SystemSynth {
    fn hide_frontmost(&self) -> Result<()> {
        self.post_pair(Key::H)
    }

    fn prompt_new_window(&self) -> Result<()> {
        self.post_pair(Key::N)
    }
}
