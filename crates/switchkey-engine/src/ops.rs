//! Platform trait seams and the window/process data types that cross them.
//!
//! The engine consults these traits for everything it needs from the OS:
//! the process registry, the accessibility window interface, the input
//! event layer, and global shortcut registration. Production backends live
//! in `mac-appops`; the mocks in [`crate::mocks`] stand in for tests.

use std::path::PathBuf;

use keyspec::Chord;

use crate::Result;

/// Opaque identifier for one OS window within its process.
pub type WindowId = u32;

/// A running application instance, obtained on demand from the process
/// registry and never cached by the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessHandle {
    /// Process id.
    pub pid: i32,
    /// Bundle identifier the instance was resolved from.
    pub bundle_id: String,
}

/// One window as observed at enumeration time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowInfo {
    /// Owning process id.
    pub pid: i32,
    /// Window id; raising re-resolves the platform handle from `(pid, id)`.
    pub id: WindowId,
    /// Window title, best-effort.
    pub title: String,
    /// Observable minimized flag at enumeration time.
    pub minimized: bool,
}

/// Result of the ordered window-enumeration fallback chain: the full list,
/// the single main-window attribute, or nothing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WindowQuery {
    /// The full window list was available.
    Full(Vec<WindowInfo>),
    /// Only the main-window attribute was available.
    MainOnly(WindowInfo),
    /// Neither query succeeded.
    None,
}

impl WindowQuery {
    /// Flatten to the cycle-eligible sequence: minimized windows excluded.
    pub fn visible(self) -> Vec<WindowInfo> {
        match self {
            Self::Full(wins) => wins.into_iter().filter(|w| !w.minimized).collect(),
            Self::MainOnly(w) if !w.minimized => vec![w],
            Self::MainOnly(_) | Self::None => Vec::new(),
        }
    }
}

/// What to hand the OS when launching an application.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LaunchTarget {
    /// Resolve the application from its bundle identifier.
    Bundle(String),
    /// Open an explicit filesystem path.
    Path(PathBuf),
}

/// Process registry and activation interface.
pub trait ProcessOps: Send + Sync {
    /// All running instances matching a bundle identifier, in registry order.
    fn running(&self, bundle_id: &str) -> Vec<ProcessHandle>;

    /// Whether a pid still refers to a live process.
    fn is_running(&self, pid: i32) -> bool;

    /// Bring the process to front, all windows.
    fn activate(&self, pid: i32) -> Result<()>;

    /// Ask the OS to open the target asynchronously.
    fn launch(&self, target: &LaunchTarget) -> Result<()>;
}

/// Read-only accessibility window interface plus the raise action.
pub trait WinOps: Send + Sync {
    /// Enumerate a process's windows through the ordered fallback chain.
    fn query_windows(&self, pid: i32) -> WindowQuery;

    /// Issue the platform raise action on one window.
    fn raise_window(&self, pid: i32, id: WindowId) -> Result<()>;
}

/// Synthetic keystroke emitter for the two fixed fallback combinations.
///
/// Stateless; each call posts a key-down then a key-up with no verification
/// that the intended application processed them.
pub trait KeySynth: Send + Sync {
    /// Hide the frontmost application (the ⌘H equivalent).
    fn hide_frontmost(&self) -> Result<()>;

    /// Prompt the active application to create a window (the ⌘N equivalent).
    fn prompt_new_window(&self) -> Result<()>;
}

/// Global shortcut registration interface used by the dispatcher.
pub trait HotkeyApi: Send + Sync {
    /// Register a chord for interception; returns the registration id.
    fn intercept(&self, chord: Chord) -> u32;

    /// Remove a registration.
    fn unregister(&self, id: u32) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn win(id: WindowId, minimized: bool) -> WindowInfo {
        WindowInfo {
            pid: 7,
            id,
            title: format!("w{id}"),
            minimized,
        }
    }

    #[test]
    fn visible_filters_minimized() {
        let q = WindowQuery::Full(vec![win(1, false), win(2, true), win(3, false)]);
        let v = q.visible();
        assert_eq!(v.iter().map(|w| w.id).collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn visible_main_only_respects_minimized() {
        assert_eq!(WindowQuery::MainOnly(win(4, false)).visible().len(), 1);
        assert!(WindowQuery::MainOnly(win(4, true)).visible().is_empty());
        assert!(WindowQuery::None.visible().is_empty());
    }
}
