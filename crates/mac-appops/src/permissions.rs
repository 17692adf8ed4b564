//! Permission preflights.
//!
//! No prompting logic here: the binary logs what is missing and points the
//! user at System Settings.

#[link(name = "ApplicationServices", kind = "framework")]
unsafe extern "C" {
    fn AXIsProcessTrusted() -> bool;
    fn CGPreflightListenEventAccess() -> bool;
}

/// Whether the process holds the Accessibility permission.
///
/// Window enumeration, the raise action, and synthetic keystrokes all
/// require it.
pub fn accessibility_ok() -> bool {
    unsafe { AXIsProcessTrusted() }
}

/// Whether the process holds the Input Monitoring permission.
///
/// The global hotkey event tap requires it.
pub fn input_monitoring_ok() -> bool {
    unsafe { CGPreflightListenEventAccess() }
}
