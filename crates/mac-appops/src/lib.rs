//! macOS backends for the switchkey engine's platform seams.
//!
//! - [`SystemProcs`]: process registry and activation over AppKit's
//!   `NSRunningApplication`, launching through `/usr/bin/open`.
//! - [`SystemWinOps`]: window enumeration and the raise action over the
//!   accessibility (AX) interface, consumed read-only.
//! - [`SystemSynth`]: the two fixed synthetic keystrokes (hide, new
//!   window) posted as CGEvents at the HID tap.
//! - [`Manager`]: the global hotkey event tap; matched chords are swallowed
//!   and forwarded as [`Event`]s over a channel.
//! - Permission preflights: [`accessibility_ok`], [`input_monitoring_ok`].
//!
//! This crate is macOS-only by design; on other targets it compiles to
//! nothing.

#[cfg(target_os = "macos")]
mod ax;
#[cfg(target_os = "macos")]
mod hotkey;
#[cfg(target_os = "macos")]
mod permissions;
#[cfg(target_os = "macos")]
mod process;
#[cfg(target_os = "macos")]
mod synth;
#[cfg(target_os = "macos")]
mod window;

#[cfg(target_os = "macos")]
pub use hotkey::{Event, Manager};
#[cfg(target_os = "macos")]
pub use permissions::{accessibility_ok, input_monitoring_ok};
#[cfg(target_os = "macos")]
pub use process::SystemProcs;
#[cfg(target_os = "macos")]
pub use synth::SystemSynth;
#[cfg(target_os = "macos")]
pub use window::SystemWinOps;
