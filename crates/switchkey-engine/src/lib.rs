//! Switchkey engine
//!
//! The engine crate holds the only real state in switchkey:
//! - [`Switcher`]: the decision engine — given a mapping, determines the
//!   target application's run state and dispatches to launch, activate,
//!   window-cycle, or minimize logic.
//! - [`WindowCycler`] and [`CyclerStore`]: per-process window order and
//!   cursor, keyed by pid and capped to live processes.
//! - [`Dispatcher`]: routes fired hotkey events into the switcher, gated by
//!   a process-wide enable flag.
//!
//! Platform access goes through the trait seams in [`ops`] ([`ProcessOps`],
//! [`WinOps`], [`KeySynth`], [`HotkeyApi`]); the engine itself never touches
//! the OS, which keeps the whole decision path testable with the mocks in
//! [`mocks`].
//!
//! Failure policy: every operation that can fail internally swallows the
//! failure, logs it, and substitutes a safe fallback action. The public
//! [`Switcher::activate`] path returns an [`Outcome`], never an error.

mod cycler;
mod dispatch;
mod error;
pub mod mocks;
pub mod ops;
mod store;
mod switch;

pub use cycler::WindowCycler;
pub use dispatch::{Dispatcher, EventKind};
pub use error::{Error, Result};
pub use ops::{HotkeyApi, KeySynth, LaunchTarget, ProcessHandle, ProcessOps, WinOps};
pub use store::CyclerStore;
pub use switch::{Outcome, Switcher};
