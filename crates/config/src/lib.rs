//! Configuration for switchkey: the mapping table and its store.
//!
//! The [`Store`] owns the on-disk TOML document, loads it with a built-in
//! default fallback (a parse failure is never fatal), and watches it for
//! writes so the caller can re-register hotkeys on every reload.
//!
//! Types mirror the wire format: camelCase keys, an `[settings]` table with
//! `quickSwitchEnabled`, and an ordered `[[apps]]` list of mappings.

mod error;
mod store;
mod types;

pub use error::{Error, Result};
pub use store::{ConfigWatcher, Store};
pub use types::{Config, CycleMethod, Hotkey, Mapping, Settings, WindowBehavior};
