//! keyspec: keycodes, modifiers, and chord specs for switchkey.
//!
//! - [`Key`]: the letter and digit keys a mapping may bind, carrying their
//!   macOS hardware keycodes (`repr(u16)`).
//! - [`Modifier`]: the four modifier keys a mapping may combine, with spec
//!   parsing (`cmd`/`command`, `opt`/`option`/`alt`, ...).
//! - [`Chord`]: a modifier set plus a single key, with a canonical string
//!   form ("cmd+opt+t") used as a registration identifier.
//!
//! The crate is platform-neutral; only the keycode values are macOS-specific.

mod chord;
mod key;
mod modifiers;

pub use chord::Chord;
pub use key::Key;
pub use modifiers::{Modifier, cg_flag_bits, modifiers_from_cg_flags};
