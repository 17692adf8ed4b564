use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Modifier keys a hotkey mapping may combine.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Modifier {
    Command,
    Option,
    Control,
    Shift,
}

impl Modifier {
    /// Parse a modifier specification word.
    ///
    /// Case-insensitive; accepts the common alias forms (cmd, opt, alt,
    /// ctrl). Returns `None` for unknown words.
    pub fn from_spec(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "command" | "cmd" => Some(Self::Command),
            "option" | "opt" | "alt" => Some(Self::Option),
            "control" | "ctrl" => Some(Self::Control),
            "shift" => Some(Self::Shift),
            _ => None,
        }
    }

    /// Canonical short spec form, always lowercased.
    pub fn to_spec(self) -> &'static str {
        match self {
            Self::Command => "cmd",
            Self::Option => "opt",
            Self::Control => "ctrl",
            Self::Shift => "shift",
        }
    }
}

// CGEventFlags primary matching bits.
const FLAG_SHIFT: u64 = 1 << 17;
const FLAG_CONTROL: u64 = 1 << 18;
const FLAG_OPTION: u64 = 1 << 19;
const FLAG_COMMAND: u64 = 1 << 20;

/// Construct a modifier set from macOS CGEventFlags bits.
pub fn modifiers_from_cg_flags(flags: u64) -> HashSet<Modifier> {
    let mut set = HashSet::new();
    if flags & FLAG_SHIFT != 0 {
        set.insert(Modifier::Shift);
    }
    if flags & FLAG_CONTROL != 0 {
        set.insert(Modifier::Control);
    }
    if flags & FLAG_OPTION != 0 {
        set.insert(Modifier::Option);
    }
    if flags & FLAG_COMMAND != 0 {
        set.insert(Modifier::Command);
    }
    set
}

/// Convert a modifier set to its CGEventFlags bits.
pub fn cg_flag_bits(mods: &HashSet<Modifier>) -> u64 {
    let mut bits = 0;
    if mods.contains(&Modifier::Shift) {
        bits |= FLAG_SHIFT;
    }
    if mods.contains(&Modifier::Control) {
        bits |= FLAG_CONTROL;
    }
    if mods.contains(&Modifier::Option) {
        bits |= FLAG_OPTION;
    }
    if mods.contains(&Modifier::Command) {
        bits |= FLAG_COMMAND;
    }
    bits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_aliases() {
        assert_eq!(Modifier::from_spec("Command"), Some(Modifier::Command));
        assert_eq!(Modifier::from_spec("cmd"), Some(Modifier::Command));
        assert_eq!(Modifier::from_spec("alt"), Some(Modifier::Option));
        assert_eq!(Modifier::from_spec("CTRL"), Some(Modifier::Control));
        assert_eq!(Modifier::from_spec("hyper"), None);
    }

    #[test]
    fn cg_flags_roundtrip() {
        let mods: HashSet<Modifier> = [Modifier::Command, Modifier::Option].into_iter().collect();
        let bits = cg_flag_bits(&mods);
        assert_eq!(modifiers_from_cg_flags(bits), mods);
    }

    #[test]
    fn cg_flags_ignore_unrelated_bits() {
        // Caps lock and fn bits must not produce modifiers.
        let set = modifiers_from_cg_flags((1 << 16) | (1 << 23));
        assert!(set.is_empty());
    }
}
