use std::{collections::HashSet, fmt};

use serde::{Deserialize, Serialize};

use crate::{Key, Modifier};

/// A key chord: a set of modifiers plus a single key.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Chord {
    /// Modifier keys held down for this chord.
    pub modifiers: HashSet<Modifier>,
    /// The non-modifier key for this chord.
    pub key: Key,
}

impl Chord {
    /// Parse a chord specification of the form "cmd+opt+t".
    ///
    /// Components are separated by `+`; the last component is the key and
    /// must be a single bindable character. Case-insensitive throughout.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts: Vec<&str> = s.split('+').collect();
        let key_raw = parts.pop()?.trim();
        let mut chars = key_raw.chars();
        let c = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        let key = Key::from_char(c)?;
        let mut modifiers = HashSet::new();
        for m in parts {
            modifiers.insert(Modifier::from_spec(m)?);
        }
        Some(Self { modifiers, key })
    }

    /// Build a chord from a key character and a list of modifier words.
    ///
    /// Unknown modifier words are ignored rather than rejected; an
    /// unresolvable key character yields `None`.
    pub fn from_parts(key: char, modifiers: &[String]) -> Option<Self> {
        let key = Key::from_char(key)?;
        let modifiers = modifiers
            .iter()
            .filter_map(|m| Modifier::from_spec(m))
            .collect();
        Some(Self { modifiers, key })
    }

    fn modifier_order(m: &Modifier) -> usize {
        match m {
            Modifier::Command => 0,
            Modifier::Option => 1,
            Modifier::Control => 2,
            Modifier::Shift => 3,
        }
    }

    /// Canonical string form: modifiers in fixed order, then the key.
    pub fn to_string_canonical(&self) -> String {
        let mut mods: Vec<Modifier> = self.modifiers.iter().copied().collect();
        mods.sort_by_key(Self::modifier_order);
        let mut out: Vec<String> = mods.iter().map(|m| m.to_spec().to_string()).collect();
        out.push(self.key.spec_char().to_string());
        out.join("+")
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_canonical())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic_chord() {
        let c = Chord::parse("cmd+opt+t").expect("parse");
        assert!(c.modifiers.contains(&Modifier::Command));
        assert!(c.modifiers.contains(&Modifier::Option));
        assert_eq!(c.key, Key::T);
        assert_eq!(c.to_string(), "cmd+opt+t");
    }

    #[test]
    fn canonical_order_is_stable() {
        let a = Chord::parse("shift+ctrl+opt+cmd+k").expect("parse");
        let b = Chord::parse("cmd+opt+ctrl+shift+k").expect("parse");
        assert_eq!(a.to_string(), b.to_string());
        assert_eq!(a.to_string(), "cmd+opt+ctrl+shift+k");
    }

    #[test]
    fn roundtrip_idempotent() {
        for s in ["cmd+t", "Command+Alt+5", "shift+b", "q"] {
            let c = Chord::parse(s).expect("parse");
            let c2 = Chord::parse(&c.to_string()).expect("reparse");
            assert_eq!(c, c2);
        }
    }

    #[test]
    fn rejects_unknown_key() {
        assert!(Chord::parse("cmd+!").is_none());
        assert!(Chord::parse("cmd+enter").is_none());
    }

    #[test]
    fn from_parts_ignores_unknown_modifiers() {
        let c = Chord::from_parts('t', &["command".into(), "hyper".into()]).expect("chord");
        assert_eq!(c.modifiers.len(), 1);
        assert!(c.modifiers.contains(&Modifier::Command));
    }

    #[test]
    fn from_parts_rejects_unknown_key() {
        assert!(Chord::from_parts('#', &[]).is_none());
    }
}
