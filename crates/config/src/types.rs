use std::{collections::HashSet, fmt, path::PathBuf};

use keyspec::Chord;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Global settings section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Process-wide gate for hotkey handling; feeds the dispatcher's
    /// enabled flag.
    #[serde(default = "default_true")]
    pub quick_switch_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quick_switch_enabled: true,
        }
    }
}

/// A hotkey as written in the config: a single key character plus a list of
/// modifier words.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hotkey {
    /// The key character, e.g. "T".
    pub key: String,
    /// Modifier words, e.g. ["command", "option"].
    #[serde(default)]
    pub modifiers: Vec<String>,
}

impl Hotkey {
    /// Resolve this hotkey to a chord.
    ///
    /// `None` when the key is not exactly one bindable character; such
    /// mappings are skipped at registration, not treated as errors. Unknown
    /// modifier words are ignored.
    pub fn chord(&self) -> Option<Chord> {
        let mut chars = self.key.chars();
        let c = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        Chord::from_parts(c, &self.modifiers)
    }
}

/// What a repeated hotkey press does to an already-running application's
/// windows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleMethod {
    /// Hide the frontmost application via a synthetic keystroke.
    Minimize,
    /// Cycle to the next non-minimized window.
    Next,
    /// Alias of `Next`; kept distinct on the wire.
    Stack,
    /// Bring all windows forward without reordering.
    Activate,
    /// Run a user command through the shell.
    Script(String),
}

impl CycleMethod {
    /// Parse a cycle method string.
    ///
    /// Unrecognized values fall back to `Activate` so an edited config can
    /// never break activation.
    pub fn from_str_lossy(s: &str) -> Self {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "minimize" => Self::Minimize,
            "next" => Self::Next,
            "stack" => Self::Stack,
            "activate" => Self::Activate,
            _ => {
                if let Some(cmd) = s.trim().strip_prefix("script:") {
                    Self::Script(cmd.trim().to_string())
                } else {
                    Self::Activate
                }
            }
        }
    }
}

impl Default for CycleMethod {
    fn default() -> Self {
        Self::Next
    }
}

impl fmt::Display for CycleMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Minimize => write!(f, "minimize"),
            Self::Next => write!(f, "next"),
            Self::Stack => write!(f, "stack"),
            Self::Activate => write!(f, "activate"),
            Self::Script(cmd) => write!(f, "script:{}", cmd),
        }
    }
}

impl Serialize for CycleMethod {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for CycleMethod {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_str_lossy(&s))
    }
}

/// Per-mapping window behavior.
///
/// Only `cycle_method` drives core behavior; the three flags are preserved
/// as pass-through configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowBehavior {
    /// Policy for an already-running target with visible windows.
    #[serde(default)]
    pub cycle_method: CycleMethod,
    /// Advisory: restore the previous window layout.
    #[serde(default)]
    pub restore_layout: bool,
    /// Advisory: cycle only among windows in the current space.
    #[serde(default)]
    pub group_by_spaces: bool,
    /// Advisory: follow focus across spaces.
    #[serde(default)]
    pub follow_focus: bool,
}

/// One configured association between a hotkey, a target application, and
/// its window-cycling policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mapping {
    /// Human-readable application name, used only in logs.
    pub app_name: String,
    /// Target bundle identifier; must be non-empty.
    #[serde(rename = "bundleID")]
    pub bundle_id: String,
    /// Disabled mappings are kept in the config but never registered.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// The hotkey that triggers this mapping.
    pub hotkey: Hotkey,
    /// Optional explicit launch path overriding the bundle lookup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_launch_path: Option<PathBuf>,
    /// Window-cycling policy and advisory flags.
    #[serde(default)]
    pub window_behavior: WindowBehavior,
}

/// The full configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Global settings.
    #[serde(default)]
    pub settings: Settings,
    /// Ordered mapping list; wire key is `apps`.
    #[serde(default, rename = "apps")]
    pub mappings: Vec<Mapping>,
}

impl Config {
    /// The built-in fallback configuration: two safe example mappings and
    /// quick-switch enabled.
    pub fn builtin_default() -> Self {
        let behavior = WindowBehavior {
            cycle_method: CycleMethod::Next,
            restore_layout: true,
            group_by_spaces: true,
            follow_focus: true,
        };
        Self {
            settings: Settings {
                quick_switch_enabled: true,
            },
            mappings: vec![
                Mapping {
                    app_name: "Terminal".into(),
                    bundle_id: "com.apple.Terminal".into(),
                    enabled: true,
                    hotkey: Hotkey {
                        key: "T".into(),
                        modifiers: vec!["command".into(), "option".into()],
                    },
                    custom_launch_path: None,
                    window_behavior: behavior.clone(),
                },
                Mapping {
                    app_name: "Browser".into(),
                    bundle_id: "com.apple.Safari".into(),
                    enabled: true,
                    hotkey: Hotkey {
                        key: "B".into(),
                        modifiers: vec!["command".into(), "option".into()],
                    },
                    custom_launch_path: None,
                    window_behavior: behavior,
                },
            ],
        }
    }

    /// Enforce the mapping invariants after a load.
    ///
    /// Mappings with an empty bundle identifier are dropped. Duplicate
    /// hotkeys keep the first mapping; later ones are disabled. Both cases
    /// are logged.
    pub fn normalized(mut self) -> Self {
        self.mappings.retain(|m| {
            if m.bundle_id.is_empty() {
                warn!(app = %m.app_name, "dropping mapping with empty bundle identifier");
                false
            } else {
                true
            }
        });
        let mut seen: HashSet<String> = HashSet::new();
        for m in &mut self.mappings {
            if !m.enabled {
                continue;
            }
            if let Some(chord) = m.hotkey.chord() {
                let ident = chord.to_string();
                if !seen.insert(ident.clone()) {
                    warn!(
                        app = %m.app_name,
                        hotkey = %ident,
                        "duplicate hotkey; keeping the first mapping and disabling this one"
                    );
                    m.enabled = false;
                }
            }
        }
        self
    }
}

pub(crate) fn default_true() -> bool {
    true
}
