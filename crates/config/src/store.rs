use std::{
    ffi::{OsStr, OsString},
    fs,
    path::{Path, PathBuf},
};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, warn};

use crate::{Config, Error, Result};

/// Owns the on-disk configuration document.
///
/// Cheap to clone; clones share the same path.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    /// Create a store over an explicit path, or the default per-user path.
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path: path.unwrap_or_else(Self::default_path),
        }
    }

    /// The default per-user config path: `~/.config/switchkey/config.toml`.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("switchkey")
            .join("config.toml")
    }

    /// The path this store reads from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the configuration, substituting the built-in default on any
    /// failure. Never fails; the error is logged and masked.
    pub fn load(&self) -> Config {
        match self.load_strict() {
            Ok(cfg) => {
                let cfg = cfg.normalized();
                debug!(
                    path = %self.path.display(),
                    mappings = cfg.mappings.len(),
                    "loaded configuration"
                );
                cfg
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "config load failed; using built-in defaults"
                );
                Config::builtin_default()
            }
        }
    }

    /// Load the configuration, surfacing read and parse errors.
    pub fn load_strict(&self) -> Result<Config> {
        let raw = fs::read_to_string(&self.path).map_err(|source| Error::Read {
            path: self.path.clone(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| Error::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Watch the config file for writes, reloading on every event.
    ///
    /// The parent directory is watched so editors that replace the file
    /// atomically still trigger a reload, and events are matched by file
    /// name because the OS reports canonicalized paths that need not equal
    /// the configured one (symlinked or relative paths). Every create or
    /// modify event on our file re-runs [`Store::load`] and hands the
    /// result to `on_change`; callers must treat reloads as idempotent.
    /// Dropping the returned guard stops the watcher.
    pub fn watch<F>(&self, on_change: F) -> Result<ConfigWatcher>
    where
        F: Fn(Config) + Send + 'static,
    {
        let store = self.clone();
        let file = self.path.clone();
        let name: OsString = self
            .path
            .file_name()
            .map(OsStr::to_os_string)
            .unwrap_or_default();
        let mut watcher: RecommendedWatcher =
            notify::recommended_watcher(move |res: notify::Result<notify::Event>| match res {
                Ok(event) => {
                    if event_touches(&event, &name) {
                        debug!(path = %file.display(), "config changed; reloading");
                        on_change(store.load());
                    }
                }
                Err(e) => warn!(error = %e, "config watcher error"),
            })
            .map_err(|source| Error::Watch {
                path: self.path.clone(),
                source,
            })?;

        let dir = self
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|source| Error::Watch {
                path: dir.clone(),
                source,
            })?;
        Ok(ConfigWatcher { _watcher: watcher })
    }
}

/// Whether a watcher event is a create or modify touching the named file.
fn event_touches(event: &notify::Event, file_name: &OsStr) -> bool {
    (event.kind.is_modify() || event.kind.is_create())
        && event.paths.iter().any(|p| p.file_name() == Some(file_name))
}

/// Keeps the config file watcher alive; drop to stop watching.
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;
    use crate::CycleMethod;

    fn store_with(content: &str) -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        let mut f = fs::File::create(&path).expect("create");
        f.write_all(content.as_bytes()).expect("write");
        (dir, Store::new(Some(path)))
    }

    #[test]
    fn malformed_file_yields_default() {
        let (_dir, store) = store_with("this is { not toml");
        let cfg = store.load();
        assert_eq!(cfg.mappings.len(), 2);
        assert!(cfg.settings.quick_switch_enabled);
        assert_eq!(cfg.mappings[0].app_name, "Terminal");
        assert_eq!(cfg.mappings[1].app_name, "Browser");
    }

    #[test]
    fn missing_file_yields_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Store::new(Some(dir.path().join("absent.toml")));
        let cfg = store.load();
        assert_eq!(cfg.mappings.len(), 2);
    }

    #[test]
    fn strict_load_surfaces_parse_error() {
        let (_dir, store) = store_with("settings = 3");
        assert!(matches!(store.load_strict(), Err(Error::Parse { .. })));
    }

    #[test]
    fn watch_events_match_on_file_name_not_exact_path() {
        use notify::event::{CreateKind, DataChange, EventKind, ModifyKind};

        let name = OsStr::new("config.toml");
        // The OS reports the canonical path even when the store was given
        // a symlinked or relative one.
        let modify = notify::Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content)))
            .add_path(PathBuf::from("/private/tmp/switchkey/config.toml"));
        assert!(event_touches(&modify, name));

        let create = notify::Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/private/tmp/switchkey/config.toml"));
        assert!(event_touches(&create, name));

        // Sibling files and non-write events stay ignored.
        let sibling = notify::Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content)))
            .add_path(PathBuf::from("/private/tmp/switchkey/other.toml"));
        assert!(!event_touches(&sibling, name));

        let access = notify::Event::new(EventKind::Access(notify::event::AccessKind::Read))
            .add_path(PathBuf::from("/private/tmp/switchkey/config.toml"));
        assert!(!event_touches(&access, name));
    }

    #[test]
    fn valid_file_loads() {
        let (_dir, store) = store_with(
            r#"
            [[apps]]
            appName = "Editor"
            bundleID = "com.example.editor"
            [apps.hotkey]
            key = "e"
            modifiers = ["cmd"]
            [apps.windowBehavior]
            cycleMethod = "stack"
            "#,
        );
        let cfg = store.load();
        assert_eq!(cfg.mappings.len(), 1);
        assert_eq!(
            cfg.mappings[0].window_behavior.cycle_method,
            CycleMethod::Stack
        );
        // Settings table absent: defaults apply.
        assert!(cfg.settings.quick_switch_enabled);
    }
}
