use std::{sync::Arc, time::Duration};

use config::{CycleMethod, Mapping};
use tracing::{debug, info, warn};

use crate::{
    ops::{KeySynth, LaunchTarget, ProcessOps, WinOps},
    store::CyclerStore,
};

/// Delay between activating a windowless process and prompting it to create
/// a window; the app needs time to become active first.
pub(crate) const NEW_WINDOW_DELAY: Duration = Duration::from_millis(300);

/// What a single activation resolved to. Exactly one per call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Target was not running; a launch was requested.
    Launched,
    /// Target was running without visible windows; it was activated and the
    /// new-window keystroke was synthesized.
    PromptedNewWindow,
    /// The per-process cycler advanced and raised a window.
    Cycled,
    /// The hide keystroke was synthesized.
    Minimized,
    /// The process was brought forward without reordering windows.
    Activated,
    /// A script cycle method spawned its command.
    ScriptSpawned,
}

/// The decision engine.
///
/// Owns the cycler store and consults the platform seams for everything
/// else. Nothing here returns an error: platform failures are logged and
/// degraded to the documented fallbacks.
pub struct Switcher {
    procs: Arc<dyn ProcessOps>,
    win: Arc<dyn WinOps>,
    synth: Arc<dyn KeySynth>,
    cyclers: CyclerStore,
}

impl Switcher {
    /// Build a switcher over the given platform backends.
    pub fn new(procs: Arc<dyn ProcessOps>, win: Arc<dyn WinOps>, synth: Arc<dyn KeySynth>) -> Self {
        Self {
            procs,
            win,
            synth,
            cyclers: CyclerStore::new(),
        }
    }

    /// The per-process cycler store.
    pub fn cyclers(&self) -> &CyclerStore {
        &self.cyclers
    }

    /// Run the switch decision for one hotkey press.
    ///
    /// Resolves the target's run state and performs exactly one of: launch,
    /// activate plus new-window prompt, cycle advance, minimize keystroke,
    /// plain activation, or script spawn.
    pub async fn activate(&self, mapping: &Mapping) -> Outcome {
        debug!(app = %mapping.app_name, bundle = %mapping.bundle_id, "switching");
        self.cyclers.evict_dead(&*self.procs);

        let instances = self.procs.running(&mapping.bundle_id);
        let Some(target) = instances.first() else {
            info!(app = %mapping.app_name, "not running; launching");
            self.launch(mapping);
            return Outcome::Launched;
        };
        let pid = target.pid;

        let visible = self.win.query_windows(pid).visible();
        if visible.is_empty() {
            info!(app = %mapping.app_name, pid, "running without windows; prompting a new one");
            if let Err(e) = self.procs.activate(pid) {
                debug!(pid, error = %e, "activation failed");
            }
            tokio::time::sleep(NEW_WINDOW_DELAY).await;
            if let Err(e) = self.synth.prompt_new_window() {
                warn!(pid, error = %e, "new-window keystroke failed");
            }
            return Outcome::PromptedNewWindow;
        }

        match &mapping.window_behavior.cycle_method {
            CycleMethod::Minimize => {
                // Lands on whichever app is frontmost when the keystroke
                // arrives, not necessarily the target.
                if let Err(e) = self.synth.hide_frontmost() {
                    warn!(pid, error = %e, "hide keystroke failed");
                }
                Outcome::Minimized
            }
            CycleMethod::Next | CycleMethod::Stack => {
                let cycler = self.cyclers.entry(pid);
                let mut cycler = cycler.lock().await;
                cycler.cycle_to_next(&*self.procs, &*self.win).await;
                Outcome::Cycled
            }
            CycleMethod::Script(command) => {
                self.spawn_script(command);
                Outcome::ScriptSpawned
            }
            CycleMethod::Activate => {
                if let Err(e) = self.procs.activate(pid) {
                    warn!(pid, error = %e, "activation failed");
                }
                Outcome::Activated
            }
        }
    }

    /// Request an asynchronous launch; failure is logged and ignored.
    fn launch(&self, mapping: &Mapping) {
        let target = match &mapping.custom_launch_path {
            Some(path) if !path.as_os_str().is_empty() => LaunchTarget::Path(path.clone()),
            _ => LaunchTarget::Bundle(mapping.bundle_id.clone()),
        };
        if let Err(e) = self.procs.launch(&target) {
            warn!(app = %mapping.app_name, error = %e, "launch failed");
        }
    }

    /// Run a script cycle method through the shell, best-effort.
    fn spawn_script(&self, command: &str) {
        match tokio::process::Command::new("/bin/sh")
            .arg("-c")
            .arg(command)
            .spawn()
        {
            Ok(mut child) => {
                let command = command.to_string();
                tokio::spawn(async move {
                    match child.wait().await {
                        Ok(status) if !status.success() => {
                            warn!(%command, %status, "script exited with failure")
                        }
                        Ok(_) => {}
                        Err(e) => warn!(%command, error = %e, "script wait failed"),
                    }
                });
            }
            Err(e) => warn!(%command, error = %e, "script spawn failed"),
        }
    }
}
