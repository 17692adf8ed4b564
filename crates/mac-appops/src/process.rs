//! Process registry and activation over AppKit's `NSRunningApplication`.
//!
//! Launching goes through `/usr/bin/open`, which resolves bundles via
//! LaunchServices and returns immediately; the engine re-queries the
//! registry on the next press rather than waiting for the launch.

use objc2_app_kit::{NSApplicationActivationOptions, NSRunningApplication};
use objc2_foundation::NSString;
use switchkey_engine::{Error, LaunchTarget, ProcessHandle, ProcessOps, Result};
use tokio::process::Command;
use tracing::{debug, warn};

/// AppKit-backed [`ProcessOps`].
#[derive(Default)]
pub struct SystemProcs;

impl SystemProcs {
    /// New registry handle. Stateless; every call queries AppKit afresh.
    pub fn new() -> Self {
        Self
    }
}

impl ProcessOps for SystemProcs {
    fn running(&self, bundle_id: &str) -> Vec<ProcessHandle> {
        let ident = NSString::from_str(bundle_id);
        // SAFETY: Objective-C calls are performed with typed wrappers.
        let apps = unsafe { NSRunningApplication::runningApplicationsWithBundleIdentifier(&ident) };
        apps.iter()
            .map(|app| ProcessHandle {
                pid: unsafe { app.processIdentifier() },
                bundle_id: bundle_id.to_string(),
            })
            .collect()
    }

    fn is_running(&self, pid: i32) -> bool {
        let app = unsafe {
            NSRunningApplication::runningApplicationWithProcessIdentifier(pid as libc::pid_t)
        };
        app.is_some_and(|app| !unsafe { app.isTerminated() })
    }

    fn activate(&self, pid: i32) -> Result<()> {
        let app = unsafe {
            NSRunningApplication::runningApplicationWithProcessIdentifier(pid as libc::pid_t)
        };
        let Some(app) = app else {
            return Err(Error::ProcessGone { pid });
        };
        let ok =
            unsafe { app.activateWithOptions(NSApplicationActivationOptions::ActivateAllWindows) };
        if !ok {
            // Activation can be refused when another app holds focus
            // exclusively; report it so the caller can log and move on.
            warn!(pid, "activate_with_options_refused");
            return Err(Error::Platform {
                op: "activateWithOptions",
                code: 0,
            });
        }
        debug!(pid, "activated_all_windows");
        Ok(())
    }

    fn launch(&self, target: &LaunchTarget) -> Result<()> {
        let mut cmd = Command::new("/usr/bin/open");
        match target {
            LaunchTarget::Bundle(bundle_id) => {
                cmd.arg("-b").arg(bundle_id);
            }
            LaunchTarget::Path(path) => {
                cmd.arg(path);
            }
        }
        // No waiting on the dispatch path; the exit status is observed
        // and logged on its own task.
        let mut child = cmd
            .spawn()
            .map_err(|e| Error::Launch(format!("spawning open: {e}")))?;
        let target = target.clone();
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) if !status.success() => {
                    warn!(?target, %status, "open exited with failure")
                }
                Ok(_) => debug!(?target, "launch_requested"),
                Err(e) => warn!(?target, error = %e, "open wait failed"),
            }
        });
        Ok(())
    }
}
