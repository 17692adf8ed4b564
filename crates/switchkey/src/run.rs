//! The long-running service: wires the event tap to the engine and keeps
//! registrations in sync with the config file.
//!
//! Layout of the async side:
//! - a std thread bridges the tap's crossbeam channel into tokio;
//! - every hotkey press is handled on its own task, so a slow switch
//!   (launch delays, retry sleeps) never blocks other hotkeys;
//! - config reloads and SIGUSR1 toggles are serviced on the main select
//!   loop.

use std::{sync::Arc, thread};

use config::Store;
use mac_appops::{Manager, SystemProcs, SystemSynth, SystemWinOps, accessibility_ok, input_monitoring_ok};
use switchkey_engine::{Dispatcher, Error, Result, Switcher};
use tokio::{
    signal::unix::{SignalKind, signal},
    sync::mpsc,
};
use tracing::{debug, info, warn};

fn signal_stream(kind: SignalKind) -> Result<tokio::signal::unix::Signal> {
    signal(kind).map_err(|e| Error::Platform {
        op: "signal handler",
        code: e.raw_os_error().unwrap_or(-1),
    })
}

/// Run the service until SIGINT or SIGTERM.
pub async fn run(store: Store) -> Result<()> {
    // Warn early; the tap start below is the hard failure point.
    if !accessibility_ok() {
        warn!("Accessibility permission missing: window cycling and keystrokes will fail");
    }
    if !input_monitoring_ok() {
        warn!("Input Monitoring permission missing: the hotkey tap cannot start");
    }

    let cfg = store.load();

    let manager = Arc::new(Manager::new());
    manager.start()?;
    let events = manager.events();

    let switcher = Arc::new(Switcher::new(
        Arc::new(SystemProcs::new()),
        Arc::new(SystemWinOps::new()),
        Arc::new(SystemSynth::new()),
    ));
    let dispatcher = Arc::new(Dispatcher::new(
        manager.clone(),
        switcher,
        cfg.settings.quick_switch_enabled,
    ));
    let registered = dispatcher.register_all(&cfg.mappings);
    info!(
        config = %store.path().display(),
        registered,
        enabled = dispatcher.is_enabled(),
        "switchkey started"
    );

    // Reloads come in on the notify thread; hand the parsed config to the
    // select loop rather than re-registering from a foreign thread.
    let (reload_tx, mut reload_rx) = mpsc::unbounded_channel();
    let watcher = match store.watch(move |cfg| {
        let _ = reload_tx.send(cfg);
    }) {
        Ok(w) => Some(w),
        Err(e) => {
            warn!(error = %e, "config watcher unavailable; live reload disabled");
            None
        }
    };

    // Bridge tap events from crossbeam into tokio.
    let (ev_tx, mut ev_rx) = mpsc::unbounded_channel();
    thread::spawn(move || {
        while let Ok(ev) = events.recv() {
            if ev_tx.send(ev).is_err() {
                break;
            }
        }
    });

    let mut sigint = signal_stream(SignalKind::interrupt())?;
    let mut sigterm = signal_stream(SignalKind::terminate())?;
    let mut sigusr1 = signal_stream(SignalKind::user_defined1())?;

    loop {
        tokio::select! {
            Some(ev) = ev_rx.recv() => {
                let dispatcher = dispatcher.clone();
                tokio::spawn(async move {
                    if let Some(outcome) = dispatcher.dispatch(ev.id, ev.kind, ev.repeat).await {
                        debug!(id = ev.id, ?outcome, "switch handled");
                    }
                });
            }
            Some(cfg) = reload_rx.recv() => {
                let registered = dispatcher.register_all(&cfg.mappings);
                dispatcher.set_enabled(cfg.settings.quick_switch_enabled);
                info!(
                    registered,
                    enabled = dispatcher.is_enabled(),
                    "configuration reloaded"
                );
            }
            _ = sigusr1.recv() => {
                let enabled = !dispatcher.is_enabled();
                dispatcher.set_enabled(enabled);
                info!(enabled, "quick switch toggled via SIGUSR1");
            }
            _ = sigint.recv() => break,
            _ = sigterm.recv() => break,
        }
    }

    drop(watcher);
    manager.stop();
    info!("switchkey stopped");
    Ok(())
}
