//! Mock implementations of the platform seams.
//!
//! These drive the engine's test suites without any OS interaction: the
//! process registry, window interface, input synthesizer, and hotkey
//! registration are all scripted in-memory. The binary never links them;
//! they are public so integration tests (and dependents' tests) can share
//! them.

use std::{
    collections::{HashMap, VecDeque},
    sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering},
};

use keyspec::Chord;
use parking_lot::Mutex;

use crate::{
    Error, Result,
    ops::{
        HotkeyApi, KeySynth, LaunchTarget, ProcessHandle, ProcessOps, WinOps, WindowId,
        WindowInfo, WindowQuery,
    },
};

/// Scripted process registry.
#[derive(Default)]
pub struct MockProcs {
    running: Mutex<Vec<ProcessHandle>>,
    activated: Mutex<Vec<i32>>,
    launched: Mutex<Vec<LaunchTarget>>,
    fail_activate: AtomicBool,
    fail_launch: AtomicBool,
}

impl MockProcs {
    /// New empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a running instance.
    pub fn add_running(&self, bundle_id: &str, pid: i32) {
        self.running.lock().push(ProcessHandle {
            pid,
            bundle_id: bundle_id.to_string(),
        });
    }

    /// Remove a running instance, simulating process exit.
    pub fn remove_running(&self, pid: i32) {
        self.running.lock().retain(|p| p.pid != pid);
    }

    /// Pids passed to `activate`, in order.
    pub fn activated(&self) -> Vec<i32> {
        self.activated.lock().clone()
    }

    /// Launch targets requested, in order.
    pub fn launched(&self) -> Vec<LaunchTarget> {
        self.launched.lock().clone()
    }

    /// Make `activate` fail.
    pub fn set_fail_activate(&self, v: bool) {
        self.fail_activate.store(v, Ordering::SeqCst);
    }

    /// Make `launch` fail.
    pub fn set_fail_launch(&self, v: bool) {
        self.fail_launch.store(v, Ordering::SeqCst);
    }
}

impl ProcessOps for MockProcs {
    fn running(&self, bundle_id: &str) -> Vec<ProcessHandle> {
        self.running
            .lock()
            .iter()
            .filter(|p| p.bundle_id == bundle_id)
            .cloned()
            .collect()
    }

    fn is_running(&self, pid: i32) -> bool {
        self.running.lock().iter().any(|p| p.pid == pid)
    }

    fn activate(&self, pid: i32) -> Result<()> {
        self.activated.lock().push(pid);
        if self.fail_activate.load(Ordering::SeqCst) {
            return Err(Error::ProcessGone { pid });
        }
        Ok(())
    }

    fn launch(&self, target: &LaunchTarget) -> Result<()> {
        self.launched.lock().push(target.clone());
        if self.fail_launch.load(Ordering::SeqCst) {
            return Err(Error::Launch("mock launch failure".into()));
        }
        Ok(())
    }
}

/// Scripted window interface.
///
/// Steady state is one [`WindowQuery`] returned on every call; one-shot
/// results pushed with [`MockWinOps::push_query_result`] are consumed first,
/// which is how tests script the empty-then-populated retry path.
#[derive(Default)]
pub struct MockWinOps {
    steady: Mutex<Option<WindowQuery>>,
    scripted: Mutex<VecDeque<WindowQuery>>,
    raised: Mutex<Vec<(i32, WindowId)>>,
    queries: AtomicUsize,
    fail_raise: AtomicBool,
}

impl MockWinOps {
    /// New mock with no windows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the steady-state window list (a `Full` query).
    pub fn set_windows(&self, windows: Vec<WindowInfo>) {
        *self.steady.lock() = Some(WindowQuery::Full(windows));
    }

    /// Set the steady-state query result verbatim.
    pub fn set_query(&self, query: WindowQuery) {
        *self.steady.lock() = Some(query);
    }

    /// Queue a one-shot query result, consumed before the steady state.
    pub fn push_query_result(&self, query: WindowQuery) {
        self.scripted.lock().push_back(query);
    }

    /// `(pid, id)` pairs raised so far, in order.
    pub fn raised(&self) -> Vec<(i32, WindowId)> {
        self.raised.lock().clone()
    }

    /// Total `query_windows` calls.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Make `raise_window` fail.
    pub fn set_fail_raise(&self, v: bool) {
        self.fail_raise.store(v, Ordering::SeqCst);
    }
}

impl WinOps for MockWinOps {
    fn query_windows(&self, _pid: i32) -> WindowQuery {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if let Some(q) = self.scripted.lock().pop_front() {
            return q;
        }
        self.steady.lock().clone().unwrap_or(WindowQuery::None)
    }

    fn raise_window(&self, pid: i32, id: WindowId) -> Result<()> {
        if self.fail_raise.load(Ordering::SeqCst) {
            return Err(Error::Platform {
                op: "raise_window",
                code: -25204,
            });
        }
        self.raised.lock().push((pid, id));
        Ok(())
    }
}

/// Counting input synthesizer. Each counter counts down+up pairs.
#[derive(Default)]
pub struct MockSynth {
    hides: AtomicUsize,
    new_windows: AtomicUsize,
}

impl MockSynth {
    /// New mock with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hide keystroke pairs emitted.
    pub fn hides(&self) -> usize {
        self.hides.load(Ordering::SeqCst)
    }

    /// New-window keystroke pairs emitted.
    pub fn new_windows(&self) -> usize {
        self.new_windows.load(Ordering::SeqCst)
    }
}

impl KeySynth for MockSynth {
    fn hide_frontmost(&self) -> Result<()> {
        self.hides.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn prompt_new_window(&self) -> Result<()> {
        self.new_windows.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// In-memory hotkey registration backend.
#[derive(Default)]
pub struct MockHotkeyApi {
    next_id: AtomicU32,
    registered: Mutex<HashMap<u32, Chord>>,
    unregistered: Mutex<Vec<u32>>,
}

impl MockHotkeyApi {
    /// New mock with no registrations.
    pub fn new() -> Self {
        Self {
            next_id: AtomicU32::new(1000),
            registered: Mutex::new(HashMap::new()),
            unregistered: Mutex::new(Vec::new()),
        }
    }

    /// Registration id for a canonical chord spec, if registered.
    pub fn id_for(&self, ident: &str) -> Option<u32> {
        self.registered
            .lock()
            .iter()
            .find(|(_, chord)| chord.to_string() == ident)
            .map(|(id, _)| *id)
    }

    /// Number of live registrations.
    pub fn registered_count(&self) -> usize {
        self.registered.lock().len()
    }

    /// Number of unregister calls seen.
    pub fn unregistered_count(&self) -> usize {
        self.unregistered.lock().len()
    }
}

impl HotkeyApi for MockHotkeyApi {
    fn intercept(&self, chord: Chord) -> u32 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.registered.lock().insert(id, chord);
        id
    }

    fn unregister(&self, id: u32) -> Result<()> {
        self.registered.lock().remove(&id);
        self.unregistered.lock().push(id);
        Ok(())
    }
}
