//! Global hotkey interception over a CoreGraphics event tap.
//!
//! The tap sits at the HID location with head insertion, listening to
//! KeyDown and KeyUp. Events matching a registered chord are swallowed by
//! returning `CallbackResult::Drop` (which maps to a NULL event at the C
//! boundary, the only thing CoreGraphics treats as suppression) and
//! forwarded as [`Event`]s over a channel. Everything else passes through
//! untouched. Key-ups of registered chords are swallowed too so the
//! focused application never sees half a keystroke.

use std::{
    collections::HashMap,
    ffi::c_void,
    process,
    sync::{
        Arc,
        atomic::{AtomicPtr, AtomicU32, Ordering},
    },
    thread,
};

use core_foundation::{
    base::TCFType,
    mach_port::CFMachPortRef,
    runloop::{CFRunLoop, kCFRunLoopCommonModes},
};
use core_graphics::event::{self as cge, CallbackResult};
use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use keyspec::{Chord, Key, modifiers_from_cg_flags};
use parking_lot::Mutex;
use switchkey_engine::{Error, EventKind, HotkeyApi, Result};
use tracing::{debug, trace, warn};

use crate::permissions;

#[link(name = "CoreGraphics", kind = "framework")]
unsafe extern "C" {
    fn CGEventTapEnable(tap: CFMachPortRef, enable: bool);
}

// Minimal subset of CGEventField constants used by the callback.
const FIELD_EVENT_SOURCE_UNIX_PROCESS_ID: u32 = 41;
const FIELD_KEYBOARD_EVENT_AUTOREPEAT: u32 = 8;
const FIELD_KEYBOARD_EVENT_KEYCODE: u32 = 9;

/// A registered chord fired at the tap.
#[derive(Clone, Debug)]
pub struct Event {
    /// Registration id the chord matched.
    pub id: u32,
    /// Press or release.
    pub kind: EventKind,
    /// Whether this is an OS auto-repeat of a held key.
    pub repeat: bool,
}

// State shared with the tap callback thread.
struct Shared {
    regs: Mutex<HashMap<u32, Chord>>,
    tx: Sender<Event>,
}

impl Shared {
    fn matching_id(&self, key: Key, flags: u64) -> Option<u32> {
        let mods = modifiers_from_cg_flags(flags);
        self.regs
            .lock()
            .iter()
            .find(|(_, chord)| chord.key == key && chord.modifiers == mods)
            .map(|(id, _)| *id)
    }
}

// Handle for stopping the tap's run loop from another thread.
struct Control {
    rl: Mutex<Option<CFRunLoop>>,
}

impl Control {
    fn set_rl(&self, rl: CFRunLoop) {
        *self.rl.lock() = Some(rl);
    }

    fn stop(&self) {
        if let Some(rl) = self.rl.lock().take() {
            rl.stop();
        }
    }
}

/// Owns the event tap thread and the registration table.
pub struct Manager {
    shared: Arc<Shared>,
    ctrl: Arc<Control>,
    rx: Receiver<Event>,
    next_id: AtomicU32,
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}

impl Manager {
    /// New manager with no registrations and no running tap.
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            shared: Arc::new(Shared {
                regs: Mutex::new(HashMap::new()),
                tx,
            }),
            ctrl: Arc::new(Control {
                rl: Mutex::new(None),
            }),
            rx,
            next_id: AtomicU32::new(1),
        }
    }

    /// Receiver for fired events. Clonable; all clones see every event.
    pub fn events(&self) -> Receiver<Event> {
        self.rx.clone()
    }

    /// Start the tap on a dedicated thread and block until it is live.
    ///
    /// Fails fast when Input Monitoring is missing or the OS refuses the
    /// tap (typically the same permission under a different guise).
    pub fn start(&self) -> Result<()> {
        let (ready_tx, ready_rx) = bounded(1);
        let shared = self.shared.clone();
        let ctrl = self.ctrl.clone();
        thread::Builder::new()
            .name("hotkey-tap".into())
            .spawn(move || {
                if let Err(e) = run_event_loop(shared, ready_tx, ctrl) {
                    warn!(error = %e, "event tap thread exited with error");
                }
            })
            .map_err(|_| Error::Platform {
                op: "spawn tap thread",
                code: -1,
            })?;
        ready_rx.recv().map_err(|_| Error::ChannelClosed)?
    }

    /// Stop the tap thread's run loop.
    pub fn stop(&self) {
        self.ctrl.stop();
    }
}

impl Drop for Manager {
    fn drop(&mut self) {
        self.stop();
    }
}

impl HotkeyApi for Manager {
    fn intercept(&self, chord: Chord) -> u32 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        debug!(id, chord = %chord, "hotkey registered");
        self.shared.regs.lock().insert(id, chord);
        id
    }

    fn unregister(&self, id: u32) -> Result<()> {
        self.shared.regs.lock().remove(&id);
        Ok(())
    }
}

fn run_event_loop(
    shared: Arc<Shared>,
    ready: Sender<Result<()>>,
    ctrl: Arc<Control>,
) -> Result<()> {
    if !permissions::input_monitoring_ok() {
        warn!("input_monitoring_permission_missing");
        let _ = ready.send(Err(Error::PermissionDenied("Input Monitoring")));
        return Err(Error::PermissionDenied("Input Monitoring"));
    }

    // Shared so the callback can re-enable the tap after an OS timeout.
    let tap_port_ptr: Arc<AtomicPtr<c_void>> = Arc::new(AtomicPtr::new(std::ptr::null_mut()));

    debug!("creating_event_tap");
    let tap_port_ptr_cb = tap_port_ptr.clone();
    let tap = match cge::CGEventTap::new(
        cge::CGEventTapLocation::HID,
        cge::CGEventTapPlacement::HeadInsertEventTap,
        cge::CGEventTapOptions::Default,
        vec![cge::CGEventType::KeyDown, cge::CGEventType::KeyUp],
        move |_proxy, etype, event| {
            match etype {
                cge::CGEventType::KeyDown | cge::CGEventType::KeyUp => {
                    // Events we posted ourselves carry our own pid.
                    let src_pid =
                        event.get_integer_value_field(FIELD_EVENT_SOURCE_UNIX_PROCESS_ID) as u32;
                    if src_pid == process::id() {
                        trace!(src_pid, "ignoring_synthetic_event");
                        return CallbackResult::Keep;
                    }

                    let keycode =
                        event.get_integer_value_field(FIELD_KEYBOARD_EVENT_KEYCODE) as u16;
                    let Some(key) = Key::from_scancode(keycode) else {
                        return CallbackResult::Keep;
                    };
                    let Some(id) = shared.matching_id(key, event.get_flags().bits()) else {
                        return CallbackResult::Keep;
                    };

                    let kind = if matches!(etype, cge::CGEventType::KeyDown) {
                        EventKind::KeyDown
                    } else {
                        EventKind::KeyUp
                    };
                    let repeat = kind == EventKind::KeyDown
                        && event.get_integer_value_field(FIELD_KEYBOARD_EVENT_AUTOREPEAT) != 0;
                    trace!(id, scancode = keycode, ?kind, repeat, "intercepting_event");
                    let _ = shared.tx.send(Event { id, kind, repeat });
                    CallbackResult::Drop
                }
                cge::CGEventType::TapDisabledByTimeout
                | cge::CGEventType::TapDisabledByUserInput => {
                    let p = tap_port_ptr_cb.load(Ordering::SeqCst) as CFMachPortRef;
                    if !p.is_null() {
                        warn!("tap_disabled_by_os_reenabling");
                        unsafe { CGEventTapEnable(p, true) };
                    }
                    CallbackResult::Keep
                }
                _ => CallbackResult::Keep,
            }
        },
    ) {
        Ok(t) => t,
        Err(_) => {
            warn!("event_tap_create_failed");
            let _ = ready.send(Err(Error::Platform {
                op: "CGEventTapCreate",
                code: -1,
            }));
            return Err(Error::Platform {
                op: "CGEventTapCreate",
                code: -1,
            });
        }
    };

    tap_port_ptr.store(
        tap.mach_port().as_concrete_TypeRef() as *mut c_void,
        Ordering::SeqCst,
    );

    let source = match tap.mach_port().create_runloop_source(0) {
        Ok(s) => s,
        Err(_) => {
            warn!("run_loop_source_create_failed");
            let _ = ready.send(Err(Error::Platform {
                op: "create_runloop_source",
                code: -1,
            }));
            return Err(Error::Platform {
                op: "create_runloop_source",
                code: -1,
            });
        }
    };

    let rl = CFRunLoop::get_current();
    ctrl.set_rl(rl.clone());
    let mode = unsafe { kCFRunLoopCommonModes };
    rl.add_source(&source, mode);

    tap.enable();

    let _ = ready.send(Ok(()));
    debug!("event_tap_started_run_loop");

    CFRunLoop::run_current();

    debug!("event_tap_exited");
    Ok(())
}
