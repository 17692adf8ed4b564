//! Window enumeration and the raise action over the accessibility interface.
//!
//! Enumeration walks the ordered fallback chain: the `AXWindows` list,
//! then (when the list is missing or empty) the single `AXMainWindow`
//! attribute, then nothing. Window ids come
//! from `AXWindowNumber` with the list index standing in when the private
//! attribute is withheld; raising re-resolves the element from `(pid, id)`
//! at action time, so stale handles are never held across the fixed delays.

use std::ffi::c_void;

use core_foundation::{array::CFArray, base::TCFType};
use switchkey_engine::{Error, Result, WinOps, ops::{WindowId, WindowInfo, WindowQuery}};
use tracing::{debug, trace, warn};

use crate::ax;

const AX_ERR_CANNOT_COMPLETE: i32 = -25204;

/// Accessibility-backed [`WinOps`].
#[derive(Default)]
pub struct SystemWinOps;

impl SystemWinOps {
    /// New window interface. Stateless; elements are resolved per call.
    pub fn new() -> Self {
        Self
    }
}

/// Walk a process's `AXWindows` array into [`WindowInfo`] records.
///
/// Returns `None` when the attribute itself is unavailable, as opposed to
/// present-but-empty.
fn list_windows(app: &ax::AXElem, pid: i32) -> Option<Vec<WindowInfo>> {
    let (code, value) = ax::copy_attr(app, "AXWindows");
    if code != 0 || value.is_null() {
        trace!(pid, code, "ax_windows_unavailable");
        return None;
    }
    let arr = unsafe { CFArray::<*const c_void>::wrap_under_create_rule(value as _) };
    let mut windows = Vec::with_capacity(arr.len() as usize);
    for (i, wref) in arr.iter().enumerate() {
        let wptr = *wref as *mut c_void;
        if wptr.is_null() {
            continue;
        }
        let id = ax::i64_attr(wptr, "AXWindowNumber")
            .map(|n| n as WindowId)
            .unwrap_or(i as WindowId);
        windows.push(WindowInfo {
            pid,
            id,
            title: ax::string_attr(wptr, "AXTitle").unwrap_or_default(),
            minimized: ax::bool_attr(wptr, "AXMinimized", false),
        });
    }
    Some(windows)
}

/// The `AXMainWindow` attribute as a single record, if present.
fn main_window(app: &ax::AXElem, pid: i32) -> Option<WindowInfo> {
    let (code, value) = ax::copy_attr(app, "AXMainWindow");
    if code != 0 || value.is_null() {
        return None;
    }
    let w = ax::AXElem::from_create(value as *mut c_void)?;
    Some(WindowInfo {
        pid,
        id: ax::i64_attr(w.as_ptr(), "AXWindowNumber")
            .map(|n| n as WindowId)
            .unwrap_or(0),
        title: ax::string_attr(w.as_ptr(), "AXTitle").unwrap_or_default(),
        minimized: ax::bool_attr(w.as_ptr(), "AXMinimized", false),
    })
}

impl WinOps for SystemWinOps {
    fn query_windows(&self, pid: i32) -> WindowQuery {
        let Some(app) = ax::app_element(pid) else {
            warn!(pid, "ax_app_element_unavailable");
            return WindowQuery::None;
        };
        // An empty list gets the same main-window fallback as a missing
        // one; some apps withhold AXWindows while still exposing a main
        // window.
        if let Some(windows) = list_windows(&app, pid)
            && !windows.is_empty()
        {
            return WindowQuery::Full(windows);
        }
        match main_window(&app, pid) {
            Some(w) => WindowQuery::MainOnly(w),
            None => WindowQuery::None,
        }
    }

    fn raise_window(&self, pid: i32, id: WindowId) -> Result<()> {
        let app = ax::app_element(pid).ok_or(Error::ProcessGone { pid })?;
        let (code, value) = ax::copy_attr(&app, "AXWindows");
        if code != 0 || value.is_null() {
            return Err(Error::Platform {
                op: "AXWindows",
                code: if code != 0 { code } else { AX_ERR_CANNOT_COMPLETE },
            });
        }
        let arr = unsafe { CFArray::<*const c_void>::wrap_under_create_rule(value as _) };
        for (i, wref) in arr.iter().enumerate() {
            let wptr = *wref as *mut c_void;
            if wptr.is_null() {
                continue;
            }
            let wid = ax::i64_attr(wptr, "AXWindowNumber")
                .map(|n| n as WindowId)
                .unwrap_or(i as WindowId);
            if wid != id {
                continue;
            }
            let status = ax::perform_action(wptr, "AXRaise");
            if status != 0 {
                warn!(pid, id, status, "ax_raise_failed");
                return Err(Error::Platform {
                    op: "AXRaise",
                    code: status,
                });
            }
            debug!(pid, id, "window_raised");
            return Ok(());
        }
        // The window closed between enumeration and the raise.
        Err(Error::Platform {
            op: "raise_window",
            code: AX_ERR_CANNOT_COMPLETE,
        })
    }
}
