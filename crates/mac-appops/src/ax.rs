//! Thin helpers over the raw accessibility (AX) C interface.

use std::{ffi::c_void, ptr::null_mut};

use core_foundation::{
    base::{CFRelease, CFTypeRef, TCFType},
    boolean::CFBoolean,
    number::CFNumber,
    string::{CFString, CFStringRef},
};

#[link(name = "ApplicationServices", kind = "framework")]
unsafe extern "C" {
    fn AXUIElementCreateApplication(pid: i32) -> *mut c_void;
    fn AXUIElementCopyAttributeValue(
        element: *mut c_void,
        attr: CFStringRef,
        value: *mut CFTypeRef,
    ) -> i32;
    fn AXUIElementPerformAction(element: *mut c_void, action: CFStringRef) -> i32;
}

/// Owned AX element reference, released on drop.
pub(crate) struct AXElem(*mut c_void);

impl AXElem {
    /// Wrap a pointer obtained from a create/copy-rule call.
    pub(crate) fn from_create(ptr: *mut c_void) -> Option<Self> {
        if ptr.is_null() { None } else { Some(Self(ptr)) }
    }

    pub(crate) fn as_ptr(&self) -> *mut c_void {
        self.0
    }
}

impl Drop for AXElem {
    fn drop(&mut self) {
        unsafe { CFRelease(self.0 as CFTypeRef) }
    }
}

/// The AX application element for a pid.
pub(crate) fn app_element(pid: i32) -> Option<AXElem> {
    AXElem::from_create(unsafe { AXUIElementCreateApplication(pid) })
}

/// Copy an attribute value; the caller owns the returned reference.
///
/// Returns the raw AX status code alongside the value so callers can
/// distinguish "attribute absent" from other failures.
pub(crate) fn copy_attr(element: &AXElem, name: &str) -> (i32, CFTypeRef) {
    let attr = CFString::new(name);
    let mut out: CFTypeRef = null_mut();
    let code = unsafe {
        AXUIElementCopyAttributeValue(element.as_ptr(), attr.as_concrete_TypeRef(), &mut out)
    };
    (code, out)
}

/// Copy an attribute from a raw (borrowed) element pointer.
pub(crate) fn copy_attr_raw(element: *mut c_void, name: &str) -> (i32, CFTypeRef) {
    let attr = CFString::new(name);
    let mut out: CFTypeRef = null_mut();
    let code =
        unsafe { AXUIElementCopyAttributeValue(element, attr.as_concrete_TypeRef(), &mut out) };
    (code, out)
}

/// Perform an AX action on a raw element pointer, returning the status code.
pub(crate) fn perform_action(element: *mut c_void, name: &str) -> i32 {
    let action = CFString::new(name);
    unsafe { AXUIElementPerformAction(element, action.as_concrete_TypeRef()) }
}

/// Read a boolean attribute from a raw element, defaulting when absent.
pub(crate) fn bool_attr(element: *mut c_void, name: &str, default: bool) -> bool {
    let (code, value) = copy_attr_raw(element, name);
    if code != 0 || value.is_null() {
        return default;
    }
    let b = unsafe { CFBoolean::wrap_under_create_rule(value as _) };
    b.into()
}

/// Read an integer attribute from a raw element.
pub(crate) fn i64_attr(element: *mut c_void, name: &str) -> Option<i64> {
    let (code, value) = copy_attr_raw(element, name);
    if code != 0 || value.is_null() {
        return None;
    }
    let n = unsafe { CFNumber::wrap_under_create_rule(value as _) };
    n.to_i64()
}

/// Read a string attribute from a raw element.
pub(crate) fn string_attr(element: *mut c_void, name: &str) -> Option<String> {
    let (code, value) = copy_attr_raw(element, name);
    if code != 0 || value.is_null() {
        return None;
    }
    let s = unsafe { CFString::wrap_under_create_rule(value as _) };
    Some(s.to_string())
}
