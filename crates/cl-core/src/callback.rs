//! Bridges native event and context notifications to Rust closures.
//!
//! The native API has no unregister operation, and a callback may fire after
//! the caller dropped every wrapper of the event or context. Registrations
//! therefore live in a process-wide registry for the lifetime of the process.

use std::ffi::{CStr, c_void};
use std::os::raw::c_char;
use std::slice;
use std::sync::Mutex;

use once_cell::sync::Lazy;
use opencl_sys::{cl_event, cl_int, clSetEventCallback};

use crate::error::{Result, check};
use crate::event::{CommandExecutionStatus, Event};

pub(crate) type EventHook = Box<dyn Fn(Event, CommandExecutionStatus) + Send + Sync + 'static>;

struct Registration {
    event: usize,
    hook: EventHook,
}

// Entries are individually boxed so their address survives registry growth;
// that address is the user_data pointer handed to the native runtime.
static REGISTRY: Lazy<Mutex<Vec<Box<Registration>>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub(crate) fn register(event: cl_event, status: cl_int, hook: EventHook) -> Result<()> {
    let entry = Box::new(Registration {
        event: event as usize,
        hook,
    });
    let user_data: *const Registration = &*entry;
    check(unsafe { clSetEventCallback(event, status, Some(event_trampoline), user_data as *mut c_void) })?;
    REGISTRY.lock().unwrap().push(entry);
    Ok(())
}

/// Retained registrations for an event, keyed by raw identity.
pub(crate) fn registered_for(event: cl_event) -> usize {
    let key = event as usize;
    REGISTRY
        .lock()
        .unwrap()
        .iter()
        .filter(|r| r.event == key)
        .count()
}

// Invoked by the native runtime on a thread it owns. user_data points into a
// never-removed registry entry, so no lock is taken here.
extern "C" fn event_trampoline(event: cl_event, status: cl_int, user_data: *mut c_void) {
    let registration = unsafe { &*(user_data as *const Registration) };
    (registration.hook)(
        Event::from_raw(event, false),
        CommandExecutionStatus::from(status),
    );
}

pub(crate) type ContextHook = Box<dyn Fn(&str, &[u8]) + Send + Sync + 'static>;

struct ContextRegistration {
    hook: ContextHook,
}

static CONTEXT_REGISTRY: Lazy<Mutex<Vec<Box<ContextRegistration>>>> =
    Lazy::new(|| Mutex::new(Vec::new()));

/// A context-notify registration prepared for a creation call. Its entry is
/// retained only once the native layer accepted the context.
pub(crate) struct ContextNotify {
    entry: Box<ContextRegistration>,
}

pub(crate) fn context_notify(hook: ContextHook) -> ContextNotify {
    ContextNotify {
        entry: Box::new(ContextRegistration { hook }),
    }
}

impl ContextNotify {
    pub(crate) fn user_data(&self) -> *mut c_void {
        let ptr: *const ContextRegistration = &*self.entry;
        ptr as *mut c_void
    }

    pub(crate) fn retain(self) {
        CONTEXT_REGISTRY.lock().unwrap().push(self.entry);
    }
}

// Asynchronous error report from the native runtime: a message plus an
// implementation-defined binary blob, either of which may be absent.
pub(crate) extern "C" fn context_trampoline(
    errinfo: *const c_char,
    private_info: *const c_void,
    cb: usize,
    user_data: *mut c_void,
) {
    let registration = unsafe { &*(user_data as *const ContextRegistration) };
    let message = if errinfo.is_null() {
        String::new()
    } else {
        unsafe { CStr::from_ptr(errinfo) }
            .to_string_lossy()
            .into_owned()
    };
    let binary: &[u8] = if private_info.is_null() || cb == 0 {
        &[]
    } else {
        unsafe { slice::from_raw_parts(private_info.cast::<u8>(), cb) }
    };
    (registration.hook)(&message, binary);
}
