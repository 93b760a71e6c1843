//! OpenGL interop entry points.
//!
//! These are extension functions that an ICD loader does not have to export,
//! so they are resolved per platform through
//! `clGetExtensionFunctionAddressForPlatform`; a missing symbol surfaces as
//! `InvalidOperation`.

use std::ffi::{CStr, c_void};
use std::mem;

use opencl_sys::{
    CL_SUCCESS, cl_context, cl_event, cl_int, cl_mem, cl_mem_flags,
    clGetExtensionFunctionAddressForPlatform,
};

use crate::buffer::Buffer;
use crate::context::Context;
use crate::error::{ClError, Result, check};
use crate::event::Event;

/// OpenGL sync object name (`GLsync`).
pub type GlSync = *mut c_void;
/// OpenGL object name (`GLuint`).
pub type GlUint = u32;

type CreateEventFromGlSyncFn = unsafe extern "C" fn(cl_context, GlSync, *mut cl_int) -> cl_event;
type CreateFromGlBufferFn =
    unsafe extern "C" fn(cl_context, cl_mem_flags, GlUint, *mut cl_int) -> cl_mem;

fn extension_fn(context: &Context, name: &CStr) -> Result<*mut c_void> {
    let platform = context.platform()?;
    let addr = unsafe {
        clGetExtensionFunctionAddressForPlatform(platform.handle().raw().cast(), name.as_ptr())
    };
    if addr.is_null() {
        return Err(ClError::InvalidOperation);
    }
    Ok(addr)
}

pub(crate) fn create_event_from_gl_sync(context: &Context, sync: GlSync) -> Result<Event> {
    let addr = extension_fn(context, c"clCreateEventFromGLsyncKHR")?;
    let create: CreateEventFromGlSyncFn = unsafe { mem::transmute(addr) };

    let mut status: cl_int = CL_SUCCESS;
    let raw = unsafe { create(context.handle().raw().cast(), sync, &mut status) };
    check(status)?;
    Ok(Event::from_raw(raw, true))
}

pub(crate) fn create_from_gl_buffer(
    context: &Context,
    gl_buffer: GlUint,
    flags: cl_mem_flags,
) -> Result<Buffer> {
    let addr = extension_fn(context, c"clCreateFromGLBuffer")?;
    let create: CreateFromGlBufferFn = unsafe { mem::transmute(addr) };

    let mut status: cl_int = CL_SUCCESS;
    let raw = unsafe { create(context.handle().raw().cast(), flags, gl_buffer, &mut status) };
    check(status)?;
    Ok(Buffer::from_raw(raw, true))
}
