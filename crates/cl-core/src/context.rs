use std::mem::size_of;
use std::ptr;

use opencl_sys::{
    CL_CONTEXT_DEVICES, CL_CONTEXT_PROPERTIES, CL_CONTEXT_REFERENCE_COUNT, CL_SUCCESS, cl_context,
    cl_context_properties, cl_device_id, cl_int, cl_mem_flags, cl_uint, clCreateContext,
    clGetContextInfo,
};

use crate::buffer::Buffer;
use crate::callback;
use crate::device::Device;
use crate::error::{ClError, Result, check};
use crate::event::Event;
use crate::handle::{Handle, Kind};
use crate::info::{probe_size, query_handles, query_pods, query_scalar};
use crate::platform::Platform;

/// An OpenCL context over one or more devices.
#[derive(Debug, PartialEq, Eq)]
pub struct Context {
    handle: Handle,
}

impl Context {
    /// Creates a context over the given devices.
    pub fn create(devices: &[Device]) -> Result<Context> {
        Self::create_with_properties(devices, &[])
    }

    /// Creation pairs the returned handle with an error-output parameter:
    /// either a valid owned handle comes back with success, or an error and
    /// no handle. There is no partially initialized state.
    pub fn create_with_properties(
        devices: &[Device],
        properties: &[cl_context_properties],
    ) -> Result<Context> {
        let ids = Self::device_ids(devices);
        let props = Self::property_list(properties);
        let props_ptr = if props.is_empty() { ptr::null() } else { props.as_ptr() };

        let mut status: cl_int = CL_SUCCESS;
        let raw = unsafe {
            clCreateContext(
                props_ptr,
                ids.len() as cl_uint,
                ids.as_ptr(),
                None,
                ptr::null_mut(),
                &mut status,
            )
        };
        check(status)?;
        Ok(Self {
            handle: Handle::new(raw.cast(), Kind::Context, true),
        })
    }

    /// Like [`Context::create_with_properties`], with `notify` registered
    /// for asynchronous error reports from the native runtime. The hook
    /// fires on a runtime thread with an error message and an
    /// implementation-defined binary blob, and is retained for the process
    /// lifetime once creation succeeds.
    pub fn create_with_notify<F>(
        devices: &[Device],
        properties: &[cl_context_properties],
        notify: F,
    ) -> Result<Context>
    where
        F: Fn(&str, &[u8]) + Send + Sync + 'static,
    {
        let ids = Self::device_ids(devices);
        let props = Self::property_list(properties);
        let props_ptr = if props.is_empty() { ptr::null() } else { props.as_ptr() };

        let pending = callback::context_notify(Box::new(notify));
        let mut status: cl_int = CL_SUCCESS;
        let raw = unsafe {
            clCreateContext(
                props_ptr,
                ids.len() as cl_uint,
                ids.as_ptr(),
                Some(callback::context_trampoline),
                pending.user_data(),
                &mut status,
            )
        };
        check(status)?;
        pending.retain();
        Ok(Self {
            handle: Handle::new(raw.cast(), Kind::Context, true),
        })
    }

    fn device_ids(devices: &[Device]) -> Vec<cl_device_id> {
        devices.iter().map(|d| d.handle().raw().cast()).collect()
    }

    // The native property list is zero-terminated; empty means null.
    fn property_list(properties: &[cl_context_properties]) -> Vec<cl_context_properties> {
        if properties.is_empty() {
            return Vec::new();
        }
        let mut props = properties.to_vec();
        props.push(0);
        props
    }

    pub(crate) fn from_raw(raw: cl_context, owned: bool) -> Self {
        Self {
            handle: Handle::new(raw.cast(), Kind::Context, owned),
        }
    }

    pub fn from_handle(handle: Handle) -> Result<Self> {
        handle.expect(Kind::Context)?;
        Ok(Self { handle })
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    fn raw(&self) -> cl_context {
        self.handle.raw().cast()
    }

    /// Device count, derived from the size probe alone.
    pub fn num_devices(&self) -> Result<usize> {
        let raw = self.raw();
        let size = probe_size(|cap, buf, size_ret| unsafe {
            clGetContextInfo(raw, CL_CONTEXT_DEVICES, cap, buf, size_ret)
        })?;
        Ok(size / size_of::<cl_device_id>())
    }

    /// The devices the context was created over.
    pub fn devices(&self) -> Result<Vec<Device>> {
        let raw = self.raw();
        let ids = query_handles(|cap, buf, size_ret| unsafe {
            clGetContextInfo(raw, CL_CONTEXT_DEVICES, cap, buf, size_ret)
        })?;
        Ok(ids.into_iter().map(|id| Device::from_raw(id.cast())).collect())
    }

    pub fn reference_count(&self) -> Result<u32> {
        let raw = self.raw();
        query_scalar::<cl_uint, _>(|cap, buf, size_ret| unsafe {
            clGetContextInfo(raw, CL_CONTEXT_REFERENCE_COUNT, cap, buf, size_ret)
        })
    }

    /// Properties the context was created with. A context created without
    /// properties reports an empty list, not an error.
    pub fn properties(&self) -> Result<Vec<cl_context_properties>> {
        let raw = self.raw();
        query_pods(|cap, buf, size_ret| unsafe {
            clGetContextInfo(raw, CL_CONTEXT_PROPERTIES, cap, buf, size_ret)
        })
    }

    /// Platform owning this context, resolved through its first device.
    pub fn platform(&self) -> Result<Platform> {
        let devices = self.devices()?;
        let first = devices.first().ok_or(ClError::InvalidValue)?;
        first.platform()
    }

    pub fn create_buffer(
        &self,
        size: usize,
        flags: &[cl_mem_flags],
        host_data: Option<&mut [u8]>,
    ) -> Result<Buffer> {
        Buffer::create(self, size, flags, host_data)
    }

    pub fn create_user_event(&self) -> Result<Event> {
        Event::create_user(self)
    }
}
