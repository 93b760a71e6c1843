use opencl_sys::{
    CL_DEVICE_NAME, CL_DEVICE_PLATFORM, CL_DEVICE_VENDOR, CL_DEVICE_VERSION, cl_device_id,
    cl_device_info, clGetDeviceInfo,
};

use crate::error::Result;
use crate::handle::{Handle, Kind};
use crate::info::{query_handle, query_string};
use crate::platform::Platform;

/// A compute device. Device handles come out of platform or context queries
/// and are always borrowed; devices are not reference counted.
#[derive(Debug, PartialEq, Eq)]
pub struct Device {
    handle: Handle,
}

impl Device {
    pub(crate) fn from_raw(raw: cl_device_id) -> Self {
        Self {
            handle: Handle::new(raw.cast(), Kind::Device, false),
        }
    }

    pub fn from_handle(handle: Handle) -> Result<Self> {
        handle.expect(Kind::Device)?;
        Ok(Self { handle })
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    fn raw(&self) -> cl_device_id {
        self.handle.raw().cast()
    }

    fn info_string(&self, param: cl_device_info) -> Result<String> {
        let raw = self.raw();
        query_string(|cap, buf, size_ret| unsafe {
            clGetDeviceInfo(raw, param, cap, buf, size_ret)
        })
    }

    pub fn name(&self) -> Result<String> {
        self.info_string(CL_DEVICE_NAME)
    }

    pub fn vendor(&self) -> Result<String> {
        self.info_string(CL_DEVICE_VENDOR)
    }

    pub fn version_string(&self) -> Result<String> {
        self.info_string(CL_DEVICE_VERSION)
    }

    /// The platform this device belongs to; the version gates resolve their
    /// platform through here.
    pub fn platform(&self) -> Result<Platform> {
        let raw = self.raw();
        let platform = query_handle(|cap, buf, size_ret| unsafe {
            clGetDeviceInfo(raw, CL_DEVICE_PLATFORM, cap, buf, size_ret)
        })?;
        Ok(Platform::from_raw(platform.cast()))
    }
}
