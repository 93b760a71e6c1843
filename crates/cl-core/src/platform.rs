use std::ptr;
use std::str::FromStr;

use opencl_sys::{
    CL_PLATFORM_EXTENSIONS, CL_PLATFORM_NAME, CL_PLATFORM_PROFILE, CL_PLATFORM_VENDOR,
    CL_PLATFORM_VERSION, cl_device_id, cl_device_type, cl_platform_id, cl_platform_info, cl_uint,
    clGetDeviceIDs, clGetPlatformIDs, clGetPlatformInfo,
};

use crate::cl_try;
use crate::device::Device;
use crate::error::{ClError, Result};
use crate::handle::{Handle, Kind};
use crate::info::query_string;

/// Parsed platform version, totally ordered so operation gates can compare
/// against their minimum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
}

impl Version {
    pub const V1_0: Version = Version { major: 1, minor: 0 };
    pub const V1_1: Version = Version { major: 1, minor: 1 };
    pub const V1_2: Version = Version { major: 1, minor: 2 };

    /// Fails with `InvalidOperation` when `self` is older than `min`. No
    /// native call is involved; gated operations run this first.
    pub fn require(self, min: Version) -> Result<()> {
        if self < min {
            return Err(ClError::InvalidOperation);
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = ClError;

    /// Parses the `OpenCL <major>.<minor> <vendor-specific>` form of the
    /// platform version string.
    fn from_str(s: &str) -> Result<Self> {
        let rest = s.strip_prefix("OpenCL ").ok_or(ClError::InvalidValue)?;
        let token = rest.split_whitespace().next().ok_or(ClError::InvalidValue)?;
        let (major, minor) = token.split_once('.').ok_or(ClError::InvalidValue)?;
        Ok(Version {
            major: major.parse().map_err(|_| ClError::InvalidValue)?,
            minor: minor.parse().map_err(|_| ClError::InvalidValue)?,
        })
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// An installed OpenCL platform.
#[derive(Debug, PartialEq, Eq)]
pub struct Platform {
    handle: Handle,
}

impl Platform {
    /// Enumerates the installed platforms (count call, then fetch call).
    pub fn all() -> Result<Vec<Platform>> {
        let mut count: cl_uint = 0;
        cl_try!(clGetPlatformIDs(0, ptr::null_mut(), &mut count));
        if count == 0 {
            return Ok(Vec::new());
        }
        let mut ids: Vec<cl_platform_id> = vec![ptr::null_mut(); count as usize];
        cl_try!(clGetPlatformIDs(count, ids.as_mut_ptr(), ptr::null_mut()));
        Ok(ids.into_iter().map(Platform::from_raw).collect())
    }

    pub(crate) fn from_raw(raw: cl_platform_id) -> Self {
        Self {
            handle: Handle::new(raw.cast(), Kind::Platform, false),
        }
    }

    pub fn from_handle(handle: Handle) -> Result<Self> {
        handle.expect(Kind::Platform)?;
        Ok(Self { handle })
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    fn raw(&self) -> cl_platform_id {
        self.handle.raw().cast()
    }

    fn info_string(&self, param: cl_platform_info) -> Result<String> {
        let raw = self.raw();
        query_string(|cap, buf, size_ret| unsafe {
            clGetPlatformInfo(raw, param, cap, buf, size_ret)
        })
    }

    pub fn name(&self) -> Result<String> {
        self.info_string(CL_PLATFORM_NAME)
    }

    pub fn vendor(&self) -> Result<String> {
        self.info_string(CL_PLATFORM_VENDOR)
    }

    pub fn profile(&self) -> Result<String> {
        self.info_string(CL_PLATFORM_PROFILE)
    }

    pub fn extensions(&self) -> Result<Vec<String>> {
        Ok(self
            .info_string(CL_PLATFORM_EXTENSIONS)?
            .split_whitespace()
            .map(String::from)
            .collect())
    }

    pub fn version_string(&self) -> Result<String> {
        self.info_string(CL_PLATFORM_VERSION)
    }

    /// Parsed platform version.
    pub fn version(&self) -> Result<Version> {
        self.version_string()?.parse()
    }

    /// Version gate shared by the 1.1-minimum operations: fails with
    /// `InvalidOperation` before the gated native call is issued.
    pub fn require_version(&self, min: Version) -> Result<()> {
        self.version()?.require(min)
    }

    /// Devices of the given type on this platform.
    pub fn devices(&self, device_type: cl_device_type) -> Result<Vec<Device>> {
        let mut count: cl_uint = 0;
        cl_try!(clGetDeviceIDs(
            self.raw(),
            device_type,
            0,
            ptr::null_mut(),
            &mut count
        ));
        if count == 0 {
            return Ok(Vec::new());
        }
        let mut ids: Vec<cl_device_id> = vec![ptr::null_mut(); count as usize];
        cl_try!(clGetDeviceIDs(
            self.raw(),
            device_type,
            count,
            ids.as_mut_ptr(),
            ptr::null_mut()
        ));
        Ok(ids.into_iter().map(Device::from_raw).collect())
    }
}
