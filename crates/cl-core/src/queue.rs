use opencl_sys::{
    CL_QUEUE_CONTEXT, CL_QUEUE_DEVICE, CL_QUEUE_PROPERTIES, CL_QUEUE_REFERENCE_COUNT,
    cl_command_queue, cl_command_queue_properties, cl_uint, clGetCommandQueueInfo,
};

use crate::context::Context;
use crate::device::Device;
use crate::error::Result;
use crate::handle::{Handle, Kind};
use crate::info::{query_handle, query_scalar};

/// A command queue handle, as surfaced by event queries. Queue creation and
/// enqueue operations belong to the surrounding application layer.
#[derive(Debug, PartialEq, Eq)]
pub struct CommandQueue {
    handle: Handle,
}

impl CommandQueue {
    pub(crate) fn from_raw(raw: cl_command_queue) -> Self {
        Self {
            handle: Handle::new(raw.cast(), Kind::CommandQueue, false),
        }
    }

    pub fn from_handle(handle: Handle) -> Result<Self> {
        handle.expect(Kind::CommandQueue)?;
        Ok(Self { handle })
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    fn raw(&self) -> cl_command_queue {
        self.handle.raw().cast()
    }

    pub fn context(&self) -> Result<Context> {
        let raw = self.raw();
        let ctx = query_handle(|cap, buf, size_ret| unsafe {
            clGetCommandQueueInfo(raw, CL_QUEUE_CONTEXT, cap, buf, size_ret)
        })?;
        Ok(Context::from_raw(ctx.cast(), false))
    }

    pub fn device(&self) -> Result<Device> {
        let raw = self.raw();
        let dev = query_handle(|cap, buf, size_ret| unsafe {
            clGetCommandQueueInfo(raw, CL_QUEUE_DEVICE, cap, buf, size_ret)
        })?;
        Ok(Device::from_raw(dev.cast()))
    }

    pub fn reference_count(&self) -> Result<u32> {
        let raw = self.raw();
        query_scalar::<cl_uint, _>(|cap, buf, size_ret| unsafe {
            clGetCommandQueueInfo(raw, CL_QUEUE_REFERENCE_COUNT, cap, buf, size_ret)
        })
    }

    pub fn properties(&self) -> Result<cl_command_queue_properties> {
        let raw = self.raw();
        query_scalar(|cap, buf, size_ret| unsafe {
            clGetCommandQueueInfo(raw, CL_QUEUE_PROPERTIES, cap, buf, size_ret)
        })
    }
}
