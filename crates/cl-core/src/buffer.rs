use std::ffi::c_void;
use std::ptr;

use opencl_sys::{
    CL_BUFFER_CREATE_TYPE_REGION, CL_MEM_ASSOCIATED_MEMOBJECT, CL_MEM_CONTEXT, CL_MEM_FLAGS,
    CL_MEM_MAP_COUNT, CL_MEM_OFFSET, CL_MEM_REFERENCE_COUNT, CL_MEM_SIZE, CL_SUCCESS,
    cl_buffer_region, cl_int, cl_mem, cl_mem_flags, cl_mem_info, cl_uint, clCreateBuffer,
    clCreateSubBuffer, clGetMemObjectInfo,
};

use bytemuck::{Pod, Zeroable};

use crate::context::Context;
use crate::error::{Result, check};
use crate::gl::{self, GlUint};
use crate::handle::{Handle, Kind};
use crate::info::{query_handle, query_scalar};
use crate::platform::{Platform, Version};

/// Folds an ordered flag sequence into one combined bitfield. A one-element
/// sequence is equivalent to the single flag it contains.
pub fn combine_flags(flags: &[cl_mem_flags]) -> cl_mem_flags {
    flags.iter().fold(0, |acc, f| acc | f)
}

/// Contiguous byte region of an existing buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferRegion {
    pub origin: usize,
    pub size: usize,
}

/// A memory object backed by context-owned device memory.
#[derive(Debug, PartialEq, Eq)]
pub struct Buffer {
    handle: Handle,
}

impl Buffer {
    /// Creates a buffer on `context`. `host_data`, when given, backs the
    /// allocation according to the `*_HOST_PTR` flags in `flags`; size and
    /// flag consistency are validated by the native layer.
    pub fn create(
        context: &Context,
        size: usize,
        flags: &[cl_mem_flags],
        host_data: Option<&mut [u8]>,
    ) -> Result<Buffer> {
        #[cfg(feature = "metrics")]
        let t = std::time::Instant::now();

        let host_ptr = host_data.map_or(ptr::null_mut(), |d| d.as_mut_ptr().cast::<c_void>());
        let mut status: cl_int = CL_SUCCESS;
        let raw = unsafe {
            clCreateBuffer(
                context.handle().raw().cast(),
                combine_flags(flags),
                size,
                host_ptr,
                &mut status,
            )
        };
        check(status)?;

        #[cfg(feature = "metrics")]
        {
            use std::sync::atomic::Ordering;
            crate::metrics::ALLOCS.fetch_add(1, Ordering::Relaxed);
            crate::metrics::ALLOC_BYTES.fetch_add(size, Ordering::Relaxed);
            crate::metrics::record("Buffer::create", t);
        }

        Ok(Self {
            handle: Handle::new(raw.cast(), Kind::Buffer, true),
        })
    }

    /// Creates a sub-buffer over a contiguous region of `self`. Requires
    /// platform version 1.1; the gate fails before any native call. Region
    /// bounds are validated by the native layer, not duplicated here.
    pub fn create_sub_buffer(
        &self,
        region: BufferRegion,
        flags: &[cl_mem_flags],
    ) -> Result<Buffer> {
        self.platform()?.require_version(Version::V1_1)?;

        let info = cl_buffer_region {
            origin: region.origin,
            size: region.size,
        };
        let mut status: cl_int = CL_SUCCESS;
        let raw = unsafe {
            clCreateSubBuffer(
                self.raw(),
                combine_flags(flags),
                CL_BUFFER_CREATE_TYPE_REGION,
                (&info as *const cl_buffer_region).cast(),
                &mut status,
            )
        };
        check(status)?;
        Ok(Self {
            handle: Handle::new(raw.cast(), Kind::Buffer, true),
        })
    }

    /// Shares an OpenGL buffer object into `context` (GL interop).
    pub fn create_from_gl_buffer(
        context: &Context,
        gl_buffer: GlUint,
        flags: &[cl_mem_flags],
    ) -> Result<Buffer> {
        gl::create_from_gl_buffer(context, gl_buffer, combine_flags(flags))
    }

    pub(crate) fn from_raw(raw: cl_mem, owned: bool) -> Self {
        Self {
            handle: Handle::new(raw.cast(), Kind::Buffer, owned),
        }
    }

    pub fn from_handle(handle: Handle) -> Result<Self> {
        handle.expect(Kind::Buffer)?;
        Ok(Self { handle })
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    fn raw(&self) -> cl_mem {
        self.handle.raw().cast()
    }

    fn info_scalar<T: Pod + Zeroable>(&self, param: cl_mem_info) -> Result<T> {
        let raw = self.raw();
        query_scalar(|cap, buf, size_ret| unsafe {
            clGetMemObjectInfo(raw, param, cap, buf, size_ret)
        })
    }

    pub fn size(&self) -> Result<usize> {
        self.info_scalar(CL_MEM_SIZE)
    }

    pub fn flags(&self) -> Result<cl_mem_flags> {
        self.info_scalar(CL_MEM_FLAGS)
    }

    pub fn map_count(&self) -> Result<u32> {
        self.info_scalar::<cl_uint>(CL_MEM_MAP_COUNT)
    }

    pub fn reference_count(&self) -> Result<u32> {
        self.info_scalar::<cl_uint>(CL_MEM_REFERENCE_COUNT)
    }

    /// Byte offset into the origin buffer; zero for a root allocation.
    pub fn offset(&self) -> Result<usize> {
        self.info_scalar(CL_MEM_OFFSET)
    }

    pub fn context(&self) -> Result<Context> {
        let raw = self.raw();
        let ctx = query_handle(|cap, buf, size_ret| unsafe {
            clGetMemObjectInfo(raw, CL_MEM_CONTEXT, cap, buf, size_ret)
        })?;
        Ok(Context::from_raw(ctx.cast(), false))
    }

    /// Origin buffer of a sub-buffer; `None` for a root allocation.
    pub fn associated_memobject(&self) -> Result<Option<Buffer>> {
        let raw = self.raw();
        let origin = query_handle(|cap, buf, size_ret| unsafe {
            clGetMemObjectInfo(raw, CL_MEM_ASSOCIATED_MEMOBJECT, cap, buf, size_ret)
        })?;
        if origin.is_null() {
            return Ok(None);
        }
        Ok(Some(Buffer::from_raw(origin.cast(), false)))
    }

    pub fn platform(&self) -> Result<Platform> {
        self.context()?.platform()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencl_sys::{CL_MEM_COPY_HOST_PTR, CL_MEM_READ_ONLY, CL_MEM_READ_WRITE};

    #[test]
    fn single_flag_equals_one_element_sequence() {
        assert_eq!(combine_flags(&[CL_MEM_READ_WRITE]), CL_MEM_READ_WRITE);
    }

    #[test]
    fn sequence_folds_with_bitwise_or() {
        let combined = combine_flags(&[CL_MEM_READ_ONLY, CL_MEM_COPY_HOST_PTR]);
        assert_eq!(combined, CL_MEM_READ_ONLY | CL_MEM_COPY_HOST_PTR);
    }

    #[test]
    fn empty_sequence_is_the_zero_bitfield() {
        assert_eq!(combine_flags(&[]), 0);
    }

    #[test]
    fn flag_order_does_not_matter() {
        assert_eq!(
            combine_flags(&[CL_MEM_READ_ONLY, CL_MEM_COPY_HOST_PTR]),
            combine_flags(&[CL_MEM_COPY_HOST_PTR, CL_MEM_READ_ONLY])
        );
    }
}
