//! Generic two-phase info-query engine.
//!
//! Every native info query follows one protocol: probe the required byte
//! length with a zero-capacity call, then fetch into an allocation of exactly
//! that length. Fixed-size attributes may skip the probe; that is a fast path
//! of the same protocol, not a different one. The engine is type-agnostic:
//! it is parameterized over a raw fetch closure
//! `(capacity, out_ptr, size_ret) -> status` and decoding is the accessor's
//! responsibility.

use std::ffi::c_void;
use std::mem::size_of;
use std::ptr;

use bytemuck::{Pod, Zeroable};
use opencl_sys::cl_int;

use crate::error::{Result, check};

/// Phase 1 alone: the byte length the native layer reports for an attribute.
pub fn probe_size<F>(mut fetch: F) -> Result<usize>
where
    F: FnMut(usize, *mut c_void, *mut usize) -> cl_int,
{
    let mut size = 0usize;
    check(fetch(0, ptr::null_mut(), &mut size))?;
    Ok(size)
}

/// Two-phase variable-length fetch. The phase-2 allocation is exactly the
/// probed length; a zero-length probe yields an empty payload, not an error.
pub fn query_bytes<F>(mut fetch: F) -> Result<Vec<u8>>
where
    F: FnMut(usize, *mut c_void, *mut usize) -> cl_int,
{
    let mut size = 0usize;
    check(fetch(0, ptr::null_mut(), &mut size))?;
    if size == 0 {
        return Ok(Vec::new());
    }
    let mut data = vec![0u8; size];
    check(fetch(data.len(), data.as_mut_ptr().cast(), ptr::null_mut()))?;
    Ok(data)
}

/// Fixed-size fast path for scalar attributes; skips the size probe.
pub fn query_scalar<T, F>(mut fetch: F) -> Result<T>
where
    T: Pod + Zeroable,
    F: FnMut(usize, *mut c_void, *mut usize) -> cl_int,
{
    let mut value = T::zeroed();
    check(fetch(
        size_of::<T>(),
        (&mut value as *mut T).cast(),
        ptr::null_mut(),
    ))?;
    Ok(value)
}

/// Fixed-size fetch of a single raw handle. Raw pointers are not `Pod`, so
/// this path exists next to [`query_scalar`]. A null result is a valid value
/// (absent optional reference), never an error.
pub fn query_handle<F>(mut fetch: F) -> Result<*mut c_void>
where
    F: FnMut(usize, *mut c_void, *mut usize) -> cl_int,
{
    let mut value: *mut c_void = ptr::null_mut();
    check(fetch(
        size_of::<*mut c_void>(),
        (&mut value as *mut *mut c_void).cast(),
        ptr::null_mut(),
    ))?;
    Ok(value)
}

/// Two-phase fetch of a handle array. A probed length that is not a whole
/// element multiple is rejected as `InvalidValue`.
pub fn query_handles<F>(mut fetch: F) -> Result<Vec<*mut c_void>>
where
    F: FnMut(usize, *mut c_void, *mut usize) -> cl_int,
{
    let mut size = 0usize;
    check(fetch(0, ptr::null_mut(), &mut size))?;
    if size == 0 {
        return Ok(Vec::new());
    }
    if size % size_of::<*mut c_void>() != 0 {
        return Err(crate::error::ClError::InvalidValue);
    }
    let mut out = vec![ptr::null_mut::<c_void>(); size / size_of::<*mut c_void>()];
    check(fetch(size, out.as_mut_ptr().cast(), ptr::null_mut()))?;
    Ok(out)
}

/// Two-phase fetch of an array of `Pod` elements. A probed length that is
/// not a whole element multiple is rejected as `InvalidValue`.
pub fn query_pods<T, F>(mut fetch: F) -> Result<Vec<T>>
where
    T: Pod + Zeroable,
    F: FnMut(usize, *mut c_void, *mut usize) -> cl_int,
{
    let mut size = 0usize;
    check(fetch(0, ptr::null_mut(), &mut size))?;
    if size == 0 {
        return Ok(Vec::new());
    }
    if size % size_of::<T>() != 0 {
        return Err(crate::error::ClError::InvalidValue);
    }
    let mut out = vec![T::zeroed(); size / size_of::<T>()];
    check(fetch(size, out.as_mut_ptr().cast(), ptr::null_mut()))?;
    Ok(out)
}

/// Variable-length string attribute: two-phase fetch plus NUL trim.
pub fn query_string<F>(fetch: F) -> Result<String>
where
    F: FnMut(usize, *mut c_void, *mut usize) -> cl_int,
{
    let bytes = query_bytes(fetch)?;
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClError;
    use opencl_sys::{CL_INVALID_VALUE, CL_SUCCESS};

    /// Fake native info function serving a fixed payload.
    fn serve(payload: &[u8]) -> impl FnMut(usize, *mut c_void, *mut usize) -> cl_int + '_ {
        move |cap, buf, size_ret| {
            if !size_ret.is_null() {
                unsafe { *size_ret = payload.len() };
            }
            if !buf.is_null() {
                // The engine must allocate exactly the probed length.
                assert_eq!(cap, payload.len());
                unsafe {
                    ptr::copy_nonoverlapping(payload.as_ptr(), buf.cast::<u8>(), payload.len())
                };
            }
            CL_SUCCESS
        }
    }

    #[test]
    fn two_phase_roundtrip_is_stable() {
        let payload = 42u32.to_ne_bytes();
        let first = query_bytes(serve(&payload)).unwrap();
        let second = query_bytes(serve(&payload)).unwrap();
        assert_eq!(first, payload);
        assert_eq!(first, second);
    }

    #[test]
    fn zero_length_probe_yields_empty_not_error() {
        assert_eq!(query_bytes(serve(&[])).unwrap(), Vec::<u8>::new());
        assert_eq!(query_pods::<isize, _>(serve(&[])).unwrap(), Vec::new());
        assert!(query_handles(serve(&[])).unwrap().is_empty());
    }

    #[test]
    fn phase_two_failure_surfaces_after_successful_probe() {
        let result = query_bytes(|_, buf, size_ret| {
            if !size_ret.is_null() {
                unsafe { *size_ret = 8 };
                return CL_SUCCESS;
            }
            assert!(!buf.is_null());
            CL_INVALID_VALUE
        });
        assert_eq!(result, Err(ClError::InvalidValue));
    }

    #[test]
    fn scalar_fast_path_never_probes() {
        let value: u32 = query_scalar(|cap, buf, size_ret| {
            assert!(size_ret.is_null());
            assert_eq!(cap, size_of::<u32>());
            unsafe { *buf.cast::<u32>() = 7 };
            CL_SUCCESS
        })
        .unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn string_decode_trims_trailing_nul() {
        let s = query_string(serve(b"OpenCL 1.2 Vendor\0")).unwrap();
        assert_eq!(s, "OpenCL 1.2 Vendor");
    }

    #[test]
    fn null_handle_is_a_value_not_an_error() {
        let h = query_handle(|cap, buf, size_ret| {
            assert!(size_ret.is_null());
            assert_eq!(cap, size_of::<*mut c_void>());
            unsafe { *buf.cast::<*mut c_void>() = ptr::null_mut() };
            CL_SUCCESS
        })
        .unwrap();
        assert!(h.is_null());
    }

    #[test]
    fn ragged_probe_size_is_rejected_before_phase_two() {
        // 9 bytes is not a whole number of u64 or pointer elements. The fetch
        // must not be invoked a second time with a capacity the probe cannot
        // back.
        let fetch = |_cap: usize, buf: *mut c_void, size_ret: *mut usize| {
            assert!(buf.is_null());
            unsafe { *size_ret = 9 };
            CL_SUCCESS
        };
        assert_eq!(query_pods::<u64, _>(fetch), Err(ClError::InvalidValue));
        assert_eq!(query_handles(fetch), Err(ClError::InvalidValue));
    }

    #[test]
    fn handle_array_length_matches_probe() {
        let raw = [0x10usize, 0x20, 0x30];
        let bytes: Vec<u8> = raw.iter().flat_map(|v| v.to_ne_bytes()).collect();
        let handles = query_handles(serve(&bytes)).unwrap();
        assert_eq!(handles.len(), 3);
        assert_eq!(handles[2] as usize, 0x30);
    }
}
