//! Central status-code chokepoint: every native call's result passes through
//! [`check`] before any of its output is trusted.

use opencl_sys::{
    CL_INVALID_OPERATION, CL_INVALID_VALUE, CL_OUT_OF_HOST_MEMORY, CL_OUT_OF_RESOURCES,
    CL_SUCCESS, cl_int,
};

use crate::handle::Kind;

/// Closed error taxonomy of the wrapper layer.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClError {
    /// Version-gated feature unavailable, or the operation is invalid for
    /// the object's current state.
    #[error("invalid operation")]
    InvalidOperation,
    #[error("invalid value")]
    InvalidValue,
    #[error("out of device resources")]
    OutOfResources,
    #[error("out of host memory")]
    OutOfHostMemory,
    /// A handle of one kind was used where another was expected.
    #[error("expected a {expected:?} handle, got {actual:?}")]
    WrongKind { expected: Kind, actual: Kind },
    /// Any status not otherwise classified, carrying the raw code.
    #[error("OpenCL API error: {0}")]
    Api(cl_int),
}

pub type Result<T> = std::result::Result<T, ClError>;

/// Translates a native status code. Success is the `CL_SUCCESS` sentinel;
/// everything else maps deterministically into [`ClError`].
#[inline]
pub fn check(status: cl_int) -> Result<()> {
    if status == CL_SUCCESS {
        return Ok(());
    }
    Err(ClError::from(status))
}

impl From<cl_int> for ClError {
    #[inline]
    fn from(code: cl_int) -> Self {
        match code {
            CL_INVALID_OPERATION => ClError::InvalidOperation,
            CL_INVALID_VALUE => ClError::InvalidValue,
            CL_OUT_OF_RESOURCES => ClError::OutOfResources,
            CL_OUT_OF_HOST_MEMORY => ClError::OutOfHostMemory,
            other => ClError::Api(other),
        }
    }
}
