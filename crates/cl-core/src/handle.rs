use std::ffi::c_void;
use std::hash::{Hash, Hasher};

use opencl_sys::{
    clReleaseCommandQueue, clReleaseContext, clReleaseEvent, clReleaseMemObject,
};

use crate::error::{ClError, Result};

/// Object kind behind an opaque native reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Platform,
    Device,
    Context,
    CommandQueue,
    Buffer,
    Event,
}

/// Kind-tagged wrapper around an opaque native handle.
///
/// Two wrappers around the same native reference compare equal and are
/// interchangeable. Construction never fails; validity is only established
/// by the native call that produced or consumed the handle. An owned handle
/// releases its native reference on drop, a borrowed one does not; the
/// underlying lifetime is governed by native reference counting.
#[derive(Debug)]
pub struct Handle {
    raw: *mut c_void,
    kind: Kind,
    owned: bool,
}

// The native API permits sharing handles across threads; this layer adds no
// locking and inherits the runtime's guarantees as-is.
unsafe impl Send for Handle {}
unsafe impl Sync for Handle {}

impl Handle {
    pub(crate) fn new(raw: *mut c_void, kind: Kind, owned: bool) -> Self {
        Self { raw, kind, owned }
    }

    /// Wraps a raw native reference.
    ///
    /// # Safety
    ///
    /// `raw` must be a handle of the given kind (or null), and `owned` must
    /// only be set when the caller transfers its native reference to the
    /// wrapper, which will release it on drop.
    pub unsafe fn from_raw(raw: *mut c_void, kind: Kind, owned: bool) -> Self {
        Self::new(raw, kind, owned)
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn raw(&self) -> *mut c_void {
        self.raw
    }

    pub fn is_null(&self) -> bool {
        self.raw.is_null()
    }

    pub fn is_owned(&self) -> bool {
        self.owned
    }

    /// Rejects use of this handle where another kind is expected.
    pub fn expect(&self, expected: Kind) -> Result<*mut c_void> {
        if self.kind != expected {
            return Err(ClError::WrongKind {
                expected,
                actual: self.kind,
            });
        }
        Ok(self.raw)
    }
}

impl PartialEq for Handle {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw && self.kind == other.kind
    }
}

impl Eq for Handle {}

impl Hash for Handle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.raw as usize).hash(state);
        self.kind.hash(state);
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        if !self.owned || self.raw.is_null() {
            return;
        }
        // Release status cannot propagate out of drop.
        let _ = unsafe {
            match self.kind {
                Kind::Context => clReleaseContext(self.raw.cast()),
                Kind::CommandQueue => clReleaseCommandQueue(self.raw.cast()),
                Kind::Buffer => clReleaseMemObject(self.raw.cast()),
                Kind::Event => clReleaseEvent(self.raw.cast()),
                // Platforms and devices are not reference counted.
                Kind::Platform | Kind::Device => 0,
            }
        };
    }
}
