//! Typed accessors over the host's suite tables.
//!
//! Each accessor borrows a table the registry validated at resolve time and
//! turns its entries into Rust methods returning `Result<_, StatusCode>`.
//! An entry the host left null fails with `MissingHostFeature`.

/// Pull a function entry out of a suite table.
macro_rules! entry {
    ($table:expr, $field:ident) => {
        match $table.$field {
            Some(f) => f,
            None => {
                tracing::debug!(entry = stringify!($field), "Host left suite entry null");
                return Err($crate::StatusCode::MissingHostFeature);
            }
        }
    };
}

mod effect;
mod memory;
mod message;
mod param;
mod progress;
mod property;
mod thread;
mod timeline;

pub use effect::{ClipImage, ImageEffectSuite, ImageMemory, OpenGlRenderSuite};
pub use memory::{HostAllocation, MemorySuite};
pub use message::{MessageSuite, MessageSuiteV2, MessageType, Messenger, Reply};
pub use param::{KeySearch, ParameterSuite, ParametricParameterSuite};
pub use progress::{Progress, ProgressSuite, ProgressSuiteV2};
pub use property::PropertySuite;
pub use thread::{HostMutex, MultiThreadSuite};
pub use timeline::TimeLineSuite;

use std::ffi::{c_void, CString};
use std::ptr;

use ofxkit_ffi::{
    OfxImageClipHandle, OfxImageEffectHandle, OfxParamHandle, OfxParamSetHandle,
    OfxPropertySetHandle,
};

use crate::StatusCode;

/// Declare a `Copy` newtype over a raw host handle.
macro_rules! host_handle {
    ($(#[$meta:meta])* $name:ident($raw:ty)) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name($raw);

        impl $name {
            /// # Safety
            ///
            /// `handle` must be issued by the same host and stay valid for
            /// every call it is passed to.
            pub unsafe fn from_raw(handle: $raw) -> Self {
                Self(handle)
            }

            pub fn as_raw(&self) -> $raw {
                self.0
            }
        }
    };
}

host_handle!(
    /// A host property set, as passed to actions or returned by other suites.
    PropertySet(OfxPropertySetHandle)
);
host_handle!(
    /// An image effect instance or descriptor.
    ImageEffect(OfxImageEffectHandle)
);
host_handle!(
    /// The parameter set of an effect.
    ParamSet(OfxParamSetHandle)
);
host_handle!(Param(OfxParamHandle));
host_handle!(Clip(OfxImageClipHandle));

/// An opaque host object: effect instance, interact, or similar.
///
/// [`InstanceHandle::NONE`] stands for the null handle some entries accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceHandle(*mut c_void);

impl InstanceHandle {
    pub const NONE: InstanceHandle = InstanceHandle(ptr::null_mut());

    /// # Safety
    ///
    /// `handle` must be null or a handle issued by the same host, valid for
    /// every call it is passed to.
    pub unsafe fn from_raw(handle: *mut c_void) -> Self {
        Self(handle)
    }

    pub fn as_raw(&self) -> *mut c_void {
        self.0
    }
}

/// Convert text for the host, rejecting interior NULs as a bad value.
pub(crate) fn to_c_string(text: &str) -> Result<CString, StatusCode> {
    CString::new(text).map_err(|_| StatusCode::BadValue)
}
