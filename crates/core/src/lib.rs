//! ofxkit core
//!
//! A typed boundary over the OpenFX plugin ABI. Raw integer status codes
//! become [`StatusCode`], and suite tables fetched from a host become typed
//! accessors resolved through a [`SuiteRegistry`].
//!
//! # Quick Start
//!
//! ```
//! use ofxkit_core::{Severity, StatusCode};
//!
//! let status = StatusCode::from_raw(9);
//! assert_eq!(status, StatusCode::BadHandle);
//! assert_eq!(status.severity(), Severity::Recoverable);
//!
//! // Anything the standard does not define is an unknown error, never success.
//! assert_eq!(StatusCode::from_raw(1234), StatusCode::UnknownError);
//! ```
//!
//! # Resolving Suites
//!
//! A registry wraps whatever the host offers for suite lookup, usually the
//! `fetchSuite` of the `OfxHost` passed to `setHost`:
//!
//! ```no_run
//! use ofxkit_core::{HostLookup, PropertySuite, SuiteRegistry};
//! # fn set_host(host: *mut ofxkit_ffi::OfxHost) -> Result<(), ofxkit_core::StatusCode> {
//! let registry = unsafe { SuiteRegistry::new(HostLookup::from_raw(host)?) };
//! let props: PropertySuite<'_> = registry.fetch()?;
//! # let _ = props;
//! # Ok(())
//! # }
//! ```

pub mod discovery;
pub mod loader;
pub mod registry;
pub mod status;
pub mod suite;
pub mod suites;

pub use discovery::PluginBundle;
pub use loader::{LoadError, PluginBinary, PluginInfo};
pub use registry::{HostLookup, HostSuites, SuiteLookup, SuiteRegistry, Threading};
pub use status::{check, ParseStatusError, Severity, StatusCode, UNUSED_SENTINEL};
pub use suite::{Suite, SuiteDescriptor, SuiteHandle, SuiteKind, TypedSuite};
pub use suites::{
    Clip, ClipImage, HostAllocation, HostMutex, ImageEffect, ImageEffectSuite, ImageMemory,
    InstanceHandle, KeySearch, MemorySuite, MessageSuite, MessageSuiteV2, MessageType, Messenger,
    MultiThreadSuite, OpenGlRenderSuite, Param, ParamSet, ParameterSuite, ParametricParameterSuite,
    Progress, ProgressSuite, ProgressSuiteV2, PropertySet, PropertySuite, Reply, TimeLineSuite,
};
