//! Suite resolution and the single place native tables get called.
//!
//! A [`SuiteRegistry`] is built around a [`SuiteLookup`], the host's
//! `fetchSuite` or anything shaped like it. Resolution checks the requested
//! name and version against the sealed catalogue in [`crate::suite`], asks the
//! host for the table, and validates the pointer once. After that every call
//! goes through [`invoke`], which translates the raw return code and refuses
//! to touch output parameters unless the host reported success.

use std::ffi::{c_int, c_void, CString};
use std::mem::MaybeUninit;

use ofxkit_ffi::{OfxHost, OfxStatus};

use crate::status::{Severity, StatusCode};
use crate::suite::{Suite, SuiteDescriptor, SuiteHandle, SuiteKind, TypedSuite};
use crate::suites::{
    ImageEffectSuite, MemorySuite, MessageSuite, MessageSuiteV2, Messenger, MultiThreadSuite,
    OpenGlRenderSuite, ParameterSuite, ParametricParameterSuite, Progress, ProgressSuite,
    ProgressSuiteV2, PropertySuite, TimeLineSuite,
};

/// Host-side lookup of suite tables by name and version.
///
/// `None` means the host has no such suite. `Some(ptr)` means it answered,
/// and the pointer may still be null.
pub trait SuiteLookup {
    fn fetch_suite(&self, name: &str, version: u32) -> Option<*const c_void>;
}

impl<F> SuiteLookup for F
where
    F: Fn(&str, u32) -> Option<*const c_void>,
{
    fn fetch_suite(&self, name: &str, version: u32) -> Option<*const c_void> {
        self(name, version)
    }
}

/// [`SuiteLookup`] backed by the `OfxHost` record a plugin receives in `setHost`.
#[derive(Debug)]
pub struct HostLookup {
    host: *const OfxHost,
}

impl HostLookup {
    /// Wrap a host record, rejecting null hosts and hosts without `fetchSuite`.
    ///
    /// # Safety
    ///
    /// A non-null `host` must stay valid for as long as the returned value
    /// and any registry built from it are alive.
    pub unsafe fn from_raw(host: *const OfxHost) -> Result<Self, StatusCode> {
        if host.is_null() {
            return Err(StatusCode::BadHandle);
        }
        if (*host).fetchSuite.is_none() {
            return Err(StatusCode::MissingHostFeature);
        }
        Ok(Self { host })
    }
}

impl SuiteLookup for HostLookup {
    fn fetch_suite(&self, name: &str, version: u32) -> Option<*const c_void> {
        let name = CString::new(name).ok()?;
        let version = c_int::try_from(version).ok()?;
        // SAFETY: `from_raw` checked the record and its caller vouched for its lifetime.
        let table = unsafe {
            let host = &*self.host;
            let fetch = host.fetchSuite?;
            fetch(host.host, name.as_ptr(), version)
        };
        // OpenFX hosts answer "no such suite" with null.
        if table.is_null() {
            None
        } else {
            Some(table)
        }
    }
}

/// Whether suite calls may be issued concurrently, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Threading {
    /// No usable multi-thread suite. Callers must serialise suite calls.
    Serialized,
    /// The host runs its own thread pool of this many CPUs.
    HostManaged { cpus: u32 },
}

/// The standard suites an image effect needs, fetched in one go.
///
/// `None` means the host does not provide that suite.
#[derive(Debug, Clone, Copy)]
pub struct HostSuites<'h> {
    pub image_effect: ImageEffectSuite<'h>,
    pub property: PropertySuite<'h>,
    pub parameter: ParameterSuite<'h>,
    pub memory: MemorySuite<'h>,
    pub multi_thread: MultiThreadSuite<'h>,
    pub message: MessageSuite<'h>,
    pub progress: Option<ProgressSuite<'h>>,
    pub time_line: Option<TimeLineSuite<'h>>,
    pub message_v2: Option<MessageSuiteV2<'h>>,
    pub progress_v2: Option<ProgressSuiteV2<'h>>,
    pub parametric_parameter: Option<ParametricParameterSuite<'h>>,
    pub opengl_render: Option<OpenGlRenderSuite<'h>>,
}

/// Resolves suites from one host session.
pub struct SuiteRegistry<L> {
    lookup: L,
}

impl<L: SuiteLookup> SuiteRegistry<L> {
    /// Build a registry around a host lookup.
    ///
    /// # Safety
    ///
    /// Every non-null pointer `lookup` returns for a catalogued name and
    /// version must point to a table of that suite's layout, and stay valid
    /// and unmodified for as long as the registry lives.
    pub unsafe fn new(lookup: L) -> Self {
        Self { lookup }
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    /// Resolve a suite by exact name and version.
    ///
    /// Fails with `Unsupported` when the suite is not catalogued or the host
    /// does not provide it, and with `BadHandle` when the host hands back a
    /// null or misaligned table.
    pub fn resolve(&self, name: &str, version: u32) -> Result<SuiteHandle<'_>, StatusCode> {
        let Some(kind) = SuiteKind::lookup(name, version) else {
            tracing::debug!(suite = name, version, "Suite not in catalogue");
            return Err(StatusCode::Unsupported);
        };

        let Some(table) = self.lookup.fetch_suite(name, version) else {
            tracing::debug!(suite = name, version, "Host does not provide suite");
            return Err(StatusCode::Unsupported);
        };

        if table.is_null() || (table as usize) % kind.table_align() != 0 {
            tracing::warn!(
                suite = name,
                version,
                table = ?table,
                "Host returned an invalid suite table"
            );
            return Err(StatusCode::BadHandle);
        }

        tracing::trace!(suite = name, version, table = ?table, "Resolved suite");
        // SAFETY: the table is non-null and aligned; `new`'s contract covers the layout.
        let suite = unsafe { Suite::from_raw(kind, table) };
        Ok(SuiteHandle::new(SuiteDescriptor::new(name, version), suite))
    }

    /// Resolve a catalogued suite straight into its typed accessor.
    pub fn fetch<'r, S: TypedSuite<'r>>(&'r self) -> Result<S, StatusCode> {
        let kind = S::KIND;
        self.resolve(kind.name(), kind.version())?.get()
    }

    /// Call an entry of `handle`'s table and translate its status.
    ///
    /// `operation` receives the typed table and a pointer to uninitialised
    /// output storage. The output is read only if the call returns
    /// `kOfxStatOK`; any other status comes back as `Err` untouched.
    ///
    /// # Safety
    ///
    /// `operation` must initialise the output whenever it returns `kOfxStatOK`.
    pub unsafe fn call<'r, S, T, F>(
        &'r self,
        handle: &SuiteHandle<'r>,
        operation: F,
    ) -> Result<T, StatusCode>
    where
        S: TypedSuite<'r>,
        F: FnOnce(&'r S::Table, *mut T) -> OfxStatus,
    {
        let table = handle.get::<S>()?.table();
        invoke(|out| operation(table, out))
    }

    /// Resolve the first of `versions` the host provides.
    ///
    /// A recoverable failure (not provided, or an invalid table) moves on to
    /// the next version. A fatal one stops the search. With every version
    /// failing, the last error is returned.
    pub fn negotiate(&self, name: &str, versions: &[u32]) -> Result<SuiteHandle<'_>, StatusCode> {
        let mut last = StatusCode::Unsupported;
        for &version in versions {
            match self.resolve(name, version) {
                Ok(handle) => return Ok(handle),
                Err(status) if status.is_fatal() => return Err(status),
                Err(status) => {
                    tracing::debug!(suite = name, version, %status, "Trying older suite version");
                    last = status;
                }
            }
        }
        Err(last)
    }

    /// The newest message suite the host provides, v2 then v1.
    pub fn fetch_message(&self) -> Result<Messenger<'_>, StatusCode> {
        match self.negotiate(SuiteKind::Message.name(), &[2, 1])?.suite() {
            Suite::MessageV2(suite) => Ok(Messenger::V2(suite)),
            Suite::Message(suite) => Ok(Messenger::V1(suite)),
            _ => Err(StatusCode::BadHandle),
        }
    }

    /// The newest progress suite the host provides, v2 then v1.
    pub fn fetch_progress(&self) -> Result<Progress<'_>, StatusCode> {
        match self.negotiate(SuiteKind::Progress.name(), &[2, 1])?.suite() {
            Suite::ProgressV2(suite) => Ok(Progress::V2(suite)),
            Suite::Progress(suite) => Ok(Progress::V1(suite)),
            _ => Err(StatusCode::BadHandle),
        }
    }

    /// Fetch the standard suites.
    ///
    /// A missing required suite fails the whole fetch. An optional suite the
    /// host does not provide comes back as `None`; any other failure, such as
    /// an invalid table, is still an error.
    pub fn fetch_standard(&self) -> Result<HostSuites<'_>, StatusCode> {
        let suites = HostSuites {
            image_effect: self.fetch()?,
            property: self.fetch()?,
            parameter: self.fetch()?,
            memory: self.fetch()?,
            multi_thread: self.fetch()?,
            message: self.fetch()?,
            progress: optional(self.fetch())?,
            time_line: optional(self.fetch())?,
            message_v2: optional(self.fetch())?,
            progress_v2: optional(self.fetch())?,
            parametric_parameter: optional(self.fetch())?,
            opengl_render: optional(self.fetch())?,
        };
        tracing::debug!(
            progress = suites.progress.is_some(),
            time_line = suites.time_line.is_some(),
            message_v2 = suites.message_v2.is_some(),
            progress_v2 = suites.progress_v2.is_some(),
            parametric = suites.parametric_parameter.is_some(),
            opengl = suites.opengl_render.is_some(),
            "Fetched standard suites"
        );
        Ok(suites)
    }

    /// What the host allows for concurrent suite calls.
    ///
    /// The registry forwards this; it does no locking of its own.
    pub fn threading(&self) -> Threading {
        let cpus = self
            .fetch::<MultiThreadSuite<'_>>()
            .and_then(|suite| suite.num_cpus());
        match cpus {
            Ok(cpus) if cpus > 0 => Threading::HostManaged { cpus },
            _ => Threading::Serialized,
        }
    }
}

/// Absent is fine for an optional suite; a broken one is not.
fn optional<S>(fetched: Result<S, StatusCode>) -> Result<Option<S>, StatusCode> {
    match fetched {
        Ok(suite) => Ok(Some(suite)),
        Err(StatusCode::Unsupported) => Ok(None),
        Err(status) => Err(status),
    }
}

/// Run a native call with one output slot and translate its status.
///
/// # Safety
///
/// `op` must initialise `*out` whenever it returns `kOfxStatOK`.
pub(crate) unsafe fn invoke<T>(op: impl FnOnce(*mut T) -> OfxStatus) -> Result<T, StatusCode> {
    let mut out = MaybeUninit::<T>::uninit();
    let raw = op(out.as_mut_ptr());
    let status = StatusCode::from_raw(raw);
    if !status.is_success() {
        log_failure(raw, status);
        return Err(status);
    }
    Ok(out.assume_init())
}

/// Like [`invoke`] for calls without output parameters.
pub(crate) fn invoke_unit(op: impl FnOnce() -> OfxStatus) -> Result<(), StatusCode> {
    let raw = op();
    let status = StatusCode::from_raw(raw);
    if !status.is_success() {
        log_failure(raw, status);
        return Err(status);
    }
    Ok(())
}

pub(crate) fn log_failure(raw: OfxStatus, status: StatusCode) {
    match status.severity() {
        Severity::Fatal => tracing::error!(raw, status = %status, "Suite call failed fatally"),
        Severity::Unknown => {
            tracing::warn!(raw, "Suite call returned a status this crate does not know")
        }
        _ => tracing::debug!(raw, status = %status, "Suite call failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ofxkit_ffi::{kOfxStatErrFatal, kOfxStatOK};
    use std::cell::Cell;

    #[test]
    fn test_invoke_reads_output_on_success() {
        let result = unsafe {
            invoke(|out: *mut i32| {
                out.write(42);
                kOfxStatOK
            })
        };
        assert_eq!(result, Ok(42));
    }

    #[test]
    fn test_invoke_ignores_output_on_failure() {
        let result = unsafe {
            invoke(|out: *mut i32| {
                out.write(42);
                kOfxStatErrFatal
            })
        };
        assert_eq!(result, Err(StatusCode::FatalError));
    }

    #[test]
    fn test_invoke_unit_maps_unknown() {
        assert_eq!(invoke_unit(|| 77), Err(StatusCode::UnknownError));
        assert_eq!(invoke_unit(|| kOfxStatOK), Ok(()));
    }

    #[test]
    fn test_closure_lookup_is_consulted_once_per_resolve() {
        let calls = Cell::new(0);
        let lookup = |_: &str, _: u32| -> Option<*const c_void> {
            calls.set(calls.get() + 1);
            None
        };
        let registry = unsafe { SuiteRegistry::new(lookup) };
        assert_eq!(
            registry.resolve("OfxPropertySuite", 1).unwrap_err(),
            StatusCode::Unsupported
        );
        // Not in the catalogue: the host is never asked.
        assert_eq!(
            registry.resolve("OfxInteractSuite", 1).unwrap_err(),
            StatusCode::Unsupported
        );
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_host_lookup_rejects_incomplete_hosts() {
        assert_eq!(
            unsafe { HostLookup::from_raw(std::ptr::null()) }.unwrap_err(),
            StatusCode::BadHandle
        );
        let host = OfxHost {
            host: std::ptr::null_mut(),
            fetchSuite: None,
        };
        assert_eq!(
            unsafe { HostLookup::from_raw(&host) }.unwrap_err(),
            StatusCode::MissingHostFeature
        );
    }

    #[test]
    fn test_optional_only_absorbs_unsupported() {
        assert_eq!(optional(Ok(3)), Ok(Some(3)));
        assert_eq!(optional::<u8>(Err(StatusCode::Unsupported)), Ok(None));
        assert_eq!(optional::<u8>(Err(StatusCode::BadHandle)), Err(StatusCode::BadHandle));
        assert_eq!(optional::<u8>(Err(StatusCode::FatalError)), Err(StatusCode::FatalError));
    }

    static PROGRESS_V1: ofxkit_ffi::OfxProgressSuiteV1 = ofxkit_ffi::OfxProgressSuiteV1 {
        progressStart: None,
        progressUpdate: None,
        progressEnd: None,
    };

    #[test]
    fn test_negotiate_falls_back_to_older_version() {
        let asked = std::cell::RefCell::new(Vec::new());
        let lookup = |name: &str, version: u32| -> Option<*const c_void> {
            asked.borrow_mut().push(version);
            match (name, version) {
                ("OfxProgressSuite", 1) => Some(std::ptr::addr_of!(PROGRESS_V1).cast()),
                _ => None,
            }
        };
        let registry = unsafe { SuiteRegistry::new(lookup) };
        let handle = registry.negotiate("OfxProgressSuite", &[2, 1]).unwrap();
        assert_eq!(handle.kind(), SuiteKind::Progress);
        assert_eq!(*asked.borrow(), vec![2, 1]);

        assert_eq!(registry.fetch_progress().unwrap().version(), 1);
        assert_eq!(
            registry.negotiate("OfxProgressSuite", &[3, 2]).unwrap_err(),
            StatusCode::Unsupported
        );
        assert_eq!(
            registry.negotiate("OfxProgressSuite", &[]).unwrap_err(),
            StatusCode::Unsupported
        );
    }

    #[test]
    fn test_negotiate_moves_past_invalid_tables() {
        let lookup = |_: &str, version: u32| -> Option<*const c_void> {
            match version {
                2 => Some(std::ptr::null()),
                _ => Some(std::ptr::addr_of!(PROGRESS_V1).cast()),
            }
        };
        let registry = unsafe { SuiteRegistry::new(lookup) };
        let handle = registry.negotiate("OfxProgressSuite", &[2, 1]).unwrap();
        assert_eq!(handle.descriptor().version(), 1);

        let only_broken = |_: &str, _: u32| -> Option<*const c_void> { Some(std::ptr::null()) };
        let registry = unsafe { SuiteRegistry::new(only_broken) };
        assert_eq!(
            registry.negotiate("OfxProgressSuite", &[2, 1]).unwrap_err(),
            StatusCode::BadHandle
        );
    }
}
