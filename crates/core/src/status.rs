//! Translation between raw OpenFX status integers and [`StatusCode`].
//!
//! Nothing outside this module compares raw integers against status
//! constants. Native calls hand their return value to [`StatusCode::from_raw`]
//! (or [`check`]) and everything downstream works with the enum.

use std::fmt;
use std::str::FromStr;

use ofxkit_ffi::{
    kOfxStatErrBadHandle, kOfxStatErrBadIndex, kOfxStatErrFatal, kOfxStatErrMemory,
    kOfxStatErrMissingHostFeature, kOfxStatErrUnknown, kOfxStatErrUnsupported, kOfxStatErrValue,
    kOfxStatFailed, kOfxStatOK, OfxStatus,
};
use serde::Serialize;

/// Raw value reserved for [`StatusCode::Unused`].
///
/// No OpenFX call ever returns it, so it never collides with a real status.
pub const UNUSED_SENTINEL: OfxStatus = -1;

/// Closed set of outcomes a native call can report.
///
/// Every integer maps to exactly one variant. Integers the standard does not
/// define here (including [`UNUSED_SENTINEL`]) become [`StatusCode::UnknownError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, thiserror::Error)]
#[serde(rename_all = "kebab-case")]
pub enum StatusCode {
    #[error("ok")]
    Ok,
    #[error("operation failed")]
    Failed,
    #[error("fatal error")]
    FatalError,
    #[error("bad handle")]
    BadHandle,
    #[error("bad index")]
    BadIndex,
    #[error("bad value")]
    BadValue,
    #[error("unknown error")]
    UnknownError,
    #[error("out of memory")]
    OutOfMemory,
    #[error("unsupported")]
    Unsupported,
    #[error("missing host feature")]
    MissingHostFeature,
    #[error("unused")]
    Unused,
}

/// How a caller is expected to react to a [`StatusCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    Success,
    /// Handle locally, e.g. retry with another suite version.
    Recoverable,
    /// Propagate unchanged. The native side is in an undefined state.
    Fatal,
    /// Not defined by the standard we know. Treated as recoverable.
    Unknown,
}

impl StatusCode {
    /// All variants, in declaration order.
    pub const ALL: [StatusCode; 11] = [
        StatusCode::Ok,
        StatusCode::Failed,
        StatusCode::FatalError,
        StatusCode::BadHandle,
        StatusCode::BadIndex,
        StatusCode::BadValue,
        StatusCode::UnknownError,
        StatusCode::OutOfMemory,
        StatusCode::Unsupported,
        StatusCode::MissingHostFeature,
        StatusCode::Unused,
    ];

    /// Translate a raw status. Never fails.
    #[must_use]
    #[allow(non_upper_case_globals)]
    pub const fn from_raw(code: OfxStatus) -> Self {
        match code {
            kOfxStatOK => StatusCode::Ok,
            kOfxStatFailed => StatusCode::Failed,
            kOfxStatErrFatal => StatusCode::FatalError,
            kOfxStatErrBadHandle => StatusCode::BadHandle,
            kOfxStatErrBadIndex => StatusCode::BadIndex,
            kOfxStatErrValue => StatusCode::BadValue,
            kOfxStatErrMemory => StatusCode::OutOfMemory,
            kOfxStatErrUnsupported => StatusCode::Unsupported,
            kOfxStatErrMissingHostFeature => StatusCode::MissingHostFeature,
            _ => StatusCode::UnknownError,
        }
    }

    /// The raw integer for this status.
    #[must_use]
    pub const fn to_raw(self) -> OfxStatus {
        match self {
            StatusCode::Ok => kOfxStatOK,
            StatusCode::Failed => kOfxStatFailed,
            StatusCode::FatalError => kOfxStatErrFatal,
            StatusCode::BadHandle => kOfxStatErrBadHandle,
            StatusCode::BadIndex => kOfxStatErrBadIndex,
            StatusCode::BadValue => kOfxStatErrValue,
            StatusCode::UnknownError => kOfxStatErrUnknown,
            StatusCode::OutOfMemory => kOfxStatErrMemory,
            StatusCode::Unsupported => kOfxStatErrUnsupported,
            StatusCode::MissingHostFeature => kOfxStatErrMissingHostFeature,
            StatusCode::Unused => UNUSED_SENTINEL,
        }
    }

    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, StatusCode::Ok)
    }

    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            StatusCode::Ok => Severity::Success,
            StatusCode::Failed
            | StatusCode::BadValue
            | StatusCode::BadIndex
            | StatusCode::BadHandle
            | StatusCode::Unsupported => Severity::Recoverable,
            StatusCode::FatalError | StatusCode::OutOfMemory | StatusCode::MissingHostFeature => {
                Severity::Fatal
            }
            StatusCode::UnknownError | StatusCode::Unused => Severity::Unknown,
        }
    }

    #[must_use]
    pub const fn is_fatal(self) -> bool {
        matches!(self.severity(), Severity::Fatal)
    }

    /// True for failures the caller may handle locally, unknown codes included.
    #[must_use]
    pub const fn is_recoverable(self) -> bool {
        matches!(self.severity(), Severity::Recoverable | Severity::Unknown)
    }

    /// The C macro name, e.g. `kOfxStatErrBadHandle`.
    ///
    /// [`StatusCode::Unused`] has no OpenFX macro. Its `kOfxStatUnused` is a
    /// label local to this crate, accepted back by `FromStr`.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            StatusCode::Ok => "kOfxStatOK",
            StatusCode::Failed => "kOfxStatFailed",
            StatusCode::FatalError => "kOfxStatErrFatal",
            StatusCode::BadHandle => "kOfxStatErrBadHandle",
            StatusCode::BadIndex => "kOfxStatErrBadIndex",
            StatusCode::BadValue => "kOfxStatErrValue",
            StatusCode::UnknownError => "kOfxStatErrUnknown",
            StatusCode::OutOfMemory => "kOfxStatErrMemory",
            StatusCode::Unsupported => "kOfxStatErrUnsupported",
            StatusCode::MissingHostFeature => "kOfxStatErrMissingHostFeature",
            StatusCode::Unused => "kOfxStatUnused",
        }
    }

    /// Short kebab-case name, e.g. `bad-handle`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            StatusCode::Ok => "ok",
            StatusCode::Failed => "failed",
            StatusCode::FatalError => "fatal-error",
            StatusCode::BadHandle => "bad-handle",
            StatusCode::BadIndex => "bad-index",
            StatusCode::BadValue => "bad-value",
            StatusCode::UnknownError => "unknown-error",
            StatusCode::OutOfMemory => "out-of-memory",
            StatusCode::Unsupported => "unsupported",
            StatusCode::MissingHostFeature => "missing-host-feature",
            StatusCode::Unused => "unused",
        }
    }

    /// Turn the status into a `Result`, `Ok(())` only for [`StatusCode::Ok`].
    pub fn into_result(self) -> Result<(), StatusCode> {
        if self.is_success() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// Translate a raw status straight into a `Result`.
pub fn check(raw: OfxStatus) -> Result<(), StatusCode> {
    StatusCode::from_raw(raw).into_result()
}

impl From<OfxStatus> for StatusCode {
    fn from(code: OfxStatus) -> Self {
        StatusCode::from_raw(code)
    }
}

impl From<StatusCode> for OfxStatus {
    fn from(status: StatusCode) -> Self {
        status.to_raw()
    }
}

/// Error returned when a string names no status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised status name: {0}")]
pub struct ParseStatusError(String);

impl FromStr for StatusCode {
    type Err = ParseStatusError;

    /// Accepts the C symbol (`kOfxStatErrValue`) or the short name (`bad-value`),
    /// case-insensitively. Integers are not accepted; use [`StatusCode::from_raw`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        StatusCode::ALL
            .into_iter()
            .find(|status| {
                status.symbol().eq_ignore_ascii_case(wanted)
                    || status.name().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| ParseStatusError(wanted.to_string()))
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Success => "success",
            Severity::Recoverable => "recoverable",
            Severity::Fatal => "fatal",
            Severity::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_round_trip_named_variants() {
        for status in StatusCode::ALL {
            if status == StatusCode::Unused {
                continue;
            }
            assert_eq!(StatusCode::from_raw(status.to_raw()), status);
        }
    }

    #[test]
    fn test_unused_sentinel_is_distinct() {
        let sentinel = StatusCode::Unused.to_raw();
        assert_eq!(sentinel, UNUSED_SENTINEL);
        for status in StatusCode::ALL {
            if status != StatusCode::Unused {
                assert_ne!(status.to_raw(), sentinel, "{status:?} collides");
            }
        }
        // The sentinel never comes back from the native side as Unused.
        assert_eq!(StatusCode::from_raw(sentinel), StatusCode::UnknownError);
    }

    #[test]
    fn test_from_raw_is_total() {
        for code in [i32::MIN, -1000, -2, -1, 6, 7, 12, 13, 14, 15, 255, i32::MAX] {
            assert_eq!(StatusCode::from_raw(code), StatusCode::UnknownError, "code {code}");
        }
        // Sweep a window around the defined range.
        for code in -4096..4096 {
            let _ = StatusCode::from_raw(code);
        }
    }

    #[test]
    fn test_is_success_only_for_ok() {
        let successes: Vec<_> = StatusCode::ALL
            .into_iter()
            .filter(|s| s.is_success())
            .collect();
        assert_eq!(successes, vec![StatusCode::Ok]);
    }

    #[test]
    fn test_severity_classification() {
        use Severity::*;
        let expected = [
            (StatusCode::Ok, Success),
            (StatusCode::Failed, Recoverable),
            (StatusCode::FatalError, Fatal),
            (StatusCode::BadHandle, Recoverable),
            (StatusCode::BadIndex, Recoverable),
            (StatusCode::BadValue, Recoverable),
            (StatusCode::UnknownError, Unknown),
            (StatusCode::OutOfMemory, Fatal),
            (StatusCode::Unsupported, Recoverable),
            (StatusCode::MissingHostFeature, Fatal),
            (StatusCode::Unused, Unknown),
        ];
        for (status, severity) in expected {
            assert_eq!(status.severity(), severity, "{status:?}");
        }
        assert!(StatusCode::UnknownError.is_recoverable());
        assert!(!StatusCode::UnknownError.is_success());
        assert!(!StatusCode::FatalError.is_recoverable());
    }

    #[test]
    fn test_check() {
        assert_eq!(check(0), Ok(()));
        assert_eq!(check(9), Err(StatusCode::BadHandle));
        assert_eq!(check(99), Err(StatusCode::UnknownError));
    }

    #[test]
    fn test_parse_symbol_and_name() {
        assert_eq!("kOfxStatErrValue".parse::<StatusCode>(), Ok(StatusCode::BadValue));
        assert_eq!("bad-value".parse::<StatusCode>(), Ok(StatusCode::BadValue));
        assert_eq!("KOFXSTATOK".parse::<StatusCode>(), Ok(StatusCode::Ok));
        assert_eq!(
            " missing-host-feature ".parse::<StatusCode>(),
            Ok(StatusCode::MissingHostFeature)
        );
        assert!("bogus".parse::<StatusCode>().is_err());
        assert!("3".parse::<StatusCode>().is_err());
    }

    #[test]
    fn test_from_raw_matches_header_constants() {
        use ofxkit_ffi::{kOfxStatReplyDefault, kOfxStatReplyNo, kOfxStatReplyYes};

        let pairs = [
            (kOfxStatOK, StatusCode::Ok),
            (kOfxStatFailed, StatusCode::Failed),
            (kOfxStatErrFatal, StatusCode::FatalError),
            (kOfxStatErrUnknown, StatusCode::UnknownError),
            (kOfxStatErrMissingHostFeature, StatusCode::MissingHostFeature),
            (kOfxStatErrUnsupported, StatusCode::Unsupported),
            (kOfxStatErrBadHandle, StatusCode::BadHandle),
            (kOfxStatErrBadIndex, StatusCode::BadIndex),
            (kOfxStatErrValue, StatusCode::BadValue),
            (kOfxStatErrMemory, StatusCode::OutOfMemory),
            (kOfxStatReplyYes, StatusCode::UnknownError),
            (kOfxStatReplyNo, StatusCode::UnknownError),
            (kOfxStatReplyDefault, StatusCode::UnknownError),
        ];
        for (raw, status) in pairs {
            assert_eq!(StatusCode::from_raw(raw), status, "raw {raw}");
        }
    }

    #[test]
    fn test_unused_symbol_is_crate_local() {
        let symbol = StatusCode::Unused.symbol();
        assert_eq!(symbol, "kOfxStatUnused");
        assert_eq!(symbol.parse::<StatusCode>(), Ok(StatusCode::Unused));
        // Not a real status: the sentinel reads back as unknown.
        assert_eq!(
            StatusCode::from_raw(StatusCode::Unused.to_raw()),
            StatusCode::UnknownError
        );
    }

    #[test]
    fn test_display_and_serialize() {
        assert_eq!(StatusCode::OutOfMemory.to_string(), "out of memory");
        assert_eq!(
            serde_json::to_string(&StatusCode::MissingHostFeature).unwrap(),
            "\"missing-host-feature\""
        );
        assert_eq!(Severity::Fatal.to_string(), "fatal");
    }
}
