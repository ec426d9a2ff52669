//! Raw C ABI of the OpenFX plugin standard.
//!
//! Only the parts that cross the boundary handled by `ofxkit-core` live here:
//! status integers, the host and plugin records, and the function tables of
//! the suites the core crate knows how to type. Everything is plain data;
//! there is no behaviour in this crate.

#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]

mod types;

pub use types::*;

use std::ffi::CStr;

// =============================================================================
// Status codes (ofxCore.h)
// =============================================================================

pub const kOfxStatOK: OfxStatus = 0;
pub const kOfxStatFailed: OfxStatus = 1;
pub const kOfxStatErrFatal: OfxStatus = 2;
pub const kOfxStatErrUnknown: OfxStatus = 3;
pub const kOfxStatErrMissingHostFeature: OfxStatus = 4;
pub const kOfxStatErrUnsupported: OfxStatus = 5;
pub const kOfxStatErrExists: OfxStatus = 6;
pub const kOfxStatErrFormat: OfxStatus = 7;
pub const kOfxStatErrMemory: OfxStatus = 8;
pub const kOfxStatErrBadHandle: OfxStatus = 9;
pub const kOfxStatErrBadIndex: OfxStatus = 10;
pub const kOfxStatErrValue: OfxStatus = 11;
pub const kOfxStatReplyYes: OfxStatus = 12;
pub const kOfxStatReplyNo: OfxStatus = 13;
pub const kOfxStatReplyDefault: OfxStatus = 14;

// =============================================================================
// Suite names
// =============================================================================

pub const kOfxPropertySuite: &CStr = c"OfxPropertySuite";
pub const kOfxMemorySuite: &CStr = c"OfxMemorySuite";
pub const kOfxMultiThreadSuite: &CStr = c"OfxMultiThreadSuite";
pub const kOfxMessageSuite: &CStr = c"OfxMessageSuite";
pub const kOfxProgressSuite: &CStr = c"OfxProgressSuite";
pub const kOfxTimeLineSuite: &CStr = c"OfxTimeLineSuite";
pub const kOfxImageEffectSuite: &CStr = c"OfxImageEffectSuite";
pub const kOfxParameterSuite: &CStr = c"OfxParameterSuite";
pub const kOfxParametricParameterSuite: &CStr = c"OfxParametricParameterSuite";
pub const kOfxOpenGLRenderSuite: &CStr = c"OfxImageEffectOpenGLRenderSuite";

// =============================================================================
// Parameter types (ofxParam.h)
// =============================================================================

pub const kOfxParamTypeInteger: &CStr = c"OfxParamTypeInteger";
pub const kOfxParamTypeDouble: &CStr = c"OfxParamTypeDouble";
pub const kOfxParamTypeBoolean: &CStr = c"OfxParamTypeBoolean";
pub const kOfxParamTypeChoice: &CStr = c"OfxParamTypeChoice";
pub const kOfxParamTypeString: &CStr = c"OfxParamTypeString";
pub const kOfxParamTypeGroup: &CStr = c"OfxParamTypeGroup";
pub const kOfxParamTypePage: &CStr = c"OfxParamTypePage";
pub const kOfxParamTypePushButton: &CStr = c"OfxParamTypePushButton";

// =============================================================================
// Message types (ofxMessage.h)
// =============================================================================

pub const kOfxMessageFatal: &CStr = c"OfxMessageFatal";
pub const kOfxMessageError: &CStr = c"OfxMessageError";
pub const kOfxMessageWarning: &CStr = c"OfxMessageWarning";
pub const kOfxMessageMessage: &CStr = c"OfxMessageMessage";
pub const kOfxMessageLog: &CStr = c"OfxMessageLog";
pub const kOfxMessageQuestion: &CStr = c"OfxMessageQuestion";

// =============================================================================
// Binary entry points and plugin APIs
// =============================================================================

/// Symbol names exported by every plugin binary, NUL-terminated for `dlsym`.
pub const OFX_GET_NUMBER_OF_PLUGINS_SYMBOL: &[u8] = b"OfxGetNumberOfPlugins\0";
pub const OFX_GET_PLUGIN_SYMBOL: &[u8] = b"OfxGetPlugin\0";

pub const kOfxImageEffectPluginApi: &CStr = c"OfxImageEffectPluginAPI";
pub const kOfxImageEffectPluginApiVersion: i32 = 1;

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{align_of, size_of};

    #[test]
    fn test_status_values_are_distinct() {
        let all = [
            kOfxStatOK,
            kOfxStatFailed,
            kOfxStatErrFatal,
            kOfxStatErrUnknown,
            kOfxStatErrMissingHostFeature,
            kOfxStatErrUnsupported,
            kOfxStatErrExists,
            kOfxStatErrFormat,
            kOfxStatErrMemory,
            kOfxStatErrBadHandle,
            kOfxStatErrBadIndex,
            kOfxStatErrValue,
            kOfxStatReplyYes,
            kOfxStatReplyNo,
            kOfxStatReplyDefault,
        ];
        for (i, a) in all.iter().enumerate() {
            assert!(all[i + 1..].iter().all(|b| a != b), "duplicate status {a}");
        }
    }

    #[test]
    fn test_tables_are_arrays_of_pointers() {
        let ptr = size_of::<usize>();
        assert_eq!(size_of::<OfxPropertySuiteV1>(), 18 * ptr);
        assert_eq!(size_of::<OfxMemorySuiteV1>(), 2 * ptr);
        assert_eq!(size_of::<OfxMultiThreadSuiteV1>(), 9 * ptr);
        assert_eq!(size_of::<OfxMessageSuiteV1>(), ptr);
        assert_eq!(size_of::<OfxProgressSuiteV1>(), 3 * ptr);
        assert_eq!(size_of::<OfxTimeLineSuiteV1>(), 3 * ptr);
        assert_eq!(size_of::<OfxImageEffectSuiteV1>(), 13 * ptr);
        assert_eq!(size_of::<OfxParameterSuiteV1>(), 18 * ptr);
        assert_eq!(size_of::<OfxParametricParameterSuiteV1>(), 7 * ptr);
        assert_eq!(size_of::<OfxImageEffectOpenGLRenderSuiteV1>(), 3 * ptr);
        assert_eq!(size_of::<OfxMessageSuiteV2>(), 3 * ptr);
        assert_eq!(size_of::<OfxProgressSuiteV2>(), 3 * ptr);
        assert_eq!(size_of::<OfxRectD>(), 4 * size_of::<f64>());
        assert_eq!(align_of::<OfxPropertySuiteV1>(), align_of::<usize>());
        assert_eq!(size_of::<OfxHost>(), 2 * ptr);
    }

    #[test]
    fn test_symbols_are_nul_terminated() {
        assert_eq!(OFX_GET_NUMBER_OF_PLUGINS_SYMBOL.last(), Some(&0));
        assert_eq!(OFX_GET_PLUGIN_SYMBOL.last(), Some(&0));
    }
}
