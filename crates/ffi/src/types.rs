//! `#[repr(C)]` shapes that cross the OpenFX boundary.
//!
//! Field names follow the C headers so the tables can be checked against
//! them line by line. Every function entry is an `Option` because hosts are
//! free to leave entries they do not implement as null.

use std::ffi::{c_char, c_double, c_int, c_uint, c_void};

/// Raw status integer returned by every OpenFX call.
pub type OfxStatus = c_int;

/// Time in frames.
pub type OfxTime = c_double;

// ============================================================================
// Opaque handles
// ============================================================================

#[repr(C)]
pub struct OfxPropertySetStruct {
    _private: [u8; 0],
}

#[repr(C)]
pub struct OfxImageEffectStruct {
    _private: [u8; 0],
}

#[repr(C)]
pub struct OfxMutex {
    _private: [u8; 0],
}

#[repr(C)]
pub struct OfxParamSetStruct {
    _private: [u8; 0],
}

#[repr(C)]
pub struct OfxParamStruct {
    _private: [u8; 0],
}

#[repr(C)]
pub struct OfxImageClipStruct {
    _private: [u8; 0],
}

#[repr(C)]
pub struct OfxImageMemoryStruct {
    _private: [u8; 0],
}

pub type OfxPropertySetHandle = *mut OfxPropertySetStruct;
pub type OfxImageEffectHandle = *mut OfxImageEffectStruct;
pub type OfxMutexHandle = *mut OfxMutex;
pub type OfxParamSetHandle = *mut OfxParamSetStruct;
pub type OfxParamHandle = *mut OfxParamStruct;
pub type OfxImageClipHandle = *mut OfxImageClipStruct;
pub type OfxImageMemoryHandle = *mut OfxImageMemoryStruct;

// ============================================================================
// Geometry
// ============================================================================

/// Rectangle in canonical coordinates.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OfxRectD {
    pub x1: c_double,
    pub y1: c_double,
    pub x2: c_double,
    pub y2: c_double,
}

/// Inclusive range of doubles, e.g. a frame range.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OfxRangeD {
    pub min: c_double,
    pub max: c_double,
}

// ============================================================================
// Host and plugin records
// ============================================================================

pub type OfxFetchSuite = unsafe extern "C" fn(
    host: OfxPropertySetHandle,
    suiteName: *const c_char,
    suiteVersion: c_int,
) -> *const c_void;

/// What the host hands a plugin through `setHost`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct OfxHost {
    pub host: OfxPropertySetHandle,
    pub fetchSuite: Option<OfxFetchSuite>,
}

pub type OfxPluginEntryPoint = unsafe extern "C" fn(
    action: *const c_char,
    handle: *const c_void,
    inArgs: OfxPropertySetHandle,
    outArgs: OfxPropertySetHandle,
) -> OfxStatus;

/// One plugin exported by a binary through `OfxGetPlugin`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct OfxPlugin {
    pub pluginApi: *const c_char,
    pub apiVersion: c_int,
    pub pluginIdentifier: *const c_char,
    pub pluginVersionMajor: c_uint,
    pub pluginVersionMinor: c_uint,
    pub setHost: Option<unsafe extern "C" fn(host: *mut OfxHost)>,
    pub mainEntry: Option<OfxPluginEntryPoint>,
}

/// `int OfxGetNumberOfPlugins(void)`
pub type OfxGetNumberOfPluginsFn = unsafe extern "C" fn() -> c_int;

/// `OfxPlugin *OfxGetPlugin(int nth)`
pub type OfxGetPluginFn = unsafe extern "C" fn(nth: c_int) -> *mut OfxPlugin;

// ============================================================================
// Suite tables
// ============================================================================

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct OfxPropertySuiteV1 {
    pub propSetPointer: Option<
        unsafe extern "C" fn(
            properties: OfxPropertySetHandle,
            property: *const c_char,
            index: c_int,
            value: *mut c_void,
        ) -> OfxStatus,
    >,
    pub propSetString: Option<
        unsafe extern "C" fn(
            properties: OfxPropertySetHandle,
            property: *const c_char,
            index: c_int,
            value: *const c_char,
        ) -> OfxStatus,
    >,
    pub propSetDouble: Option<
        unsafe extern "C" fn(
            properties: OfxPropertySetHandle,
            property: *const c_char,
            index: c_int,
            value: c_double,
        ) -> OfxStatus,
    >,
    pub propSetInt: Option<
        unsafe extern "C" fn(
            properties: OfxPropertySetHandle,
            property: *const c_char,
            index: c_int,
            value: c_int,
        ) -> OfxStatus,
    >,
    pub propSetPointerN: Option<
        unsafe extern "C" fn(
            properties: OfxPropertySetHandle,
            property: *const c_char,
            count: c_int,
            value: *const *mut c_void,
        ) -> OfxStatus,
    >,
    pub propSetStringN: Option<
        unsafe extern "C" fn(
            properties: OfxPropertySetHandle,
            property: *const c_char,
            count: c_int,
            value: *const *const c_char,
        ) -> OfxStatus,
    >,
    pub propSetDoubleN: Option<
        unsafe extern "C" fn(
            properties: OfxPropertySetHandle,
            property: *const c_char,
            count: c_int,
            value: *const c_double,
        ) -> OfxStatus,
    >,
    pub propSetIntN: Option<
        unsafe extern "C" fn(
            properties: OfxPropertySetHandle,
            property: *const c_char,
            count: c_int,
            value: *const c_int,
        ) -> OfxStatus,
    >,
    pub propGetPointer: Option<
        unsafe extern "C" fn(
            properties: OfxPropertySetHandle,
            property: *const c_char,
            index: c_int,
            value: *mut *mut c_void,
        ) -> OfxStatus,
    >,
    pub propGetString: Option<
        unsafe extern "C" fn(
            properties: OfxPropertySetHandle,
            property: *const c_char,
            index: c_int,
            value: *mut *mut c_char,
        ) -> OfxStatus,
    >,
    pub propGetDouble: Option<
        unsafe extern "C" fn(
            properties: OfxPropertySetHandle,
            property: *const c_char,
            index: c_int,
            value: *mut c_double,
        ) -> OfxStatus,
    >,
    pub propGetInt: Option<
        unsafe extern "C" fn(
            properties: OfxPropertySetHandle,
            property: *const c_char,
            index: c_int,
            value: *mut c_int,
        ) -> OfxStatus,
    >,
    pub propGetPointerN: Option<
        unsafe extern "C" fn(
            properties: OfxPropertySetHandle,
            property: *const c_char,
            count: c_int,
            value: *mut *mut c_void,
        ) -> OfxStatus,
    >,
    pub propGetStringN: Option<
        unsafe extern "C" fn(
            properties: OfxPropertySetHandle,
            property: *const c_char,
            count: c_int,
            value: *mut *mut c_char,
        ) -> OfxStatus,
    >,
    pub propGetDoubleN: Option<
        unsafe extern "C" fn(
            properties: OfxPropertySetHandle,
            property: *const c_char,
            count: c_int,
            value: *mut c_double,
        ) -> OfxStatus,
    >,
    pub propGetIntN: Option<
        unsafe extern "C" fn(
            properties: OfxPropertySetHandle,
            property: *const c_char,
            count: c_int,
            value: *mut c_int,
        ) -> OfxStatus,
    >,
    pub propReset: Option<
        unsafe extern "C" fn(
            properties: OfxPropertySetHandle,
            property: *const c_char,
        ) -> OfxStatus,
    >,
    pub propGetDimension: Option<
        unsafe extern "C" fn(
            properties: OfxPropertySetHandle,
            property: *const c_char,
            count: *mut c_int,
        ) -> OfxStatus,
    >,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct OfxMemorySuiteV1 {
    pub memoryAlloc: Option<
        unsafe extern "C" fn(
            handle: *mut c_void,
            nBytes: usize,
            allocatedData: *mut *mut c_void,
        ) -> OfxStatus,
    >,
    pub memoryFree: Option<unsafe extern "C" fn(allocatedData: *mut c_void) -> OfxStatus>,
}

pub type OfxThreadFunctionV1 =
    Option<unsafe extern "C" fn(threadIndex: c_uint, threadMax: c_uint, customArg: *mut c_void)>;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct OfxMultiThreadSuiteV1 {
    pub multiThread: Option<
        unsafe extern "C" fn(
            func: OfxThreadFunctionV1,
            nThreads: c_uint,
            customArg: *mut c_void,
        ) -> OfxStatus,
    >,
    pub multiThreadNumCPUs: Option<unsafe extern "C" fn(nCPUs: *mut c_uint) -> OfxStatus>,
    pub multiThreadIndex: Option<unsafe extern "C" fn(threadIndex: *mut c_uint) -> OfxStatus>,
    pub multiThreadIsSpawnedThread: Option<unsafe extern "C" fn() -> c_int>,
    pub mutexCreate:
        Option<unsafe extern "C" fn(mutex: *mut OfxMutexHandle, lockCount: c_int) -> OfxStatus>,
    pub mutexDestroy: Option<unsafe extern "C" fn(mutex: OfxMutexHandle) -> OfxStatus>,
    pub mutexLock: Option<unsafe extern "C" fn(mutex: OfxMutexHandle) -> OfxStatus>,
    pub mutexUnLock: Option<unsafe extern "C" fn(mutex: OfxMutexHandle) -> OfxStatus>,
    pub mutexTryLock: Option<unsafe extern "C" fn(mutex: OfxMutexHandle) -> OfxStatus>,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct OfxMessageSuiteV1 {
    pub message: Option<
        unsafe extern "C" fn(
            handle: *mut c_void,
            messageType: *const c_char,
            messageId: *const c_char,
            format: *const c_char,
            ...
        ) -> OfxStatus,
    >,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct OfxProgressSuiteV1 {
    pub progressStart:
        Option<
            unsafe extern "C" fn(effectInstance: *mut c_void, label: *const c_char) -> OfxStatus,
        >,
    pub progressUpdate:
        Option<unsafe extern "C" fn(effectInstance: *mut c_void, progress: c_double) -> OfxStatus>,
    pub progressEnd: Option<unsafe extern "C" fn(effectInstance: *mut c_void) -> OfxStatus>,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct OfxTimeLineSuiteV1 {
    pub getTime:
        Option<unsafe extern "C" fn(instance: *mut c_void, time: *mut c_double) -> OfxStatus>,
    pub gotoTime: Option<unsafe extern "C" fn(instance: *mut c_void, time: c_double) -> OfxStatus>,
    pub getTimeBounds: Option<
        unsafe extern "C" fn(
            instance: *mut c_void,
            firstTime: *mut c_double,
            lastTime: *mut c_double,
        ) -> OfxStatus,
    >,
}

// ============================================================================
// Image effect suites (ofxImageEffect.h, ofxParam.h, ofxParametricParam.h,
// ofxOpenGLRender.h)
// ============================================================================

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct OfxImageEffectSuiteV1 {
    pub getPropertySet: Option<
        unsafe extern "C" fn(
            imageEffect: OfxImageEffectHandle,
            propHandle: *mut OfxPropertySetHandle,
        ) -> OfxStatus,
    >,
    pub getParamSet: Option<
        unsafe extern "C" fn(
            imageEffect: OfxImageEffectHandle,
            paramSet: *mut OfxParamSetHandle,
        ) -> OfxStatus,
    >,
    pub clipDefine: Option<
        unsafe extern "C" fn(
            imageEffect: OfxImageEffectHandle,
            name: *const c_char,
            propertySet: *mut OfxPropertySetHandle,
        ) -> OfxStatus,
    >,
    pub clipGetHandle: Option<
        unsafe extern "C" fn(
            imageEffect: OfxImageEffectHandle,
            name: *const c_char,
            clip: *mut OfxImageClipHandle,
            propertySet: *mut OfxPropertySetHandle,
        ) -> OfxStatus,
    >,
    pub clipGetPropertySet: Option<
        unsafe extern "C" fn(
            clip: OfxImageClipHandle,
            propHandle: *mut OfxPropertySetHandle,
        ) -> OfxStatus,
    >,
    pub clipGetImage: Option<
        unsafe extern "C" fn(
            clip: OfxImageClipHandle,
            time: OfxTime,
            region: *const OfxRectD,
            imageHandle: *mut OfxPropertySetHandle,
        ) -> OfxStatus,
    >,
    pub clipReleaseImage:
        Option<unsafe extern "C" fn(imageHandle: OfxPropertySetHandle) -> OfxStatus>,
    pub clipGetRegionOfDefinition: Option<
        unsafe extern "C" fn(
            clip: OfxImageClipHandle,
            time: OfxTime,
            bounds: *mut OfxRectD,
        ) -> OfxStatus,
    >,
    pub abort: Option<unsafe extern "C" fn(imageEffect: OfxImageEffectHandle) -> c_int>,
    pub imageMemoryAlloc: Option<
        unsafe extern "C" fn(
            instanceHandle: OfxImageEffectHandle,
            nBytes: usize,
            memoryHandle: *mut OfxImageMemoryHandle,
        ) -> OfxStatus,
    >,
    pub imageMemoryFree:
        Option<unsafe extern "C" fn(memoryHandle: OfxImageMemoryHandle) -> OfxStatus>,
    pub imageMemoryLock: Option<
        unsafe extern "C" fn(
            memoryHandle: OfxImageMemoryHandle,
            returnedPtr: *mut *mut c_void,
        ) -> OfxStatus,
    >,
    pub imageMemoryUnlock:
        Option<unsafe extern "C" fn(memoryHandle: OfxImageMemoryHandle) -> OfxStatus>,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct OfxParameterSuiteV1 {
    pub paramDefine: Option<
        unsafe extern "C" fn(
            paramSet: OfxParamSetHandle,
            paramType: *const c_char,
            name: *const c_char,
            propertySet: *mut OfxPropertySetHandle,
        ) -> OfxStatus,
    >,
    pub paramGetHandle: Option<
        unsafe extern "C" fn(
            paramSet: OfxParamSetHandle,
            name: *const c_char,
            param: *mut OfxParamHandle,
            propertySet: *mut OfxPropertySetHandle,
        ) -> OfxStatus,
    >,
    pub paramSetGetPropertySet: Option<
        unsafe extern "C" fn(
            paramSet: OfxParamSetHandle,
            propHandle: *mut OfxPropertySetHandle,
        ) -> OfxStatus,
    >,
    pub paramGetPropertySet: Option<
        unsafe extern "C" fn(
            param: OfxParamHandle,
            propHandle: *mut OfxPropertySetHandle,
        ) -> OfxStatus,
    >,
    pub paramGetValue: Option<unsafe extern "C" fn(paramHandle: OfxParamHandle, ...) -> OfxStatus>,
    pub paramGetValueAtTime:
        Option<unsafe extern "C" fn(paramHandle: OfxParamHandle, time: OfxTime, ...) -> OfxStatus>,
    pub paramGetDerivative:
        Option<unsafe extern "C" fn(paramHandle: OfxParamHandle, time: OfxTime, ...) -> OfxStatus>,
    pub paramGetIntegral: Option<
        unsafe extern "C" fn(
            paramHandle: OfxParamHandle,
            time1: OfxTime,
            time2: OfxTime,
            ...
        ) -> OfxStatus,
    >,
    pub paramSetValue: Option<unsafe extern "C" fn(paramHandle: OfxParamHandle, ...) -> OfxStatus>,
    pub paramSetValueAtTime:
        Option<unsafe extern "C" fn(paramHandle: OfxParamHandle, time: OfxTime, ...) -> OfxStatus>,
    pub paramGetNumKeys: Option<
        unsafe extern "C" fn(paramHandle: OfxParamHandle, numberOfKeys: *mut c_uint) -> OfxStatus,
    >,
    pub paramGetKeyTime: Option<
        unsafe extern "C" fn(
            paramHandle: OfxParamHandle,
            nthKey: c_uint,
            time: *mut OfxTime,
        ) -> OfxStatus,
    >,
    pub paramGetKeyIndex: Option<
        unsafe extern "C" fn(
            paramHandle: OfxParamHandle,
            time: OfxTime,
            direction: c_int,
            index: *mut c_int,
        ) -> OfxStatus,
    >,
    pub paramDeleteKey:
        Option<unsafe extern "C" fn(paramHandle: OfxParamHandle, time: OfxTime) -> OfxStatus>,
    pub paramDeleteAllKeys: Option<unsafe extern "C" fn(paramHandle: OfxParamHandle) -> OfxStatus>,
    pub paramCopy: Option<
        unsafe extern "C" fn(
            paramTo: OfxParamHandle,
            paramFrom: OfxParamHandle,
            dstOffset: OfxTime,
            frameRange: *const OfxRangeD,
        ) -> OfxStatus,
    >,
    pub paramEditBegin:
        Option<unsafe extern "C" fn(paramSet: OfxParamSetHandle, name: *const c_char) -> OfxStatus>,
    pub paramEditEnd: Option<unsafe extern "C" fn(paramSet: OfxParamSetHandle) -> OfxStatus>,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct OfxParametricParameterSuiteV1 {
    pub parametricParamGetValue: Option<
        unsafe extern "C" fn(
            param: OfxParamHandle,
            curveIndex: c_int,
            time: OfxTime,
            parametricPosition: c_double,
            returnValue: *mut c_double,
        ) -> OfxStatus,
    >,
    pub parametricParamGetNControlPoints: Option<
        unsafe extern "C" fn(
            param: OfxParamHandle,
            curveIndex: c_int,
            time: c_double,
            returnValue: *mut c_int,
        ) -> OfxStatus,
    >,
    pub parametricParamGetNthControlPoint: Option<
        unsafe extern "C" fn(
            param: OfxParamHandle,
            curveIndex: c_int,
            time: c_double,
            nthCtl: c_int,
            key: *mut c_double,
            value: *mut c_double,
        ) -> OfxStatus,
    >,
    pub parametricParamSetNthControlPoint: Option<
        unsafe extern "C" fn(
            param: OfxParamHandle,
            curveIndex: c_int,
            time: c_double,
            nthCtl: c_int,
            key: c_double,
            value: c_double,
            addAnimationKey: bool,
        ) -> OfxStatus,
    >,
    pub parametricParamAddControlPoint: Option<
        unsafe extern "C" fn(
            param: OfxParamHandle,
            curveIndex: c_int,
            time: c_double,
            key: c_double,
            value: c_double,
            addAnimationKey: bool,
        ) -> OfxStatus,
    >,
    pub parametricParamDeleteControlPoint: Option<
        unsafe extern "C" fn(
            param: OfxParamHandle,
            curveIndex: c_int,
            nthCtl: c_int,
        ) -> OfxStatus,
    >,
    pub parametricParamDeleteAllControlPoints:
        Option<unsafe extern "C" fn(param: OfxParamHandle, curveIndex: c_int) -> OfxStatus>,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct OfxImageEffectOpenGLRenderSuiteV1 {
    pub clipLoadTexture: Option<
        unsafe extern "C" fn(
            clip: OfxImageClipHandle,
            time: OfxTime,
            format: *const c_char,
            region: *const OfxRectD,
            textureHandle: *mut OfxPropertySetHandle,
        ) -> OfxStatus,
    >,
    pub clipFreeTexture:
        Option<unsafe extern "C" fn(textureHandle: OfxPropertySetHandle) -> OfxStatus>,
    pub flushResources: Option<unsafe extern "C" fn() -> OfxStatus>,
}

// ============================================================================
// Version 2 of the message and progress suites
// ============================================================================

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct OfxMessageSuiteV2 {
    pub message: Option<
        unsafe extern "C" fn(
            handle: *mut c_void,
            messageType: *const c_char,
            messageId: *const c_char,
            format: *const c_char,
            ...
        ) -> OfxStatus,
    >,
    pub setPersistentMessage: Option<
        unsafe extern "C" fn(
            handle: *mut c_void,
            messageType: *const c_char,
            messageId: *const c_char,
            format: *const c_char,
            ...
        ) -> OfxStatus,
    >,
    pub clearPersistentMessage: Option<unsafe extern "C" fn(handle: *mut c_void) -> OfxStatus>,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct OfxProgressSuiteV2 {
    pub progressStart: Option<
        unsafe extern "C" fn(
            effectInstance: *mut c_void,
            message: *const c_char,
            messageId: *const c_char,
        ) -> OfxStatus,
    >,
    pub progressUpdate:
        Option<unsafe extern "C" fn(effectInstance: *mut c_void, progress: c_double) -> OfxStatus>,
    pub progressEnd: Option<unsafe extern "C" fn(effectInstance: *mut c_void) -> OfxStatus>,
}
