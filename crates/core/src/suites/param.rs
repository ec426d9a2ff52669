//! `OfxParameterSuite` v1 and `OfxParametricParameterSuite` v1.
//!
//! Value getters and setters go through the host's variadic entries, so
//! each method fixes the C type the parameter kind expects: `int` for
//! integer, boolean and choice parameters, `double` for double parameters.

use std::ffi::{c_double, c_int, c_uint, CStr};
use std::ptr::{self, addr_of_mut};

use ofxkit_ffi::{
    OfxParamHandle, OfxParameterSuiteV1, OfxParametricParameterSuiteV1, OfxPropertySetHandle,
    OfxRangeD, OfxTime,
};

use super::{to_c_string, Param, ParamSet, PropertySet};
use crate::registry::{invoke, invoke_unit};
use crate::StatusCode;

/// Which keyframe [`ParameterSuite::key_index`] looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySearch {
    Previous,
    At,
    Next,
}

impl KeySearch {
    fn direction(self) -> c_int {
        match self {
            KeySearch::Previous => -1,
            KeySearch::At => 0,
            KeySearch::Next => 1,
        }
    }
}

/// Defines, reads and animates effect parameters.
#[derive(Debug, Clone, Copy)]
pub struct ParameterSuite<'h> {
    table: &'h OfxParameterSuiteV1,
}

impl<'h> ParameterSuite<'h> {
    pub(crate) fn new(table: &'h OfxParameterSuiteV1) -> Self {
        Self { table }
    }

    pub(crate) fn raw(&self) -> &'h OfxParameterSuiteV1 {
        self.table
    }

    /// Define a parameter of type `kind` (a `kOfxParamType*` string).
    pub fn define(
        &self,
        set: ParamSet,
        kind: &CStr,
        name: &str,
    ) -> Result<PropertySet, StatusCode> {
        let define = entry!(self.table, paramDefine);
        let name = to_c_string(name)?;
        // SAFETY: paramDefine writes the parameter's property set on success.
        let raw =
            unsafe { invoke(|out| define(set.as_raw(), kind.as_ptr(), name.as_ptr(), out)) }?;
        Ok(PropertySet(raw))
    }

    /// Look up a parameter and its property set by name.
    pub fn param(&self, set: ParamSet, name: &str) -> Result<(Param, PropertySet), StatusCode> {
        let get = entry!(self.table, paramGetHandle);
        let name = to_c_string(name)?;
        // SAFETY: paramGetHandle writes the handle and property set on success.
        let (param, props) = unsafe {
            invoke(|out: *mut (OfxParamHandle, OfxPropertySetHandle)| {
                get(
                    set.as_raw(),
                    name.as_ptr(),
                    addr_of_mut!((*out).0),
                    addr_of_mut!((*out).1),
                )
            })
        }?;
        Ok((Param(param), PropertySet(props)))
    }

    pub fn set_property_set(&self, set: ParamSet) -> Result<PropertySet, StatusCode> {
        let get = entry!(self.table, paramSetGetPropertySet);
        // SAFETY: paramSetGetPropertySet writes the handle on success.
        let raw = unsafe { invoke(|out| get(set.as_raw(), out)) }?;
        Ok(PropertySet(raw))
    }

    pub fn property_set(&self, param: Param) -> Result<PropertySet, StatusCode> {
        let get = entry!(self.table, paramGetPropertySet);
        // SAFETY: paramGetPropertySet writes the handle on success.
        let raw = unsafe { invoke(|out| get(param.as_raw(), out)) }?;
        Ok(PropertySet(raw))
    }

    /// Value of an integer or choice parameter at the current time.
    pub fn get_int(&self, param: Param) -> Result<i32, StatusCode> {
        let get = entry!(self.table, paramGetValue);
        // SAFETY: an integer parameter writes one int through the pointer on success.
        unsafe { invoke(|out: *mut c_int| get(param.as_raw(), out)) }
    }

    pub fn get_bool(&self, param: Param) -> Result<bool, StatusCode> {
        self.get_int(param).map(|v| v != 0)
    }

    pub fn get_double(&self, param: Param) -> Result<f64, StatusCode> {
        let get = entry!(self.table, paramGetValue);
        // SAFETY: a double parameter writes one double through the pointer on success.
        unsafe { invoke(|out: *mut c_double| get(param.as_raw(), out)) }
    }

    /// Value of a 2D double parameter.
    pub fn get_double2d(&self, param: Param) -> Result<(f64, f64), StatusCode> {
        let get = entry!(self.table, paramGetValue);
        // SAFETY: a 2D double parameter writes both components on success.
        unsafe {
            invoke(|out: *mut (c_double, c_double)| {
                get(param.as_raw(), addr_of_mut!((*out).0), addr_of_mut!((*out).1))
            })
        }
    }

    pub fn get_int_at(&self, param: Param, time: OfxTime) -> Result<i32, StatusCode> {
        let get = entry!(self.table, paramGetValueAtTime);
        // SAFETY: as in get_int.
        unsafe { invoke(|out: *mut c_int| get(param.as_raw(), time, out)) }
    }

    pub fn get_double_at(&self, param: Param, time: OfxTime) -> Result<f64, StatusCode> {
        let get = entry!(self.table, paramGetValueAtTime);
        // SAFETY: as in get_double.
        unsafe { invoke(|out: *mut c_double| get(param.as_raw(), time, out)) }
    }

    /// Rate of change of a double parameter at `time`.
    pub fn derivative(&self, param: Param, time: OfxTime) -> Result<f64, StatusCode> {
        let get = entry!(self.table, paramGetDerivative);
        // SAFETY: as in get_double.
        unsafe { invoke(|out: *mut c_double| get(param.as_raw(), time, out)) }
    }

    /// Integral of a double parameter between two times.
    pub fn integral(&self, param: Param, from: OfxTime, to: OfxTime) -> Result<f64, StatusCode> {
        let get = entry!(self.table, paramGetIntegral);
        // SAFETY: as in get_double.
        unsafe { invoke(|out: *mut c_double| get(param.as_raw(), from, to, out)) }
    }

    pub fn set_int(&self, param: Param, value: i32) -> Result<(), StatusCode> {
        let set = entry!(self.table, paramSetValue);
        invoke_unit(|| unsafe { set(param.as_raw(), value) })
    }

    pub fn set_bool(&self, param: Param, value: bool) -> Result<(), StatusCode> {
        self.set_int(param, c_int::from(value))
    }

    pub fn set_double(&self, param: Param, value: f64) -> Result<(), StatusCode> {
        let set = entry!(self.table, paramSetValue);
        invoke_unit(|| unsafe { set(param.as_raw(), value) })
    }

    /// Set a keyframe on an integer parameter.
    pub fn set_int_at(&self, param: Param, time: OfxTime, value: i32) -> Result<(), StatusCode> {
        let set = entry!(self.table, paramSetValueAtTime);
        invoke_unit(|| unsafe { set(param.as_raw(), time, value) })
    }

    /// Set a keyframe on a double parameter.
    pub fn set_double_at(&self, param: Param, time: OfxTime, value: f64) -> Result<(), StatusCode> {
        let set = entry!(self.table, paramSetValueAtTime);
        invoke_unit(|| unsafe { set(param.as_raw(), time, value) })
    }

    pub fn num_keys(&self, param: Param) -> Result<u32, StatusCode> {
        let get = entry!(self.table, paramGetNumKeys);
        // SAFETY: paramGetNumKeys writes the count on success.
        unsafe { invoke(|out: *mut c_uint| get(param.as_raw(), out)) }
    }

    /// Time of the `nth` keyframe. Out of range is `BadIndex`.
    pub fn key_time(&self, param: Param, nth: u32) -> Result<OfxTime, StatusCode> {
        let get = entry!(self.table, paramGetKeyTime);
        // SAFETY: paramGetKeyTime writes the time on success.
        unsafe { invoke(|out| get(param.as_raw(), nth, out)) }
    }

    /// Index of the keyframe at, before or after `time`.
    ///
    /// `None` when there is no such key; the host reports that as `Failed`.
    pub fn key_index(
        &self,
        param: Param,
        time: OfxTime,
        search: KeySearch,
    ) -> Result<Option<u32>, StatusCode> {
        let get = entry!(self.table, paramGetKeyIndex);
        // SAFETY: paramGetKeyIndex writes the index on success.
        let found = unsafe {
            invoke(|out: *mut c_int| get(param.as_raw(), time, search.direction(), out))
        };
        match found {
            Ok(index) => u32::try_from(index).map(Some).map_err(|_| StatusCode::BadIndex),
            Err(StatusCode::Failed) => Ok(None),
            Err(status) => Err(status),
        }
    }

    pub fn delete_key(&self, param: Param, time: OfxTime) -> Result<(), StatusCode> {
        let delete = entry!(self.table, paramDeleteKey);
        invoke_unit(|| unsafe { delete(param.as_raw(), time) })
    }

    pub fn delete_all_keys(&self, param: Param) -> Result<(), StatusCode> {
        let delete = entry!(self.table, paramDeleteAllKeys);
        invoke_unit(|| unsafe { delete(param.as_raw()) })
    }

    /// Copy the animation of `from` onto `to`, shifted by `offset`, limited
    /// to `range` when given.
    pub fn copy(
        &self,
        to: Param,
        from: Param,
        offset: OfxTime,
        range: Option<&OfxRangeD>,
    ) -> Result<(), StatusCode> {
        let copy = entry!(self.table, paramCopy);
        let range = range.map_or(ptr::null(), |r| r as *const OfxRangeD);
        invoke_unit(|| unsafe { copy(to.as_raw(), from.as_raw(), offset, range) })
    }

    /// Open an undo block named `name`. Close it with [`ParameterSuite::edit_end`].
    pub fn edit_begin(&self, set: ParamSet, name: &str) -> Result<(), StatusCode> {
        let begin = entry!(self.table, paramEditBegin);
        let name = to_c_string(name)?;
        invoke_unit(|| unsafe { begin(set.as_raw(), name.as_ptr()) })
    }

    pub fn edit_end(&self, set: ParamSet) -> Result<(), StatusCode> {
        let end = entry!(self.table, paramEditEnd);
        invoke_unit(|| unsafe { end(set.as_raw()) })
    }
}

/// Reads and edits the curves of a parametric parameter.
#[derive(Debug, Clone, Copy)]
pub struct ParametricParameterSuite<'h> {
    table: &'h OfxParametricParameterSuiteV1,
}

impl<'h> ParametricParameterSuite<'h> {
    pub(crate) fn new(table: &'h OfxParametricParameterSuiteV1) -> Self {
        Self { table }
    }

    pub(crate) fn raw(&self) -> &'h OfxParametricParameterSuiteV1 {
        self.table
    }

    /// Evaluate `curve` at `position`.
    pub fn value(
        &self,
        param: Param,
        curve: i32,
        time: OfxTime,
        position: f64,
    ) -> Result<f64, StatusCode> {
        let get = entry!(self.table, parametricParamGetValue);
        // SAFETY: parametricParamGetValue writes the value on success.
        unsafe { invoke(|out| get(param.as_raw(), curve, time, position, out)) }
    }

    pub fn control_point_count(
        &self,
        param: Param,
        curve: i32,
        time: OfxTime,
    ) -> Result<u32, StatusCode> {
        let get = entry!(self.table, parametricParamGetNControlPoints);
        // SAFETY: parametricParamGetNControlPoints writes the count on success.
        let count = unsafe { invoke(|out: *mut c_int| get(param.as_raw(), curve, time, out)) }?;
        u32::try_from(count).map_err(|_| StatusCode::BadValue)
    }

    /// The `nth` control point of `curve` as `(key, value)`.
    pub fn control_point(
        &self,
        param: Param,
        curve: i32,
        time: OfxTime,
        nth: i32,
    ) -> Result<(f64, f64), StatusCode> {
        let get = entry!(self.table, parametricParamGetNthControlPoint);
        // SAFETY: parametricParamGetNthControlPoint writes key and value on success.
        unsafe {
            invoke(|out: *mut (c_double, c_double)| {
                get(
                    param.as_raw(),
                    curve,
                    time,
                    nth,
                    addr_of_mut!((*out).0),
                    addr_of_mut!((*out).1),
                )
            })
        }
    }

    /// Move the `nth` control point, optionally keyframing the change.
    pub fn set_control_point(
        &self,
        param: Param,
        curve: i32,
        time: OfxTime,
        nth: i32,
        (key, value): (f64, f64),
        animate: bool,
    ) -> Result<(), StatusCode> {
        let set = entry!(self.table, parametricParamSetNthControlPoint);
        invoke_unit(|| unsafe { set(param.as_raw(), curve, time, nth, key, value, animate) })
    }

    pub fn add_control_point(
        &self,
        param: Param,
        curve: i32,
        time: OfxTime,
        (key, value): (f64, f64),
        animate: bool,
    ) -> Result<(), StatusCode> {
        let add = entry!(self.table, parametricParamAddControlPoint);
        invoke_unit(|| unsafe { add(param.as_raw(), curve, time, key, value, animate) })
    }

    pub fn delete_control_point(
        &self,
        param: Param,
        curve: i32,
        nth: i32,
    ) -> Result<(), StatusCode> {
        let delete = entry!(self.table, parametricParamDeleteControlPoint);
        invoke_unit(|| unsafe { delete(param.as_raw(), curve, nth) })
    }

    pub fn delete_all_control_points(&self, param: Param, curve: i32) -> Result<(), StatusCode> {
        let delete = entry!(self.table, parametricParamDeleteAllControlPoints);
        invoke_unit(|| unsafe { delete(param.as_raw(), curve) })
    }
}
