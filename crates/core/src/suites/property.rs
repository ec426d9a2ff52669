//! `OfxPropertySuite` v1.

use std::ffi::{c_char, c_int, c_void, CStr};

use ofxkit_ffi::OfxPropertySuiteV1;

use super::{to_c_string, PropertySet};
use crate::registry::{invoke, invoke_unit};
use crate::StatusCode;

/// Reads and writes values on host property sets.
#[derive(Debug, Clone, Copy)]
pub struct PropertySuite<'h> {
    table: &'h OfxPropertySuiteV1,
}

impl<'h> PropertySuite<'h> {
    pub(crate) fn new(table: &'h OfxPropertySuiteV1) -> Self {
        Self { table }
    }

    pub(crate) fn raw(&self) -> &'h OfxPropertySuiteV1 {
        self.table
    }

    pub fn get_int(&self, props: PropertySet, name: &CStr, index: i32) -> Result<i32, StatusCode> {
        let get = entry!(self.table, propGetInt);
        // SAFETY: propGetInt writes the int on success.
        unsafe { invoke(|out| get(props.as_raw(), name.as_ptr(), index, out)) }
    }

    pub fn get_double(
        &self,
        props: PropertySet,
        name: &CStr,
        index: i32,
    ) -> Result<f64, StatusCode> {
        let get = entry!(self.table, propGetDouble);
        // SAFETY: propGetDouble writes the double on success.
        unsafe { invoke(|out| get(props.as_raw(), name.as_ptr(), index, out)) }
    }

    pub fn get_pointer(
        &self,
        props: PropertySet,
        name: &CStr,
        index: i32,
    ) -> Result<*mut c_void, StatusCode> {
        let get = entry!(self.table, propGetPointer);
        // SAFETY: propGetPointer writes the pointer on success.
        unsafe { invoke(|out| get(props.as_raw(), name.as_ptr(), index, out)) }
    }

    /// Read a string property. The host keeps ownership of its buffer; the
    /// value is copied out. A null or non-UTF-8 string is a `BadValue`.
    pub fn get_string(
        &self,
        props: PropertySet,
        name: &CStr,
        index: i32,
    ) -> Result<String, StatusCode> {
        let get = entry!(self.table, propGetString);
        // SAFETY: propGetString writes the string pointer on success.
        let ptr: *mut c_char =
            unsafe { invoke(|out| get(props.as_raw(), name.as_ptr(), index, out)) }?;
        if ptr.is_null() {
            return Err(StatusCode::BadValue);
        }
        // SAFETY: a successful call yields a NUL-terminated string owned by the host.
        let value = unsafe { CStr::from_ptr(ptr) };
        value
            .to_str()
            .map(str::to_owned)
            .map_err(|_| StatusCode::BadValue)
    }

    pub fn set_int(
        &self,
        props: PropertySet,
        name: &CStr,
        index: i32,
        value: i32,
    ) -> Result<(), StatusCode> {
        let set = entry!(self.table, propSetInt);
        invoke_unit(|| unsafe { set(props.as_raw(), name.as_ptr(), index, value) })
    }

    pub fn set_double(
        &self,
        props: PropertySet,
        name: &CStr,
        index: i32,
        value: f64,
    ) -> Result<(), StatusCode> {
        let set = entry!(self.table, propSetDouble);
        invoke_unit(|| unsafe { set(props.as_raw(), name.as_ptr(), index, value) })
    }

    pub fn set_pointer(
        &self,
        props: PropertySet,
        name: &CStr,
        index: i32,
        value: *mut c_void,
    ) -> Result<(), StatusCode> {
        let set = entry!(self.table, propSetPointer);
        invoke_unit(|| unsafe { set(props.as_raw(), name.as_ptr(), index, value) })
    }

    /// Set a string property. The host copies the value before returning.
    pub fn set_string(
        &self,
        props: PropertySet,
        name: &CStr,
        index: i32,
        value: &str,
    ) -> Result<(), StatusCode> {
        let set = entry!(self.table, propSetString);
        let value = to_c_string(value)?;
        invoke_unit(|| unsafe { set(props.as_raw(), name.as_ptr(), index, value.as_ptr()) })
    }

    /// Number of values the property holds.
    pub fn dimension(&self, props: PropertySet, name: &CStr) -> Result<usize, StatusCode> {
        let get = entry!(self.table, propGetDimension);
        // SAFETY: propGetDimension writes the count on success.
        let count: c_int = unsafe { invoke(|out| get(props.as_raw(), name.as_ptr(), out)) }?;
        usize::try_from(count).map_err(|_| StatusCode::BadValue)
    }

    /// Read every value of a multi-dimensional int property.
    pub fn get_ints(&self, props: PropertySet, name: &CStr) -> Result<Vec<i32>, StatusCode> {
        let get = entry!(self.table, propGetIntN);
        let count = self.dimension(props, name)?;
        let mut values = vec![0; count];
        if count == 0 {
            return Ok(values);
        }
        let n = c_int::try_from(count).map_err(|_| StatusCode::BadIndex)?;
        invoke_unit(|| unsafe { get(props.as_raw(), name.as_ptr(), n, values.as_mut_ptr()) })?;
        Ok(values)
    }

    /// Read every value of a multi-dimensional double property.
    pub fn get_doubles(&self, props: PropertySet, name: &CStr) -> Result<Vec<f64>, StatusCode> {
        let get = entry!(self.table, propGetDoubleN);
        let count = self.dimension(props, name)?;
        let mut values = vec![0.0; count];
        if count == 0 {
            return Ok(values);
        }
        let n = c_int::try_from(count).map_err(|_| StatusCode::BadIndex)?;
        invoke_unit(|| unsafe { get(props.as_raw(), name.as_ptr(), n, values.as_mut_ptr()) })?;
        Ok(values)
    }

    pub fn set_ints(
        &self,
        props: PropertySet,
        name: &CStr,
        values: &[i32],
    ) -> Result<(), StatusCode> {
        let set = entry!(self.table, propSetIntN);
        let n = c_int::try_from(values.len()).map_err(|_| StatusCode::BadIndex)?;
        invoke_unit(|| unsafe { set(props.as_raw(), name.as_ptr(), n, values.as_ptr()) })
    }

    pub fn set_doubles(
        &self,
        props: PropertySet,
        name: &CStr,
        values: &[f64],
    ) -> Result<(), StatusCode> {
        let set = entry!(self.table, propSetDoubleN);
        let n = c_int::try_from(values.len()).map_err(|_| StatusCode::BadIndex)?;
        invoke_unit(|| unsafe { set(props.as_raw(), name.as_ptr(), n, values.as_ptr()) })
    }

    /// Reset a property to its default value.
    pub fn reset(&self, props: PropertySet, name: &CStr) -> Result<(), StatusCode> {
        let reset = entry!(self.table, propReset);
        invoke_unit(|| unsafe { reset(props.as_raw(), name.as_ptr()) })
    }
}
