//! `OfxTimeLineSuite` v1.

use std::ptr::addr_of_mut;

use ofxkit_ffi::{OfxTime, OfxTimeLineSuiteV1};

use super::InstanceHandle;
use crate::registry::{invoke, invoke_unit};
use crate::StatusCode;

#[derive(Debug, Clone, Copy)]
pub struct TimeLineSuite<'h> {
    table: &'h OfxTimeLineSuiteV1,
}

impl<'h> TimeLineSuite<'h> {
    pub(crate) fn new(table: &'h OfxTimeLineSuiteV1) -> Self {
        Self { table }
    }

    pub(crate) fn raw(&self) -> &'h OfxTimeLineSuiteV1 {
        self.table
    }

    /// Current frame of the host's timeline.
    pub fn time(&self, instance: InstanceHandle) -> Result<OfxTime, StatusCode> {
        let get = entry!(self.table, getTime);
        // SAFETY: getTime writes the time on success.
        unsafe { invoke(|out| get(instance.as_raw(), out)) }
    }

    pub fn goto(&self, instance: InstanceHandle, time: OfxTime) -> Result<(), StatusCode> {
        let goto = entry!(self.table, gotoTime);
        invoke_unit(|| unsafe { goto(instance.as_raw(), time) })
    }

    /// First and last frame of the timeline.
    pub fn bounds(&self, instance: InstanceHandle) -> Result<(OfxTime, OfxTime), StatusCode> {
        let get = entry!(self.table, getTimeBounds);
        // SAFETY: getTimeBounds writes both ends on success.
        unsafe {
            invoke(|out: *mut (OfxTime, OfxTime)| {
                get(instance.as_raw(), addr_of_mut!((*out).0), addr_of_mut!((*out).1))
            })
        }
    }
}
