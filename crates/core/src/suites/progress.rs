//! `OfxProgressSuite` v1 and v2.

use ofxkit_ffi::{kOfxStatReplyNo, OfxProgressSuiteV1, OfxProgressSuiteV2, OfxStatus};

use super::{to_c_string, InstanceHandle};
use crate::registry::invoke_unit;
use crate::StatusCode;

/// Drives the host's progress bar for long-running work.
#[derive(Debug, Clone, Copy)]
pub struct ProgressSuite<'h> {
    table: &'h OfxProgressSuiteV1,
}

impl<'h> ProgressSuite<'h> {
    pub(crate) fn new(table: &'h OfxProgressSuiteV1) -> Self {
        Self { table }
    }

    pub(crate) fn raw(&self) -> &'h OfxProgressSuiteV1 {
        self.table
    }

    pub fn start(&self, instance: InstanceHandle, label: &str) -> Result<(), StatusCode> {
        let start = entry!(self.table, progressStart);
        let label = to_c_string(label)?;
        invoke_unit(|| unsafe { start(instance.as_raw(), label.as_ptr()) })
    }

    /// Report progress in `0.0..=1.0`. Returns `Ok(false)` once the user has
    /// asked to cancel.
    pub fn update(&self, instance: InstanceHandle, progress: f64) -> Result<bool, StatusCode> {
        let update = entry!(self.table, progressUpdate);
        // SAFETY: plain value arguments.
        keep_going(unsafe { update(instance.as_raw(), progress.clamp(0.0, 1.0)) })
    }

    pub fn end(&self, instance: InstanceHandle) -> Result<(), StatusCode> {
        let end = entry!(self.table, progressEnd);
        invoke_unit(|| unsafe { end(instance.as_raw()) })
    }
}

/// Progress suite v2: `start` also takes a message id the host can
/// localise the label by.
#[derive(Debug, Clone, Copy)]
pub struct ProgressSuiteV2<'h> {
    table: &'h OfxProgressSuiteV2,
}

impl<'h> ProgressSuiteV2<'h> {
    pub(crate) fn new(table: &'h OfxProgressSuiteV2) -> Self {
        Self { table }
    }

    pub(crate) fn raw(&self) -> &'h OfxProgressSuiteV2 {
        self.table
    }

    pub fn start(&self, instance: InstanceHandle, label: &str, id: &str) -> Result<(), StatusCode> {
        let start = entry!(self.table, progressStart);
        let label = to_c_string(label)?;
        let id = to_c_string(id)?;
        invoke_unit(|| unsafe { start(instance.as_raw(), label.as_ptr(), id.as_ptr()) })
    }

    /// Same as [`ProgressSuite::update`].
    pub fn update(&self, instance: InstanceHandle, progress: f64) -> Result<bool, StatusCode> {
        let update = entry!(self.table, progressUpdate);
        // SAFETY: plain value arguments.
        keep_going(unsafe { update(instance.as_raw(), progress.clamp(0.0, 1.0)) })
    }

    pub fn end(&self, instance: InstanceHandle) -> Result<(), StatusCode> {
        let end = entry!(self.table, progressEnd);
        invoke_unit(|| unsafe { end(instance.as_raw()) })
    }
}

/// Whichever progress suite version the host provides, newest first.
#[derive(Debug, Clone, Copy)]
pub enum Progress<'h> {
    V2(ProgressSuiteV2<'h>),
    V1(ProgressSuite<'h>),
}

impl Progress<'_> {
    pub fn version(&self) -> u32 {
        match self {
            Progress::V2(_) => 2,
            Progress::V1(_) => 1,
        }
    }

    /// Start the bar. `id` only reaches v2 hosts; without one the label
    /// doubles as the id.
    pub fn start(
        &self,
        instance: InstanceHandle,
        label: &str,
        id: Option<&str>,
    ) -> Result<(), StatusCode> {
        match self {
            Progress::V2(suite) => suite.start(instance, label, id.unwrap_or(label)),
            Progress::V1(suite) => suite.start(instance, label),
        }
    }

    pub fn update(&self, instance: InstanceHandle, progress: f64) -> Result<bool, StatusCode> {
        match self {
            Progress::V2(suite) => suite.update(instance, progress),
            Progress::V1(suite) => suite.update(instance, progress),
        }
    }

    pub fn end(&self, instance: InstanceHandle) -> Result<(), StatusCode> {
        match self {
            Progress::V2(suite) => suite.end(instance),
            Progress::V1(suite) => suite.end(instance),
        }
    }
}

/// `ReplyNo` from an update means the user cancelled.
fn keep_going(raw: OfxStatus) -> Result<bool, StatusCode> {
    if raw == kOfxStatReplyNo {
        tracing::debug!("Host requested cancellation");
        return Ok(false);
    }
    invoke_unit(|| raw).map(|()| true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ofxkit_ffi::{kOfxStatErrFatal, kOfxStatOK, kOfxStatReplyYes};

    #[test]
    fn test_keep_going() {
        assert_eq!(keep_going(kOfxStatOK), Ok(true));
        assert_eq!(keep_going(kOfxStatReplyNo), Ok(false));
        assert_eq!(keep_going(kOfxStatReplyYes), Err(StatusCode::UnknownError));
        assert_eq!(keep_going(kOfxStatErrFatal), Err(StatusCode::FatalError));
    }
}
