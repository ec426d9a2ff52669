//! `OfxMessageSuite` v1 and v2.

use std::ffi::{c_char, c_void, CStr};

use ofxkit_ffi::{
    kOfxMessageError, kOfxMessageFatal, kOfxMessageLog, kOfxMessageMessage, kOfxMessageQuestion,
    kOfxMessageWarning, kOfxStatReplyNo, kOfxStatReplyYes, OfxMessageSuiteV1, OfxMessageSuiteV2,
    OfxStatus,
};

use super::{to_c_string, InstanceHandle};
use crate::registry::invoke_unit;
use crate::StatusCode;

/// Kind of message posted to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Fatal,
    Error,
    Warning,
    Message,
    Log,
    /// A yes/no question; the host answers with a [`Reply`].
    Question,
}

impl MessageType {
    fn as_c_str(self) -> &'static CStr {
        match self {
            MessageType::Fatal => kOfxMessageFatal,
            MessageType::Error => kOfxMessageError,
            MessageType::Warning => kOfxMessageWarning,
            MessageType::Message => kOfxMessageMessage,
            MessageType::Log => kOfxMessageLog,
            MessageType::Question => kOfxMessageQuestion,
        }
    }
}

/// How the host answered a posted message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// Delivered; no answer was asked for.
    Ok,
    Yes,
    No,
}

impl Reply {
    /// The answer to a question. A plain `Ok` means the host ignored the
    /// question, which is an `UnknownError`.
    pub fn answer(self) -> Result<bool, StatusCode> {
        match self {
            Reply::Yes => Ok(true),
            Reply::No => Ok(false),
            Reply::Ok => Err(StatusCode::UnknownError),
        }
    }
}

/// Posts messages to the host's user interface or log.
#[derive(Debug, Clone, Copy)]
pub struct MessageSuite<'h> {
    table: &'h OfxMessageSuiteV1,
}

impl<'h> MessageSuite<'h> {
    pub(crate) fn new(table: &'h OfxMessageSuiteV1) -> Self {
        Self { table }
    }

    pub(crate) fn raw(&self) -> &'h OfxMessageSuiteV1 {
        self.table
    }

    /// Post `text` to the host. `instance` may be [`InstanceHandle::NONE`].
    ///
    /// The text is passed as a `%s` argument, never as the format string.
    pub fn post(
        &self,
        instance: InstanceHandle,
        kind: MessageType,
        id: Option<&CStr>,
        text: &str,
    ) -> Result<Reply, StatusCode> {
        let message = entry!(self.table, message);
        send(message, instance, kind, id, text)
    }

    /// Ask the host a yes/no question.
    pub fn ask(&self, instance: InstanceHandle, text: &str) -> Result<bool, StatusCode> {
        self.post(instance, MessageType::Question, None, text)
            .and_then(Reply::answer)
    }
}

/// Message suite v2: v1 plus persistent messages shown on the effect
/// until cleared.
#[derive(Debug, Clone, Copy)]
pub struct MessageSuiteV2<'h> {
    table: &'h OfxMessageSuiteV2,
}

impl<'h> MessageSuiteV2<'h> {
    pub(crate) fn new(table: &'h OfxMessageSuiteV2) -> Self {
        Self { table }
    }

    pub(crate) fn raw(&self) -> &'h OfxMessageSuiteV2 {
        self.table
    }

    /// Same as [`MessageSuite::post`].
    pub fn post(
        &self,
        instance: InstanceHandle,
        kind: MessageType,
        id: Option<&CStr>,
        text: &str,
    ) -> Result<Reply, StatusCode> {
        let message = entry!(self.table, message);
        send(message, instance, kind, id, text)
    }

    /// Attach a message to `instance` that stays until
    /// [`MessageSuiteV2::clear_persistent`].
    pub fn set_persistent(
        &self,
        instance: InstanceHandle,
        kind: MessageType,
        id: Option<&CStr>,
        text: &str,
    ) -> Result<Reply, StatusCode> {
        let set = entry!(self.table, setPersistentMessage);
        send(set, instance, kind, id, text)
    }

    pub fn clear_persistent(&self, instance: InstanceHandle) -> Result<(), StatusCode> {
        let clear = entry!(self.table, clearPersistentMessage);
        invoke_unit(|| unsafe { clear(instance.as_raw()) })
    }
}

/// Whichever message suite version the host provides, newest first.
#[derive(Debug, Clone, Copy)]
pub enum Messenger<'h> {
    V2(MessageSuiteV2<'h>),
    V1(MessageSuite<'h>),
}

impl Messenger<'_> {
    pub fn version(&self) -> u32 {
        match self {
            Messenger::V2(_) => 2,
            Messenger::V1(_) => 1,
        }
    }

    pub fn post(
        &self,
        instance: InstanceHandle,
        kind: MessageType,
        id: Option<&CStr>,
        text: &str,
    ) -> Result<Reply, StatusCode> {
        match self {
            Messenger::V2(suite) => suite.post(instance, kind, id, text),
            Messenger::V1(suite) => suite.post(instance, kind, id, text),
        }
    }

    pub fn ask(&self, instance: InstanceHandle, text: &str) -> Result<bool, StatusCode> {
        self.post(instance, MessageType::Question, None, text)
            .and_then(Reply::answer)
    }

    /// Persistent messages need v2; a v1 host reports `Unsupported`.
    pub fn set_persistent(
        &self,
        instance: InstanceHandle,
        kind: MessageType,
        id: Option<&CStr>,
        text: &str,
    ) -> Result<Reply, StatusCode> {
        match self {
            Messenger::V2(suite) => suite.set_persistent(instance, kind, id, text),
            Messenger::V1(_) => Err(StatusCode::Unsupported),
        }
    }

    pub fn clear_persistent(&self, instance: InstanceHandle) -> Result<(), StatusCode> {
        match self {
            Messenger::V2(suite) => suite.clear_persistent(instance),
            Messenger::V1(_) => Err(StatusCode::Unsupported),
        }
    }
}

type MessageFn = unsafe extern "C" fn(
    *mut c_void,
    *const c_char,
    *const c_char,
    *const c_char,
    ...
) -> OfxStatus;

fn send(
    message: MessageFn,
    instance: InstanceHandle,
    kind: MessageType,
    id: Option<&CStr>,
    text: &str,
) -> Result<Reply, StatusCode> {
    let text = to_c_string(text)?;
    let id = id.map_or(std::ptr::null(), CStr::as_ptr);
    // SAFETY: all strings are NUL-terminated and outlive the call.
    let raw = unsafe {
        message(
            instance.as_raw(),
            kind.as_c_str().as_ptr(),
            id,
            c"%s".as_ptr(),
            text.as_ptr(),
        )
    };
    reply(raw)
}

/// Read a message call's status. The reply codes are checked on the raw
/// integer since [`StatusCode`] has no variants for them.
#[allow(non_upper_case_globals)]
pub(crate) fn reply(raw: OfxStatus) -> Result<Reply, StatusCode> {
    match raw {
        kOfxStatReplyYes => Ok(Reply::Yes),
        kOfxStatReplyNo => Ok(Reply::No),
        _ => invoke_unit(|| raw).map(|()| Reply::Ok),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ofxkit_ffi::{kOfxStatErrBadHandle, kOfxStatErrFatal, kOfxStatOK, kOfxStatReplyDefault};

    #[test]
    fn test_reply_codes() {
        assert_eq!(reply(kOfxStatOK), Ok(Reply::Ok));
        assert_eq!(reply(kOfxStatReplyYes), Ok(Reply::Yes));
        assert_eq!(reply(kOfxStatReplyNo), Ok(Reply::No));
    }

    #[test]
    fn test_reply_failures_keep_their_status() {
        assert_eq!(reply(kOfxStatErrBadHandle), Err(StatusCode::BadHandle));
        assert_eq!(reply(kOfxStatErrFatal), Err(StatusCode::FatalError));
        assert_eq!(reply(4242), Err(StatusCode::UnknownError));
    }

    #[test]
    fn test_question_answers() {
        assert_eq!(reply(kOfxStatReplyYes).and_then(Reply::answer), Ok(true));
        assert_eq!(reply(kOfxStatReplyNo).and_then(Reply::answer), Ok(false));
        assert_eq!(
            reply(kOfxStatOK).and_then(Reply::answer),
            Err(StatusCode::UnknownError)
        );
        assert_eq!(
            reply(kOfxStatErrBadHandle).and_then(Reply::answer),
            Err(StatusCode::BadHandle)
        );
    }

    #[test]
    fn test_reply_default_is_not_an_answer() {
        // Only yes and no are answers; the default reply code is unmapped.
        assert_eq!(reply(kOfxStatReplyDefault), Err(StatusCode::UnknownError));
    }

    #[test]
    fn test_message_type_strings() {
        assert_eq!(MessageType::Question.as_c_str(), c"OfxMessageQuestion");
        assert_eq!(MessageType::Log.as_c_str(), c"OfxMessageLog");
    }
}
