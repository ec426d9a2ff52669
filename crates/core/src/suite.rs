//! Suite identity and the sealed set of suites the registry can type.

use std::ffi::{c_void, CStr};
use std::fmt;

use ofxkit_ffi::{
    kOfxImageEffectSuite, kOfxMemorySuite, kOfxMessageSuite, kOfxMultiThreadSuite,
    kOfxOpenGLRenderSuite, kOfxParameterSuite, kOfxParametricParameterSuite, kOfxProgressSuite,
    kOfxPropertySuite, kOfxTimeLineSuite, OfxImageEffectOpenGLRenderSuiteV1,
    OfxImageEffectSuiteV1, OfxMemorySuiteV1, OfxMessageSuiteV1, OfxMessageSuiteV2,
    OfxMultiThreadSuiteV1, OfxParameterSuiteV1, OfxParametricParameterSuiteV1, OfxProgressSuiteV1,
    OfxProgressSuiteV2, OfxPropertySuiteV1, OfxTimeLineSuiteV1,
};
use serde::Serialize;

use crate::suites::{
    ImageEffectSuite, MemorySuite, MessageSuite, MessageSuiteV2, MultiThreadSuite,
    OpenGlRenderSuite, ParameterSuite, ParametricParameterSuite, ProgressSuite, ProgressSuiteV2,
    PropertySuite, TimeLineSuite,
};

/// Name and version of a requested suite.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SuiteDescriptor {
    name: String,
    version: u32,
}

impl SuiteDescriptor {
    pub fn new(name: impl Into<String>, version: u32) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> u32 {
        self.version
    }
}

impl fmt::Display for SuiteDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{}", self.name, self.version)
    }
}

/// Every suite the registry knows the table layout of.
///
/// A kind is one name at one version; the v2 message and progress suites
/// are kinds of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuiteKind {
    ImageEffect,
    Property,
    Parameter,
    Memory,
    MultiThread,
    Message,
    Progress,
    TimeLine,
    MessageV2,
    ProgressV2,
    ParametricParameter,
    OpenGlRender,
}

impl SuiteKind {
    pub const ALL: [SuiteKind; 12] = [
        SuiteKind::ImageEffect,
        SuiteKind::Property,
        SuiteKind::Parameter,
        SuiteKind::Memory,
        SuiteKind::MultiThread,
        SuiteKind::Message,
        SuiteKind::Progress,
        SuiteKind::TimeLine,
        SuiteKind::MessageV2,
        SuiteKind::ProgressV2,
        SuiteKind::ParametricParameter,
        SuiteKind::OpenGlRender,
    ];

    pub fn c_name(self) -> &'static CStr {
        match self {
            SuiteKind::ImageEffect => kOfxImageEffectSuite,
            SuiteKind::Property => kOfxPropertySuite,
            SuiteKind::Parameter => kOfxParameterSuite,
            SuiteKind::Memory => kOfxMemorySuite,
            SuiteKind::MultiThread => kOfxMultiThreadSuite,
            SuiteKind::Message | SuiteKind::MessageV2 => kOfxMessageSuite,
            SuiteKind::Progress | SuiteKind::ProgressV2 => kOfxProgressSuite,
            SuiteKind::TimeLine => kOfxTimeLineSuite,
            SuiteKind::ParametricParameter => kOfxParametricParameterSuite,
            SuiteKind::OpenGlRender => kOfxOpenGLRenderSuite,
        }
    }

    /// Suite name as the host knows it, e.g. `OfxPropertySuite`.
    pub fn name(self) -> &'static str {
        match self {
            SuiteKind::ImageEffect => "OfxImageEffectSuite",
            SuiteKind::Property => "OfxPropertySuite",
            SuiteKind::Parameter => "OfxParameterSuite",
            SuiteKind::Memory => "OfxMemorySuite",
            SuiteKind::MultiThread => "OfxMultiThreadSuite",
            SuiteKind::Message | SuiteKind::MessageV2 => "OfxMessageSuite",
            SuiteKind::Progress | SuiteKind::ProgressV2 => "OfxProgressSuite",
            SuiteKind::TimeLine => "OfxTimeLineSuite",
            SuiteKind::ParametricParameter => "OfxParametricParameterSuite",
            SuiteKind::OpenGlRender => "OfxImageEffectOpenGLRenderSuite",
        }
    }

    /// The table version this crate has a layout for.
    pub fn version(self) -> u32 {
        match self {
            SuiteKind::MessageV2 | SuiteKind::ProgressV2 => 2,
            _ => 1,
        }
    }

    /// Whether an image effect host must provide this suite.
    ///
    /// Progress and timeline (either version), the v2 message suite,
    /// parametric parameters and OpenGL rendering are optional.
    pub fn is_required(self) -> bool {
        matches!(
            self,
            SuiteKind::ImageEffect
                | SuiteKind::Property
                | SuiteKind::Parameter
                | SuiteKind::Memory
                | SuiteKind::MultiThread
                | SuiteKind::Message
        )
    }

    pub fn descriptor(self) -> SuiteDescriptor {
        SuiteDescriptor::new(self.name(), self.version())
    }

    /// Match an exact name and version against the catalogue.
    pub fn lookup(name: &str, version: u32) -> Option<SuiteKind> {
        SuiteKind::ALL
            .into_iter()
            .find(|kind| kind.name() == name && kind.version() == version)
    }

    /// Alignment the host's table pointer must satisfy.
    pub(crate) fn table_align(self) -> usize {
        use std::mem::align_of;
        match self {
            SuiteKind::ImageEffect => align_of::<OfxImageEffectSuiteV1>(),
            SuiteKind::Property => align_of::<OfxPropertySuiteV1>(),
            SuiteKind::Parameter => align_of::<OfxParameterSuiteV1>(),
            SuiteKind::Memory => align_of::<OfxMemorySuiteV1>(),
            SuiteKind::MultiThread => align_of::<OfxMultiThreadSuiteV1>(),
            SuiteKind::Message => align_of::<OfxMessageSuiteV1>(),
            SuiteKind::Progress => align_of::<OfxProgressSuiteV1>(),
            SuiteKind::TimeLine => align_of::<OfxTimeLineSuiteV1>(),
            SuiteKind::MessageV2 => align_of::<OfxMessageSuiteV2>(),
            SuiteKind::ProgressV2 => align_of::<OfxProgressSuiteV2>(),
            SuiteKind::ParametricParameter => align_of::<OfxParametricParameterSuiteV1>(),
            SuiteKind::OpenGlRender => align_of::<OfxImageEffectOpenGLRenderSuiteV1>(),
        }
    }
}

impl fmt::Display for SuiteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A resolved suite, tagged by kind. Each variant wraps a typed accessor.
#[derive(Debug, Clone, Copy)]
pub enum Suite<'h> {
    ImageEffect(ImageEffectSuite<'h>),
    Property(PropertySuite<'h>),
    Parameter(ParameterSuite<'h>),
    Memory(MemorySuite<'h>),
    MultiThread(MultiThreadSuite<'h>),
    Message(MessageSuite<'h>),
    Progress(ProgressSuite<'h>),
    TimeLine(TimeLineSuite<'h>),
    MessageV2(MessageSuiteV2<'h>),
    ProgressV2(ProgressSuiteV2<'h>),
    ParametricParameter(ParametricParameterSuite<'h>),
    OpenGlRender(OpenGlRenderSuite<'h>),
}

impl<'h> Suite<'h> {
    /// Cast a host pointer to the table layout of `kind`.
    ///
    /// # Safety
    ///
    /// `table` must be non-null, aligned, and point to a live table with the
    /// layout of `kind` for at least `'h`.
    pub(crate) unsafe fn from_raw(kind: SuiteKind, table: *const c_void) -> Self {
        match kind {
            SuiteKind::ImageEffect => Suite::ImageEffect(ImageEffectSuite::new(&*table.cast())),
            SuiteKind::Property => Suite::Property(PropertySuite::new(&*table.cast())),
            SuiteKind::Parameter => Suite::Parameter(ParameterSuite::new(&*table.cast())),
            SuiteKind::Memory => Suite::Memory(MemorySuite::new(&*table.cast())),
            SuiteKind::MultiThread => Suite::MultiThread(MultiThreadSuite::new(&*table.cast())),
            SuiteKind::Message => Suite::Message(MessageSuite::new(&*table.cast())),
            SuiteKind::Progress => Suite::Progress(ProgressSuite::new(&*table.cast())),
            SuiteKind::TimeLine => Suite::TimeLine(TimeLineSuite::new(&*table.cast())),
            SuiteKind::MessageV2 => Suite::MessageV2(MessageSuiteV2::new(&*table.cast())),
            SuiteKind::ProgressV2 => Suite::ProgressV2(ProgressSuiteV2::new(&*table.cast())),
            SuiteKind::ParametricParameter => {
                Suite::ParametricParameter(ParametricParameterSuite::new(&*table.cast()))
            }
            SuiteKind::OpenGlRender => Suite::OpenGlRender(OpenGlRenderSuite::new(&*table.cast())),
        }
    }

    pub fn kind(&self) -> SuiteKind {
        match self {
            Suite::ImageEffect(_) => SuiteKind::ImageEffect,
            Suite::Property(_) => SuiteKind::Property,
            Suite::Parameter(_) => SuiteKind::Parameter,
            Suite::Memory(_) => SuiteKind::Memory,
            Suite::MultiThread(_) => SuiteKind::MultiThread,
            Suite::Message(_) => SuiteKind::Message,
            Suite::Progress(_) => SuiteKind::Progress,
            Suite::TimeLine(_) => SuiteKind::TimeLine,
            Suite::MessageV2(_) => SuiteKind::MessageV2,
            Suite::ProgressV2(_) => SuiteKind::ProgressV2,
            Suite::ParametricParameter(_) => SuiteKind::ParametricParameter,
            Suite::OpenGlRender(_) => SuiteKind::OpenGlRender,
        }
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Implemented by the typed accessor of each catalogued suite.
///
/// Sealed: the set of table layouts is fixed by this crate.
pub trait TypedSuite<'h>: sealed::Sealed + Copy + Sized {
    /// Raw `#[repr(C)]` table behind the accessor.
    type Table: 'static;

    const KIND: SuiteKind;

    fn from_suite(suite: Suite<'h>) -> Option<Self>;

    /// The host's table. Entries are only ever called through the registry.
    fn table(&self) -> &'h Self::Table;
}

macro_rules! typed_suite {
    ($accessor:ident, $table:ty, $variant:ident) => {
        impl sealed::Sealed for $accessor<'_> {}

        impl<'h> TypedSuite<'h> for $accessor<'h> {
            type Table = $table;

            const KIND: SuiteKind = SuiteKind::$variant;

            fn from_suite(suite: Suite<'h>) -> Option<Self> {
                match suite {
                    Suite::$variant(inner) => Some(inner),
                    _ => None,
                }
            }

            fn table(&self) -> &'h Self::Table {
                self.raw()
            }
        }
    };
}

typed_suite!(PropertySuite, OfxPropertySuiteV1, Property);
typed_suite!(MemorySuite, OfxMemorySuiteV1, Memory);
typed_suite!(MultiThreadSuite, OfxMultiThreadSuiteV1, MultiThread);
typed_suite!(MessageSuite, OfxMessageSuiteV1, Message);
typed_suite!(ProgressSuite, OfxProgressSuiteV1, Progress);
typed_suite!(TimeLineSuite, OfxTimeLineSuiteV1, TimeLine);
typed_suite!(ImageEffectSuite, OfxImageEffectSuiteV1, ImageEffect);
typed_suite!(ParameterSuite, OfxParameterSuiteV1, Parameter);
typed_suite!(MessageSuiteV2, OfxMessageSuiteV2, MessageV2);
typed_suite!(ProgressSuiteV2, OfxProgressSuiteV2, ProgressV2);
typed_suite!(ParametricParameterSuite, OfxParametricParameterSuiteV1, ParametricParameter);
typed_suite!(OpenGlRenderSuite, OfxImageEffectOpenGLRenderSuiteV1, OpenGlRender);

/// A validated, non-owning reference to a host suite table.
///
/// Lives no longer than the registry (host session) that resolved it. The
/// table memory belongs to the host and is never freed from here.
#[derive(Debug, Clone)]
pub struct SuiteHandle<'h> {
    descriptor: SuiteDescriptor,
    suite: Suite<'h>,
}

impl<'h> SuiteHandle<'h> {
    pub(crate) fn new(descriptor: SuiteDescriptor, suite: Suite<'h>) -> Self {
        Self { descriptor, suite }
    }

    pub fn descriptor(&self) -> &SuiteDescriptor {
        &self.descriptor
    }

    pub fn kind(&self) -> SuiteKind {
        self.suite.kind()
    }

    pub fn suite(&self) -> Suite<'h> {
        self.suite
    }

    /// The typed accessor, or `BadHandle` if this handle is another suite.
    pub fn get<S: TypedSuite<'h>>(&self) -> Result<S, crate::StatusCode> {
        S::from_suite(self.suite).ok_or(crate::StatusCode::BadHandle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_lookup_is_exact() {
        assert_eq!(SuiteKind::lookup("OfxPropertySuite", 1), Some(SuiteKind::Property));
        assert_eq!(SuiteKind::lookup("OfxTimeLineSuite", 1), Some(SuiteKind::TimeLine));
        assert_eq!(SuiteKind::lookup("OfxPropertySuite", 2), None);
        assert_eq!(SuiteKind::lookup("ofxpropertysuite", 1), None);
        assert_eq!(SuiteKind::lookup("OfxImageEffectSuite", 1), Some(SuiteKind::ImageEffect));
        assert_eq!(SuiteKind::lookup("OfxInteractSuite", 1), None);
    }

    #[test]
    fn test_versions_are_distinct_kinds() {
        assert_eq!(SuiteKind::lookup("OfxMessageSuite", 1), Some(SuiteKind::Message));
        assert_eq!(SuiteKind::lookup("OfxMessageSuite", 2), Some(SuiteKind::MessageV2));
        assert_eq!(SuiteKind::lookup("OfxProgressSuite", 2), Some(SuiteKind::ProgressV2));
        assert_eq!(SuiteKind::lookup("OfxProgressSuite", 3), None);
        assert_eq!(SuiteKind::MessageV2.descriptor().to_string(), "OfxMessageSuite v2");
    }

    #[test]
    fn test_every_kind_round_trips_through_lookup() {
        for kind in SuiteKind::ALL {
            assert_eq!(SuiteKind::lookup(kind.name(), kind.version()), Some(kind));
        }
    }

    #[test]
    fn test_required_suites() {
        let required: Vec<_> = SuiteKind::ALL.into_iter().filter(|k| k.is_required()).collect();
        assert_eq!(
            required,
            vec![
                SuiteKind::ImageEffect,
                SuiteKind::Property,
                SuiteKind::Parameter,
                SuiteKind::Memory,
                SuiteKind::MultiThread,
                SuiteKind::Message,
            ]
        );
    }

    #[test]
    fn test_c_names_match_names() {
        for kind in SuiteKind::ALL {
            assert_eq!(kind.c_name().to_str().unwrap(), kind.name());
        }
    }

    #[test]
    fn test_descriptor_display() {
        let descriptor = SuiteKind::Memory.descriptor();
        assert_eq!(descriptor.to_string(), "OfxMemorySuite v1");
        assert_eq!(descriptor.name(), "OfxMemorySuite");
        assert_eq!(descriptor.version(), 1);
    }
}
