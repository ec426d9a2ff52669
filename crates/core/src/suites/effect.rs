//! `OfxImageEffectSuite` v1 and `OfxImageEffectOpenGLRenderSuite` v1.

use std::ffi::{c_void, CStr};
use std::ptr::{self, addr_of_mut, NonNull};

use ofxkit_ffi::{
    OfxImageClipHandle, OfxImageEffectOpenGLRenderSuiteV1, OfxImageEffectSuiteV1,
    OfxImageMemoryHandle, OfxPropertySetHandle, OfxRectD, OfxTime,
};

use super::{to_c_string, Clip, ImageEffect, ParamSet, PropertySet};
use crate::registry::{invoke, invoke_unit, log_failure};
use crate::StatusCode;

/// Clips, images and image memory of an effect.
#[derive(Debug, Clone, Copy)]
pub struct ImageEffectSuite<'h> {
    table: &'h OfxImageEffectSuiteV1,
}

impl<'h> ImageEffectSuite<'h> {
    pub(crate) fn new(table: &'h OfxImageEffectSuiteV1) -> Self {
        Self { table }
    }

    pub(crate) fn raw(&self) -> &'h OfxImageEffectSuiteV1 {
        self.table
    }

    /// Property set of an effect instance or descriptor.
    pub fn property_set(&self, effect: ImageEffect) -> Result<PropertySet, StatusCode> {
        let get = entry!(self.table, getPropertySet);
        // SAFETY: getPropertySet writes the handle on success.
        let raw = unsafe { invoke(|out| get(effect.as_raw(), out)) }?;
        Ok(PropertySet(raw))
    }

    pub fn param_set(&self, effect: ImageEffect) -> Result<ParamSet, StatusCode> {
        let get = entry!(self.table, getParamSet);
        // SAFETY: getParamSet writes the handle on success.
        let raw = unsafe { invoke(|out| get(effect.as_raw(), out)) }?;
        Ok(ParamSet(raw))
    }

    /// Define a clip while describing the effect in a context.
    pub fn clip_define(&self, effect: ImageEffect, name: &str) -> Result<PropertySet, StatusCode> {
        let define = entry!(self.table, clipDefine);
        let name = to_c_string(name)?;
        // SAFETY: clipDefine writes the clip's property set on success.
        let raw = unsafe { invoke(|out| define(effect.as_raw(), name.as_ptr(), out)) }?;
        Ok(PropertySet(raw))
    }

    /// Look up a clip of an instance by name.
    pub fn clip(&self, effect: ImageEffect, name: &str) -> Result<(Clip, PropertySet), StatusCode> {
        let get = entry!(self.table, clipGetHandle);
        let name = to_c_string(name)?;
        // SAFETY: clipGetHandle writes the clip and its property set on success.
        let (clip, props) = unsafe {
            invoke(|out: *mut (OfxImageClipHandle, OfxPropertySetHandle)| {
                get(
                    effect.as_raw(),
                    name.as_ptr(),
                    addr_of_mut!((*out).0),
                    addr_of_mut!((*out).1),
                )
            })
        }?;
        Ok((Clip(clip), PropertySet(props)))
    }

    pub fn clip_property_set(&self, clip: Clip) -> Result<PropertySet, StatusCode> {
        let get = entry!(self.table, clipGetPropertySet);
        // SAFETY: clipGetPropertySet writes the handle on success.
        let raw = unsafe { invoke(|out| get(clip.as_raw(), out)) }?;
        Ok(PropertySet(raw))
    }

    /// Fetch the clip's image at `time`, optionally limited to `region`.
    ///
    /// The image is released back to the host when the [`ClipImage`] drops.
    pub fn clip_image(
        &self,
        clip: Clip,
        time: OfxTime,
        region: Option<&OfxRectD>,
    ) -> Result<ClipImage<'h>, StatusCode> {
        let get = entry!(self.table, clipGetImage);
        let _ = entry!(self.table, clipReleaseImage);
        let region = region.map_or(ptr::null(), |r| r as *const OfxRectD);
        // SAFETY: clipGetImage writes the image handle on success.
        let raw = unsafe { invoke(|out| get(clip.as_raw(), time, region, out)) }?;
        Ok(ClipImage {
            props: PropertySet(raw),
            suite: *self,
        })
    }

    pub fn clip_region_of_definition(
        &self,
        clip: Clip,
        time: OfxTime,
    ) -> Result<OfxRectD, StatusCode> {
        let get = entry!(self.table, clipGetRegionOfDefinition);
        // SAFETY: clipGetRegionOfDefinition writes the rectangle on success.
        unsafe { invoke(|out| get(clip.as_raw(), time, out)) }
    }

    /// Whether the host wants the current render abandoned.
    ///
    /// A host without the entry never aborts.
    pub fn abort(&self, effect: ImageEffect) -> bool {
        match self.table.abort {
            // SAFETY: plain handle argument.
            Some(abort) => unsafe { abort(effect.as_raw()) != 0 },
            None => false,
        }
    }

    /// Allocate `len` bytes of image memory, optionally charged to an
    /// instance. The block is freed when the [`ImageMemory`] drops.
    pub fn image_memory(
        &self,
        effect: Option<ImageEffect>,
        len: usize,
    ) -> Result<ImageMemory<'h>, StatusCode> {
        let alloc = entry!(self.table, imageMemoryAlloc);
        let _ = entry!(self.table, imageMemoryFree);
        let effect = effect.map_or(ptr::null_mut(), |e| e.as_raw());
        // SAFETY: imageMemoryAlloc writes the memory handle on success.
        let handle = unsafe { invoke(|out| alloc(effect, len, out)) }?;
        if handle.is_null() {
            tracing::warn!(len, "Host reported a successful allocation but returned null");
            return Err(StatusCode::OutOfMemory);
        }
        tracing::trace!(len, "Allocated image memory");
        Ok(ImageMemory {
            handle,
            len,
            suite: *self,
        })
    }
}

/// An image fetched from a clip, released through the suite on drop.
#[derive(Debug)]
pub struct ClipImage<'h> {
    props: PropertySet,
    suite: ImageEffectSuite<'h>,
}

impl ClipImage<'_> {
    /// The image's property set: data pointer, bounds, row bytes.
    pub fn properties(&self) -> PropertySet {
        self.props
    }
}

impl Drop for ClipImage<'_> {
    fn drop(&mut self) {
        let Some(release) = self.suite.table.clipReleaseImage else {
            return;
        };
        // SAFETY: the handle came from clipGetImage and is released once.
        let raw = unsafe { release(self.props.as_raw()) };
        let status = StatusCode::from_raw(raw);
        if !status.is_success() {
            log_failure(raw, status);
        }
    }
}

/// Host image memory, freed through the suite on drop.
///
/// The host may move the block while it is unlocked.
#[derive(Debug)]
pub struct ImageMemory<'h> {
    handle: OfxImageMemoryHandle,
    len: usize,
    suite: ImageEffectSuite<'h>,
}

impl ImageMemory<'_> {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Pin the block and return its address. Locks nest on the host side.
    pub fn lock(&mut self) -> Result<NonNull<u8>, StatusCode> {
        let lock = entry!(self.suite.table, imageMemoryLock);
        // SAFETY: imageMemoryLock writes the address on success.
        let data: *mut c_void = unsafe { invoke(|out| lock(self.handle, out)) }?;
        NonNull::new(data.cast::<u8>()).ok_or(StatusCode::OutOfMemory)
    }

    pub fn unlock(&mut self) -> Result<(), StatusCode> {
        let unlock = entry!(self.suite.table, imageMemoryUnlock);
        invoke_unit(|| unsafe { unlock(self.handle) })
    }
}

impl Drop for ImageMemory<'_> {
    fn drop(&mut self) {
        let Some(free) = self.suite.table.imageMemoryFree else {
            return;
        };
        // SAFETY: the handle came from imageMemoryAlloc and is freed once.
        let raw = unsafe { free(self.handle) };
        let status = StatusCode::from_raw(raw);
        if !status.is_success() {
            log_failure(raw, status);
        }
    }
}

/// Loads clip images as OpenGL textures.
#[derive(Debug, Clone, Copy)]
pub struct OpenGlRenderSuite<'h> {
    table: &'h OfxImageEffectOpenGLRenderSuiteV1,
}

impl<'h> OpenGlRenderSuite<'h> {
    pub(crate) fn new(table: &'h OfxImageEffectOpenGLRenderSuiteV1) -> Self {
        Self { table }
    }

    pub(crate) fn raw(&self) -> &'h OfxImageEffectOpenGLRenderSuiteV1 {
        self.table
    }

    /// Load the clip at `time` as a texture. `format` is a pixel depth
    /// property value, or `None` for the clip's own depth.
    ///
    /// Free the returned texture with [`OpenGlRenderSuite::free_texture`].
    pub fn load_texture(
        &self,
        clip: Clip,
        time: OfxTime,
        format: Option<&CStr>,
        region: Option<&OfxRectD>,
    ) -> Result<PropertySet, StatusCode> {
        let load = entry!(self.table, clipLoadTexture);
        let format = format.map_or(ptr::null(), CStr::as_ptr);
        let region = region.map_or(ptr::null(), |r| r as *const OfxRectD);
        // SAFETY: clipLoadTexture writes the texture handle on success.
        let raw = unsafe { invoke(|out| load(clip.as_raw(), time, format, region, out)) }?;
        Ok(PropertySet(raw))
    }

    pub fn free_texture(&self, texture: PropertySet) -> Result<(), StatusCode> {
        let free = entry!(self.table, clipFreeTexture);
        invoke_unit(|| unsafe { free(texture.as_raw()) })
    }

    /// Ask the host to release cached GL resources.
    pub fn flush_resources(&self) -> Result<(), StatusCode> {
        let flush = entry!(self.table, flushResources);
        invoke_unit(|| unsafe { flush() })
    }
}
