//! Plugin binary inspection using libloading.
//!
//! Opens an OpenFX binary, resolves its two exported entry points and reads
//! the `OfxPlugin` records it describes. No action is ever dispatched to the
//! plugin; `setHost` and `mainEntry` are only checked for presence.

use std::ffi::{c_char, CStr};
use std::path::{Path, PathBuf};

use libloading::Library;
use ofxkit_ffi::{
    OfxGetNumberOfPluginsFn, OfxGetPluginFn, OfxPlugin, OFX_GET_NUMBER_OF_PLUGINS_SYMBOL,
    OFX_GET_PLUGIN_SYMBOL,
};
use serde::Serialize;

use crate::discovery::PluginBundle;

/// Errors that can occur while loading or inspecting a plugin binary.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Bundle ships no binary for this platform.
    #[error("bundle {0} has no binary for this platform")]
    NoBinary(PathBuf),

    /// The dynamic library could not be opened.
    #[error("failed to load {path}: {source}")]
    Library {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    /// A required entry point is not exported.
    #[error("{path} does not export {symbol}")]
    MissingSymbol {
        path: PathBuf,
        symbol: &'static str,
        #[source]
        source: libloading::Error,
    },

    /// `OfxGetNumberOfPlugins` returned a negative count.
    #[error("plugin count is negative: {0}")]
    InvalidCount(i32),

    /// `OfxGetPlugin` returned null or an incomplete record.
    #[error("plugin {index} is invalid: {message}")]
    InvalidPlugin { index: usize, message: String },
}

/// Description of one plugin exported by a binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginInfo {
    pub index: usize,
    /// Plugin API, e.g. `OfxImageEffectPluginAPI`.
    pub api: String,
    pub api_version: i32,
    /// Reverse-domain identifier, e.g. `com.example.blur`.
    pub identifier: String,
    pub version_major: u32,
    pub version_minor: u32,
    pub has_set_host: bool,
    pub has_main_entry: bool,
}

impl PluginInfo {
    pub fn version(&self) -> String {
        format!("{}.{}", self.version_major, self.version_minor)
    }
}

/// A loaded plugin binary. The library stays loaded while this value lives.
pub struct PluginBinary {
    path: PathBuf,
    get_count: OfxGetNumberOfPluginsFn,
    get_plugin: OfxGetPluginFn,
    // Dropped last: the function pointers above point into it.
    _library: Library,
}

impl std::fmt::Debug for PluginBinary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginBinary")
            .field("path", &self.path)
            .finish()
    }
}

impl PluginBinary {
    /// Load a plugin binary.
    ///
    /// # Safety
    ///
    /// Loading runs the library's initialisers. Only open binaries from
    /// trusted sources, and only ones that really are OpenFX plugins: the
    /// exported symbols are assumed to have the OpenFX signatures.
    pub unsafe fn open(path: &Path) -> Result<Self, LoadError> {
        tracing::debug!(path = %path.display(), "Loading plugin binary");

        let library = Library::new(path).map_err(|source| LoadError::Library {
            path: path.to_path_buf(),
            source,
        })?;

        let get_count = *library
            .get::<OfxGetNumberOfPluginsFn>(OFX_GET_NUMBER_OF_PLUGINS_SYMBOL)
            .map_err(|source| LoadError::MissingSymbol {
                path: path.to_path_buf(),
                symbol: "OfxGetNumberOfPlugins",
                source,
            })?;

        let get_plugin = *library
            .get::<OfxGetPluginFn>(OFX_GET_PLUGIN_SYMBOL)
            .map_err(|source| LoadError::MissingSymbol {
                path: path.to_path_buf(),
                symbol: "OfxGetPlugin",
                source,
            })?;

        Ok(Self {
            path: path.to_path_buf(),
            get_count,
            get_plugin,
            _library: library,
        })
    }

    /// Load the binary of a discovered bundle.
    ///
    /// # Safety
    ///
    /// Same as [`PluginBinary::open`].
    pub unsafe fn open_bundle(bundle: &PluginBundle) -> Result<Self, LoadError> {
        let binary = bundle
            .binary
            .as_deref()
            .ok_or_else(|| LoadError::NoBinary(bundle.root.clone()))?;
        Self::open(binary)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn plugin_count(&self) -> Result<usize, LoadError> {
        // SAFETY: symbol resolved with this signature in `open`; the library is alive.
        unsafe { count_plugins(self.get_count) }
    }

    /// Read every plugin record the binary exports.
    pub fn plugins(&self) -> Result<Vec<PluginInfo>, LoadError> {
        // SAFETY: as above; the records live as long as the library.
        unsafe { read_plugins(self.get_count, self.get_plugin) }
    }
}

unsafe fn count_plugins(get_count: OfxGetNumberOfPluginsFn) -> Result<usize, LoadError> {
    let count = get_count();
    usize::try_from(count).map_err(|_| LoadError::InvalidCount(count))
}

/// Walk the plugin table through the two exported entry points.
///
/// # Safety
///
/// Both functions must be callable, and every non-null record they return
/// must satisfy [`read_plugin`].
pub(crate) unsafe fn read_plugins(
    get_count: OfxGetNumberOfPluginsFn,
    get_plugin: OfxGetPluginFn,
) -> Result<Vec<PluginInfo>, LoadError> {
    let count = count_plugins(get_count)?;
    let mut plugins = Vec::new();
    for index in 0..count {
        let nth = i32::try_from(index).map_err(|_| LoadError::InvalidCount(i32::MAX))?;
        let record = get_plugin(nth);
        if record.is_null() {
            return Err(LoadError::InvalidPlugin {
                index,
                message: "OfxGetPlugin returned null".to_string(),
            });
        }
        let info = read_plugin(index, &*record)?;
        tracing::trace!(index, identifier = %info.identifier, "Read plugin record");
        plugins.push(info);
    }
    Ok(plugins)
}

/// Copy a plugin record out of library memory.
///
/// # Safety
///
/// The string pointers in `record` must be null or NUL-terminated.
pub(crate) unsafe fn read_plugin(
    index: usize,
    record: &OfxPlugin,
) -> Result<PluginInfo, LoadError> {
    let api = read_str(index, "pluginApi", record.pluginApi)?;
    let identifier = read_str(index, "pluginIdentifier", record.pluginIdentifier)?;
    Ok(PluginInfo {
        index,
        api,
        api_version: record.apiVersion,
        identifier,
        version_major: record.pluginVersionMajor,
        version_minor: record.pluginVersionMinor,
        has_set_host: record.setHost.is_some(),
        has_main_entry: record.mainEntry.is_some(),
    })
}

unsafe fn read_str(index: usize, field: &str, ptr: *const c_char) -> Result<String, LoadError> {
    if ptr.is_null() {
        return Err(LoadError::InvalidPlugin {
            index,
            message: format!("{field} is null"),
        });
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map(str::to_owned)
        .map_err(|_| LoadError::InvalidPlugin {
            index,
            message: format!("{field} is not valid UTF-8"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::ffi::c_int;
    use std::ptr;

    fn record(api: *const c_char, identifier: *const c_char) -> OfxPlugin {
        OfxPlugin {
            pluginApi: api,
            apiVersion: 1,
            pluginIdentifier: identifier,
            pluginVersionMajor: 2,
            pluginVersionMinor: 7,
            setHost: None,
            mainEntry: None,
        }
    }

    #[test]
    fn test_read_plugin_copies_fields() {
        let rec = record(c"OfxImageEffectPluginAPI".as_ptr(), c"com.example.blur".as_ptr());
        let info = unsafe { read_plugin(3, &rec) }.unwrap();
        assert_eq!(
            info,
            PluginInfo {
                index: 3,
                api: "OfxImageEffectPluginAPI".to_string(),
                api_version: 1,
                identifier: "com.example.blur".to_string(),
                version_major: 2,
                version_minor: 7,
                has_set_host: false,
                has_main_entry: false,
            }
        );
        assert_eq!(info.version(), "2.7");
    }

    #[test]
    fn test_read_plugin_rejects_null_and_bad_utf8() {
        let rec = record(c"OfxImageEffectPluginAPI".as_ptr(), ptr::null());
        let err = unsafe { read_plugin(0, &rec) }.unwrap_err();
        assert!(err.to_string().contains("pluginIdentifier is null"));

        let bad = [0xffu8, 0xfe, 0];
        let rec = record(bad.as_ptr().cast(), c"id".as_ptr());
        let err = unsafe { read_plugin(0, &rec) }.unwrap_err();
        assert!(err.to_string().contains("not valid UTF-8"));
    }

    #[test]
    fn test_open_missing_library() {
        let path = Path::new("/nonexistent/Missing.ofx");
        let err = unsafe { PluginBinary::open(path) }.unwrap_err();
        assert!(matches!(err, LoadError::Library { .. }));
    }

    #[test]
    fn test_open_bundle_without_binary() {
        let bundle = PluginBundle {
            name: "Empty".to_string(),
            root: PathBuf::from("/nonexistent/Empty.ofx.bundle"),
            binary: None,
        };
        let err = unsafe { PluginBinary::open_bundle(&bundle) }.unwrap_err();
        assert!(matches!(err, LoadError::NoBinary(_)));
    }

    struct Records([OfxPlugin; 2]);

    // SAFETY: the records only point at static strings and are never written.
    unsafe impl Sync for Records {}

    static RECORDS: Records = Records([
        OfxPlugin {
            pluginApi: c"OfxImageEffectPluginAPI".as_ptr(),
            apiVersion: 1,
            pluginIdentifier: c"com.example.blur".as_ptr(),
            pluginVersionMajor: 1,
            pluginVersionMinor: 0,
            setHost: None,
            mainEntry: None,
        },
        OfxPlugin {
            pluginApi: c"OfxImageEffectPluginAPI".as_ptr(),
            apiVersion: 1,
            pluginIdentifier: c"com.example.sharpen".as_ptr(),
            pluginVersionMajor: 3,
            pluginVersionMinor: 2,
            setHost: None,
            mainEntry: None,
        },
    ]);

    unsafe extern "C" fn two_plugins() -> c_int {
        2
    }

    unsafe extern "C" fn negative_count() -> c_int {
        -1
    }

    unsafe extern "C" fn huge_count() -> c_int {
        c_int::MAX
    }

    unsafe extern "C" fn get_record(nth: c_int) -> *mut OfxPlugin {
        match RECORDS.0.get(nth as usize) {
            Some(record) => record as *const OfxPlugin as *mut OfxPlugin,
            None => ptr::null_mut(),
        }
    }

    unsafe extern "C" fn second_is_null(nth: c_int) -> *mut OfxPlugin {
        if nth == 0 {
            get_record(0)
        } else {
            ptr::null_mut()
        }
    }

    #[test]
    fn test_read_plugins_walks_every_record() {
        let plugins = unsafe { read_plugins(two_plugins, get_record) }.unwrap();
        let ids: Vec<_> = plugins.iter().map(|p| p.identifier.as_str()).collect();
        assert_eq!(ids, vec!["com.example.blur", "com.example.sharpen"]);
        assert_eq!(plugins[1].index, 1);
        assert_eq!(plugins[1].version(), "3.2");
    }

    #[test]
    fn test_read_plugins_rejects_negative_count() {
        let err = unsafe { read_plugins(negative_count, get_record) }.unwrap_err();
        assert!(matches!(err, LoadError::InvalidCount(-1)));
    }

    #[test]
    fn test_read_plugins_stops_at_null_record() {
        let err = unsafe { read_plugins(two_plugins, second_is_null) }.unwrap_err();
        assert!(matches!(err, LoadError::InvalidPlugin { index: 1, .. }));
        assert!(err.to_string().contains("returned null"));
    }

    #[test]
    fn test_huge_count_does_not_preallocate() {
        // The third record is null, so this fails fast instead of reserving
        // room for i32::MAX entries up front.
        let err = unsafe { read_plugins(huge_count, get_record) }.unwrap_err();
        assert!(matches!(err, LoadError::InvalidPlugin { index: 2, .. }));
    }
}
