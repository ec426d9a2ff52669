//! Plugin bundle discovery - finding `.ofx.bundle` directories on disk.
//!
//! An OpenFX bundle is a directory named `<Name>.ofx.bundle` whose binary
//! lives at `Contents/<arch>/<Name>.ofx`. Hosts search the directories in
//! `OFX_PLUGIN_PATH` first and then a platform default.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Environment variable listing extra plugin directories.
pub const PLUGIN_PATH_ENV: &str = "OFX_PLUGIN_PATH";

const BUNDLE_SUFFIX: &str = ".ofx.bundle";

/// Deepest directory level scanned below a search root.
const MAX_SCAN_DEPTH: usize = 8;

/// A plugin bundle found on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginBundle {
    /// Bundle name without the `.ofx.bundle` suffix.
    pub name: String,
    /// The `.ofx.bundle` directory.
    pub root: PathBuf,
    /// Binary for the running platform, if the bundle ships one.
    pub binary: Option<PathBuf>,
}

impl PluginBundle {
    /// Interpret `root` as a bundle directory. Returns `None` if the name
    /// does not end in `.ofx.bundle`.
    pub fn from_root(root: &Path) -> Option<Self> {
        let dir_name = root.file_name().and_then(OsStr::to_str)?;
        let name = dir_name.strip_suffix(BUNDLE_SUFFIX)?;
        if name.is_empty() {
            return None;
        }

        let candidate = root
            .join("Contents")
            .join(platform_arch_dir())
            .join(format!("{name}.ofx"));
        let binary = candidate.is_file().then_some(candidate);

        Some(Self {
            name: name.to_string(),
            root: root.to_path_buf(),
            binary,
        })
    }
}

/// Architecture directory inside `Contents/` for the running platform.
pub fn platform_arch_dir() -> &'static str {
    if cfg!(target_os = "macos") {
        "MacOS"
    } else if cfg!(all(target_os = "windows", target_pointer_width = "64")) {
        "Win64"
    } else if cfg!(target_os = "windows") {
        "Win32"
    } else if cfg!(target_pointer_width = "64") {
        "Linux-x86-64"
    } else {
        "Linux-x86"
    }
}

/// The platform's standard plugin directory.
pub fn default_plugin_dir() -> PathBuf {
    if cfg!(target_os = "macos") {
        PathBuf::from("/Library/OFX/Plugins")
    } else if cfg!(target_os = "windows") {
        PathBuf::from(r"C:\Program Files\Common Files\OFX\Plugins")
    } else {
        PathBuf::from("/usr/OFX/Plugins")
    }
}

/// Split an `OFX_PLUGIN_PATH`-style value on the platform separator.
pub fn parse_plugin_path(value: &OsStr) -> Vec<PathBuf> {
    std::env::split_paths(value)
        .filter(|p| !p.as_os_str().is_empty())
        .collect()
}

/// All directories that may contain plugins.
///
/// Returns directories in priority order:
/// 1. Entries of `OFX_PLUGIN_PATH`
/// 2. `extra` directories (usually from the config file)
/// 3. The platform default
///
/// Directories that don't exist are skipped and duplicates removed.
pub fn discover_plugin_dirs(extra: &[PathBuf]) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(value) = std::env::var_os(PLUGIN_PATH_ENV) {
        candidates.extend(parse_plugin_path(&value));
    }
    candidates.extend(extra.iter().cloned());
    candidates.push(default_plugin_dir());

    let mut dirs: Vec<PathBuf> = Vec::new();
    for dir in candidates {
        if !dir.is_dir() {
            tracing::trace!(dir = %dir.display(), "Skipping missing plugin directory");
            continue;
        }
        if !dirs.contains(&dir) {
            dirs.push(dir);
        }
    }
    dirs
}

/// Find all bundles below `dir`.
///
/// Bundles are not searched inside other bundles. Results are sorted by path.
pub fn find_bundles(dir: &Path) -> Vec<PluginBundle> {
    let mut bundles = Vec::new();
    scan(dir, 0, &mut bundles);
    bundles.sort_by(|a, b| a.root.cmp(&b.root));
    bundles
}

/// Find bundles in every directory of `dirs`, in order, without duplicates.
pub fn find_all_bundles(dirs: &[PathBuf]) -> Vec<PluginBundle> {
    let mut all: Vec<PluginBundle> = Vec::new();
    for dir in dirs {
        for bundle in find_bundles(dir) {
            if !all.iter().any(|b| b.root == bundle.root) {
                all.push(bundle);
            }
        }
    }
    all
}

fn scan(dir: &Path, depth: usize, out: &mut Vec<PluginBundle>) {
    if depth > MAX_SCAN_DEPTH {
        return;
    }

    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "Could not read plugin directory");
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        match PluginBundle::from_root(&path) {
            Some(bundle) => {
                if bundle.binary.is_none() {
                    tracing::debug!(
                        bundle = %bundle.root.display(),
                        arch = platform_arch_dir(),
                        "Bundle has no binary for this platform"
                    );
                }
                out.push(bundle);
            }
            None => scan(&path, depth + 1, out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serial_test::serial;
    use std::fs;

    fn make_bundle(parent: &Path, name: &str, with_binary: bool) -> PathBuf {
        let root = parent.join(format!("{name}.ofx.bundle"));
        let arch = root.join("Contents").join(platform_arch_dir());
        fs::create_dir_all(&arch).unwrap();
        if with_binary {
            fs::write(arch.join(format!("{name}.ofx")), b"not really a library").unwrap();
        }
        root
    }

    #[test]
    fn test_from_root_requires_suffix() {
        assert!(PluginBundle::from_root(Path::new("/tmp/Blur")).is_none());
        assert!(PluginBundle::from_root(Path::new("/tmp/.ofx.bundle")).is_none());
        let bundle = PluginBundle::from_root(Path::new("/nonexistent/Blur.ofx.bundle")).unwrap();
        assert_eq!(bundle.name, "Blur");
        assert_eq!(bundle.binary, None);
    }

    #[test]
    fn test_find_bundles_nested_and_sorted() {
        let temp_dir = tempfile::tempdir().unwrap();
        let vendor = temp_dir.path().join("Vendor");
        fs::create_dir_all(&vendor).unwrap();

        make_bundle(temp_dir.path(), "Zoom", true);
        make_bundle(&vendor, "Blur", true);
        make_bundle(temp_dir.path(), "Broken", false);
        fs::write(temp_dir.path().join("readme.txt"), "not a bundle").unwrap();

        let bundles = find_bundles(temp_dir.path());
        let names: Vec<_> = bundles.iter().map(|b| b.name.as_str()).collect();
        // Sorted by bundle path, so the nested one sits under "Vendor".
        assert_eq!(names, vec!["Broken", "Blur", "Zoom"]);

        let blur = bundles.iter().find(|b| b.name == "Blur").unwrap();
        assert!(blur.binary.as_ref().unwrap().ends_with("Blur.ofx"));
        let broken = bundles.iter().find(|b| b.name == "Broken").unwrap();
        assert_eq!(broken.binary, None);
    }

    #[test]
    fn test_bundles_inside_bundles_are_not_listed() {
        let temp_dir = tempfile::tempdir().unwrap();
        let outer = make_bundle(temp_dir.path(), "Outer", true);
        make_bundle(&outer.join("Contents").join("Resources"), "Inner", true);

        let bundles = find_bundles(temp_dir.path());
        assert_eq!(bundles.len(), 1);
        assert_eq!(bundles[0].name, "Outer");
    }

    #[test]
    fn test_parse_plugin_path() {
        let a = PathBuf::from("/opt/ofx");
        let b = PathBuf::from("/home/me/ofx");
        let joined = std::env::join_paths([&a, &b]).unwrap();
        assert_eq!(parse_plugin_path(&joined), vec![a, b]);
        assert!(parse_plugin_path(OsStr::new("")).is_empty());
    }

    #[test]
    #[serial]
    fn test_discover_plugin_dirs_env_first_and_deduplicated() {
        let env_dir = tempfile::tempdir().unwrap();
        let extra_dir = tempfile::tempdir().unwrap();
        let joined = std::env::join_paths([
            env_dir.path(),
            Path::new("/definitely/not/here"),
            env_dir.path(),
        ])
        .unwrap();

        std::env::set_var(PLUGIN_PATH_ENV, &joined);
        let dirs = discover_plugin_dirs(&[extra_dir.path().to_path_buf()]);
        std::env::remove_var(PLUGIN_PATH_ENV);

        assert_eq!(dirs[0], env_dir.path());
        assert_eq!(dirs[1], extra_dir.path());
        assert_eq!(dirs.iter().filter(|d| *d == env_dir.path()).count(), 1);
        assert!(!dirs.iter().any(|d| d == Path::new("/definitely/not/here")));
    }
}
