//! Configuration file loading and environment variable handling.
//!
//! Precedence: CLI args > Environment vars > Config file > Defaults

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Default config file content for `--config-init`.
pub const DEFAULT_CONFIG: &str = r#"# ofxkit configuration
# See: ofxkit --help for all options

# Extra directories searched for .ofx.bundle plugins, after OFX_PLUGIN_PATH
# and before the platform default.
plugin_paths = []

# Disable colored output
no_color = false

# Print JSON instead of tables
json = false
"#;

/// Configuration loaded from file and environment.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub plugin_paths: Option<Vec<PathBuf>>,
    pub no_color: Option<bool>,
    pub json: Option<bool>,
}

impl Config {
    /// Get the config file path.
    ///
    /// - Linux/macOS: `~/.config/ofxkit/config.toml`
    /// - Windows: `%APPDATA%\ofxkit\config.toml`
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("ofxkit").join("config.toml"))
    }

    /// Load config from file. Returns default if file doesn't exist.
    pub fn load() -> Self {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        let Ok(contents) = fs::read_to_string(path) else {
            return Self::default();
        };

        toml::from_str(&contents).unwrap_or_else(|e| {
            eprintln!("Warning: Failed to parse {}: {}", path.display(), e);
            Self::default()
        })
    }

    /// Read value from environment variable.
    fn env_var<T: std::str::FromStr>(name: &str) -> Option<T> {
        std::env::var(name).ok()?.parse().ok()
    }

    /// Extra plugin directories: `OFXKIT_PLUGIN_PATHS` replaces the config
    /// file list when set.
    ///
    /// `OFX_PLUGIN_PATH` is handled by discovery itself and always wins.
    pub fn plugin_paths(&self) -> Vec<PathBuf> {
        if let Some(value) = std::env::var_os("OFXKIT_PLUGIN_PATHS") {
            return ofxkit_core::discovery::parse_plugin_path(&value);
        }
        self.plugin_paths.clone().unwrap_or_default()
    }

    /// Get no_color with precedence: env > config > default.
    ///
    /// Respects the `NO_COLOR` standard (https://no-color.org/).
    pub fn no_color(&self) -> bool {
        // NO_COLOR is a standard - presence means disable color
        if std::env::var("NO_COLOR").is_ok() {
            return true;
        }
        if std::env::var("OFXKIT_NO_COLOR").is_ok() {
            return true;
        }
        self.no_color.unwrap_or(false)
    }

    /// Get json with precedence: env > config > default.
    pub fn json(&self) -> bool {
        Self::env_var("OFXKIT_JSON").or(self.json).unwrap_or(false)
    }
}

/// Create a default config file at the standard location.
pub fn init_config() -> Result<PathBuf, String> {
    let path = Config::path().ok_or("Cannot determine config directory")?;
    write_default(&path)?;
    Ok(path)
}

fn write_default(path: &Path) -> Result<(), String> {
    if path.exists() {
        return Err(format!("Config file already exists: {}", path.display()));
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| format!("Failed to create directory: {}", e))?;
    }

    fs::write(path, DEFAULT_CONFIG).map_err(|e| format!("Failed to write config: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serial_test::serial;

    #[test]
    fn test_default_config_is_valid_toml() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).expect("DEFAULT_CONFIG should parse");
        assert_eq!(config.plugin_paths, Some(vec![]));
        assert_eq!(config.no_color, Some(false));
        assert_eq!(config.json, Some(false));
    }

    #[test]
    fn test_partial_config() {
        let toml = r#"
plugin_paths = ["/opt/ofx", "/studio/plugins"]
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.plugin_paths,
            Some(vec![PathBuf::from("/opt/ofx"), PathBuf::from("/studio/plugins")])
        );
        assert_eq!(config.json, None);
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        let config: Config = toml::from_str("json = false\nplugin_paths = [\"/opt/ofx\"]").unwrap();

        std::env::set_var("OFXKIT_JSON", "true");
        std::env::set_var("OFXKIT_PLUGIN_PATHS", "/from/env");
        let json = config.json();
        let paths = config.plugin_paths();
        std::env::remove_var("OFXKIT_JSON");
        std::env::remove_var("OFXKIT_PLUGIN_PATHS");

        assert!(json);
        assert_eq!(paths, vec![PathBuf::from("/from/env")]);
        assert_eq!(config.plugin_paths(), vec![PathBuf::from("/opt/ofx")]);
    }

    #[test]
    #[serial]
    fn test_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.plugin_paths().is_empty());
        assert!(!config.json());
    }

    #[test]
    fn test_write_default_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("ofxkit").join("config.toml");

        write_default(&path).unwrap();
        let config = Config::load_from(&path);
        assert_eq!(config.no_color, Some(false));

        let err = write_default(&path).unwrap_err();
        assert!(err.contains("already exists"));
    }

    #[test]
    fn test_invalid_file_falls_back_to_default() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "json = \"not a bool\"").unwrap();

        let config = Config::load_from(&path);
        assert_eq!(config.json, None);
    }
}
