//! Runtime settings for mycnf.
//!
//! The CLI builds a [`Config`] from its arguments and the optional user
//! preference file (`~/.mycnf/config.toml`) and stores it globally. Library
//! code that needs it, such as the pretty printer, reads it back with
//! [`get_config`].
//!
//! ```rust
//! use mycnf::config::get_config;
//! // Unknown keys are kept unless the user opts out
//! let config = get_config();
//! assert!(config.keep_unknown_keys);
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::{debug, trace};
use once_cell::sync::OnceCell;
use serde::Deserialize;

use crate::error::{MycnfError, Result};
use crate::placeholders::application_dir;

/// Name of the option file looked for next to the executable.
pub const DEFAULT_INI_NAME: &str = "my.ini";

/// The runtime configuration used across the program.
#[derive(Debug, Clone)]
pub struct Config {
    /// A level of verbosity to determine how much we print in logs.
    pub verbose: u8,
    /// Suppress everything but errors on stdout.
    pub quiet: bool,
    /// The directory `%AppDir%` expands to.
    pub app_dir: PathBuf,
    /// The option file being edited.
    pub ini_path: PathBuf,
    /// An external schema file; the built-in catalog is used when unset.
    pub schema_path: Option<PathBuf>,
    /// Write keys and sections the schema does not know back to the file.
    pub keep_unknown_keys: bool,
    /// Colour roles mapped to `"r,g,b"` strings.
    pub colourscheme: HashMap<String, String>,
}

/// Cell for storing global Config
static CONFIG: OnceCell<Config> = OnceCell::new();

/// To initialize global config with custom values
pub fn set_global_config(config: Config) {
    CONFIG.set(config).ok(); // first writer wins
}

/// Get the global config.
/// This will return default config if the config isn't initialized
pub fn get_config() -> &'static Config {
    CONFIG.get_or_init(Config::default)
}

/// The default colour scheme.
pub fn default_colourscheme() -> HashMap<String, String> {
    [
        ("informational", "255,215,0"),
        ("warning", "255,165,0"),
        ("success", "0,255,0"),
        ("error", "255,0,0"),
        ("question", "255,215,0"),
        ("statement", "255,255,255"),
    ]
    .into_iter()
    .map(|(role, rgb)| (role.to_string(), rgb.to_string()))
    .collect()
}

impl Default for Config {
    fn default() -> Self {
        let app_dir = application_dir();
        Config {
            verbose: 0,
            quiet: false,
            ini_path: app_dir.join(DEFAULT_INI_NAME),
            app_dir,
            schema_path: None,
            keep_unknown_keys: true,
            colourscheme: default_colourscheme(),
        }
    }
}

/// Settings read from the user preference file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct UserPreferences {
    /// Overrides [`Config::keep_unknown_keys`].
    pub keep_unknown_keys: Option<bool>,
    /// Overrides [`Config::schema_path`].
    pub schema_path: Option<PathBuf>,
    /// Replaces individual colour roles.
    pub colourscheme: HashMap<String, String>,
}

impl UserPreferences {
    /// Applies these preferences on top of `config`.
    pub fn apply(&self, config: &mut Config) {
        if let Some(keep) = self.keep_unknown_keys {
            config.keep_unknown_keys = keep;
        }
        if let Some(schema) = &self.schema_path {
            config.schema_path = Some(schema.clone());
        }
        for (role, rgb) in &self.colourscheme {
            config.colourscheme.insert(role.clone(), rgb.clone());
        }
    }
}

/// Returns the path to the preference file (~/.mycnf/config.toml)
pub fn preferences_path() -> Option<PathBuf> {
    let mut path = dirs::home_dir()?;
    path.push(".mycnf");
    path.push("config.toml");
    Some(path)
}

/// Reads a preference file. A missing file yields `None`.
pub fn load_preferences(path: &Path) -> Result<Option<UserPreferences>> {
    if !path.exists() {
        trace!("No preference file at {}", path.display());
        return Ok(None);
    }
    let text = std::fs::read_to_string(path)?;
    let preferences: UserPreferences = toml::from_str(&text)
        .map_err(|e| MycnfError::Config(format!("{}: {}", path.display(), e)))?;
    debug!("Loaded preferences from {}", path.display());
    Ok(Some(preferences))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.keep_unknown_keys);
        assert!(config.ini_path.ends_with(DEFAULT_INI_NAME));
        assert_eq!(config.ini_path.parent(), Some(config.app_dir.as_path()));
        assert!(config.colourscheme.contains_key("success"));
    }

    #[test]
    fn test_missing_preferences_file() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_preferences(&dir.path().join("config.toml")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_preferences_apply() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "keep_unknown_keys = false\n[colourscheme]\nsuccess = \"1,2,3\"\n",
        )
        .unwrap();

        let prefs = load_preferences(&path).unwrap().unwrap();
        let mut config = Config::default();
        prefs.apply(&mut config);
        assert!(!config.keep_unknown_keys);
        assert_eq!(config.colourscheme["success"], "1,2,3");
        assert_eq!(config.colourscheme["warning"], "255,165,0");
        assert!(config.schema_path.is_none());
    }

    #[test]
    fn test_invalid_preferences_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "keep_unknown_keys = \"sometimes\"\n").unwrap();
        assert!(matches!(
            load_preferences(&path),
            Err(MycnfError::Config(_))
        ));
    }
}
