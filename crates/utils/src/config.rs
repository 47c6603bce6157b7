//! Tool configuration shared by every ARLDB command.
//!
//! Values are resolved in three layers: built-in defaults, the TOML file at
//! `~/.arldb/config.toml` (or an explicit path), and finally command line flags / environment
//! variables, which are applied by the caller through [`ToolConfig::merge`].

use std::{
    fs,
    path::{Path, PathBuf},
};

use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};

/// Name of the configuration file inside the arldb home directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Default caller address used both as `--set-caller-init` and as the sandbox payer.
pub const DEFAULT_CALLER: &str = "tz1Lc2qBKEWCBeDU8npG6zCeCqpmaegRi6Jg";

/// Paths and defaults for the external tools wrapped by ARLDB.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    /// The archetype compiler binary.
    pub archetype_bin: PathBuf,
    /// The octez client binary used to run scripts in mockup mode.
    pub octez_client_bin: PathBuf,
    /// Caller address injected at compilation and used as the transaction payer.
    pub caller: String,
    /// Extra arguments passed to every octez client invocation (e.g. `--base-dir`).
    pub octez_client_args: Vec<String>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            archetype_bin: PathBuf::from("archetype"),
            octez_client_bin: PathBuf::from("octez-client"),
            caller: DEFAULT_CALLER.to_string(),
            octez_client_args: vec!["--mode".to_string(), "mockup".to_string()],
        }
    }
}

/// Optional overrides coming from the command line.
#[derive(Clone, Debug, Default)]
pub struct ToolOverrides {
    pub archetype_bin: Option<PathBuf>,
    pub octez_client_bin: Option<PathBuf>,
    pub caller: Option<String>,
}

impl ToolConfig {
    /// Returns the default config file location: `~/.arldb/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs_next::home_dir().map(|p| p.join(".arldb").join(CONFIG_FILE_NAME))
    }

    /// Loads the configuration from `path`, or from the default location when `path` is
    /// `None`. A missing default file yields the built-in defaults; a missing explicit file
    /// is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => {
                    trace!("no config file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        debug!("loading tool config from {:?}", path);
        let content = fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&content).wrap_err_with(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Applies command line overrides on top of this configuration.
    pub fn merge(mut self, overrides: ToolOverrides) -> Self {
        if let Some(bin) = overrides.archetype_bin {
            self.archetype_bin = bin;
        }
        if let Some(bin) = overrides.octez_client_bin {
            self.octez_client_bin = bin;
        }
        if let Some(caller) = overrides.caller {
            self.caller = caller;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ToolConfig::from_toml(r#"archetype_bin = "/opt/archetype""#).unwrap();
        assert_eq!(config.archetype_bin, PathBuf::from("/opt/archetype"));
        assert_eq!(config.octez_client_bin, PathBuf::from("octez-client"));
        assert_eq!(config.caller, DEFAULT_CALLER);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(ToolConfig::from_toml("archetype = 1").is_err());
    }

    #[test]
    fn test_overrides_win() {
        let config = ToolConfig::default().merge(ToolOverrides {
            caller: Some("tz1other".to_string()),
            ..Default::default()
        });
        assert_eq!(config.caller, "tz1other");
        assert_eq!(config.archetype_bin, PathBuf::from("archetype"));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&file, "octez_client_args = []\n").unwrap();

        let config = ToolConfig::load(Some(&file)).unwrap();
        assert!(config.octez_client_args.is_empty());

        assert!(ToolConfig::load(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
