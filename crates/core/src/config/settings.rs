use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Command used when nothing else names one: the engine's entry script,
/// two directories up from the working directory.
pub const DEFAULT_COMMAND: &str = "python3 ../../main.py";

pub const SETTINGS_FILE_NAMES: [&str; 2] = [".efrun.json", "efrun.json"];

pub const COMMAND_ENV_VAR: &str = "EFRUN_COMMAND";
pub const WORKDIR_ENV_VAR: &str = "EFRUN_WORKDIR";

/// Persisted runner defaults, read from `.efrun.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RunnerSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workdir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_config_as: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

impl RunnerSettings {
    /// Settings with every default spelled out, as written by `efrun init`
    pub fn with_defaults() -> Self {
        Self {
            command: Some(DEFAULT_COMMAND.to_string()),
            workdir: Some(PathBuf::from(".")),
            ..Default::default()
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let settings = serde_json::from_str(&contents)
            .map_err(|e| Error::ConfigError(format!("Failed to parse settings: {e}")))?;
        Ok(settings)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn find_config_file(start_path: &Path) -> Option<PathBuf> {
        let mut current = start_path;

        loop {
            for name in SETTINGS_FILE_NAMES {
                let config_path = current.join(name);
                if config_path.is_file() {
                    return Some(config_path);
                }
            }

            current = current.parent()?;
        }
    }

    /// Load the nearest settings file above `start_path`, or defaults when none exists.
    pub fn discover(start_path: &Path) -> Result<Self> {
        match Self::find_config_file(start_path) {
            Some(path) => {
                debug!("Loading settings from {}", path.display());
                let mut settings = Self::load_from_file(&path)?;
                settings.resolve_relative_to(path.parent().unwrap_or(Path::new(".")));
                Ok(settings)
            }
            None => {
                debug!("No settings file found above {}", start_path.display());
                Ok(Self::default())
            }
        }
    }

    /// Paths in a settings file are relative to the directory holding it.
    fn resolve_relative_to(&mut self, base: &Path) {
        if let Some(workdir) = self.workdir.take() {
            self.workdir = Some(if workdir.is_relative() {
                base.join(workdir)
            } else {
                workdir
            });
        }
        if let Some(path) = self.save_config_as.take() {
            self.save_config_as = Some(if path.is_relative() {
                base.join(path)
            } else {
                path
            });
        }
    }

    /// Apply `EFRUN_COMMAND` / `EFRUN_WORKDIR` on top of file values.
    pub fn merge_env(&mut self) {
        self.merge_vars(|key| std::env::var(key).ok());
    }

    fn merge_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(command) = lookup(COMMAND_ENV_VAR).filter(|c| !c.trim().is_empty()) {
            self.command = Some(command);
        }
        if let Some(workdir) = lookup(WORKDIR_ENV_VAR).filter(|w| !w.is_empty()) {
            self.workdir = Some(PathBuf::from(workdir));
        }
    }

    pub fn command_or_default(&self) -> &str {
        self.command.as_deref().unwrap_or(DEFAULT_COMMAND)
    }

    pub fn workdir_or_default(&self) -> &Path {
        self.workdir.as_deref().unwrap_or(Path::new("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_settings_serialization() {
        let mut settings = RunnerSettings::with_defaults();
        settings
            .env
            .insert("OMP_NUM_THREADS".to_string(), "4".to_string());

        let json = serde_json::to_string_pretty(&settings).unwrap();
        let parsed: RunnerSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, settings);
        assert!(!json.contains("save_config_as"));
    }

    #[test]
    fn test_find_config_file_walks_up() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("runs").join("batch-1");
        std::fs::create_dir_all(&nested).unwrap();
        let settings_path = temp_dir.path().join(".efrun.json");
        std::fs::write(&settings_path, "{}").unwrap();

        assert_eq!(
            RunnerSettings::find_config_file(&nested),
            Some(settings_path)
        );
    }

    #[test]
    fn test_discover_resolves_paths_against_settings_dir() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("sub");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(
            temp_dir.path().join("efrun.json"),
            r#"{"command": "sim --quiet", "workdir": "work", "save_config_as": "/tmp/keep.ini"}"#,
        )
        .unwrap();

        let settings = RunnerSettings::discover(&nested).unwrap();
        assert_eq!(settings.command_or_default(), "sim --quiet");
        assert_eq!(settings.workdir_or_default(), temp_dir.path().join("work"));
        assert_eq!(
            settings.save_config_as.as_deref(),
            Some(Path::new("/tmp/keep.ini"))
        );
    }

    #[test]
    fn test_invalid_settings_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".efrun.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            RunnerSettings::load_from_file(&path),
            Err(Error::ConfigError(_))
        ));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut settings = RunnerSettings {
            command: Some("from-file".to_string()),
            ..Default::default()
        };
        settings.merge_vars(|key| match key {
            COMMAND_ENV_VAR => Some("from-env --fast".to_string()),
            WORKDIR_ENV_VAR => Some("/data/runs".to_string()),
            _ => None,
        });

        assert_eq!(settings.command_or_default(), "from-env --fast");
        assert_eq!(settings.workdir_or_default(), Path::new("/data/runs"));
    }

    #[test]
    fn test_blank_env_command_is_ignored() {
        let mut settings = RunnerSettings::default();
        settings.merge_vars(|_| Some("   ".to_string()));
        assert_eq!(settings.command_or_default(), DEFAULT_COMMAND);
    }
}
