//! Turning command-line flags and settings files into a runner setup

use anyhow::{Context, Result, bail};
use efrun_core::{IniConfig, RunnerSettings};
use std::path::Path;
use tracing::debug;

use crate::cli::ConfigArgs;

/// Split `section.key=value`. The key is whatever follows the last dot before
/// the `=`, so section names may themselves contain dots.
pub fn parse_set_override(raw: &str) -> Result<(String, String, String)> {
    let Some((target, value)) = raw.split_once('=') else {
        bail!("Invalid --set `{raw}`: expected SECTION.KEY=VALUE");
    };
    let Some((section, key)) = target.trim().rsplit_once('.') else {
        bail!("Invalid --set `{raw}`: missing section, expected SECTION.KEY=VALUE");
    };

    let (section, key) = (section.trim(), key.trim());
    if section.is_empty() || key.is_empty() {
        bail!("Invalid --set `{raw}`: section and key must not be empty");
    }

    Ok((section.to_string(), key.to_string(), value.trim().to_string()))
}

/// Base config file (if any) with every `--set` applied on top, in order.
pub fn load_config(args: &ConfigArgs) -> Result<IniConfig> {
    let mut config = match &args.config {
        Some(path) => IniConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => IniConfig::default(),
    };

    for raw in &args.set {
        let (section, key, value) = parse_set_override(raw)?;
        debug!("Override {}.{} = {}", section, key, value);
        config.set(&section, key, value);
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Nearest settings file above `cwd`, with environment overrides applied.
pub fn resolve_settings(cwd: &Path) -> Result<RunnerSettings> {
    let mut settings = RunnerSettings::discover(cwd).context("Failed to load efrun settings")?;
    settings.merge_env();
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_set_override() {
        assert_eq!(
            parse_set_override("simulation.steps=500").unwrap(),
            (
                "simulation".to_string(),
                "steps".to_string(),
                "500".to_string()
            )
        );
    }

    #[test]
    fn test_parse_set_override_value_may_contain_equals() {
        let (_, _, value) = parse_set_override("run.expr=a=b").unwrap();
        assert_eq!(value, "a=b");
    }

    #[test]
    fn test_parse_set_override_dotted_section() {
        let (section, key, _) = parse_set_override("phase.2.steps=10").unwrap();
        assert_eq!(section, "phase.2");
        assert_eq!(key, "steps");
    }

    #[test]
    fn test_parse_set_override_rejects_malformed() {
        assert!(parse_set_override("steps=5").is_err());
        assert!(parse_set_override("run.steps").is_err());
        assert!(parse_set_override(".steps=5").is_err());
        assert!(parse_set_override("run.=5").is_err());
    }

    #[test]
    fn test_load_config_applies_overrides_over_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("base.ini");
        std::fs::write(&path, "[run]\nsteps = 10\nseed = 1\n").unwrap();

        let args = ConfigArgs {
            config: Some(path),
            set: vec!["run.steps=20".to_string(), "output.file=o.dat".to_string()],
        };
        let config = load_config(&args).unwrap();

        assert_eq!(
            config.to_ini_string(),
            "[run]\nsteps = 20\nseed = 1\n\n[output]\nfile = o.dat\n\n"
        );
    }

    #[test]
    fn test_load_config_rejects_multiline_override() {
        let args = ConfigArgs {
            config: None,
            set: vec!["run.note=first\nsecond = injected".to_string()],
        };
        let err = load_config(&args).unwrap_err();
        assert!(err.to_string().contains("Invalid configuration"));
        assert!(format!("{err:#}").contains("single line"));
    }

    #[test]
    fn test_load_config_missing_file_has_context() {
        let args = ConfigArgs {
            config: Some("/no/such/efrun/config.ini".into()),
            set: Vec::new(),
        };
        let err = load_config(&args).unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
    }
}
