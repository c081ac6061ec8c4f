//! Writing the configuration to the file the engine will read

use crate::{config::ConfigExport, error::Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tracing::debug;

/// An exported configuration file on disk.
///
/// A `Temporary` file is removed when this value is dropped, whichever way
/// the run ends. A `Persistent` file is left in place.
#[derive(Debug)]
pub enum StagedConfig {
    Temporary(TempPath),
    Persistent(PathBuf),
}

impl StagedConfig {
    /// Export `config` into a fresh `.ini` temp file, or into `save_as` when given.
    ///
    /// A relative `save_as` is resolved against the current directory so the
    /// engine finds the same file from its own working directory.
    pub fn stage<C: ConfigExport + ?Sized>(config: &C, save_as: Option<&Path>) -> Result<Self> {
        match save_as {
            None => Self::temporary_in(config, &std::env::temp_dir()),
            Some(path) => {
                let path = std::path::absolute(path)?;
                let mut writer = BufWriter::new(File::create(&path)?);
                config.export_to(&mut writer)?;
                writer.flush()?;
                drop(writer);
                debug!("Saved config to {}", path.display());
                Ok(StagedConfig::Persistent(path))
            }
        }
    }

    /// Export `config` into a new `efrun-*.ini` file inside `dir`.
    pub fn temporary_in<C: ConfigExport + ?Sized>(config: &C, dir: &Path) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("efrun-")
            .suffix(".ini")
            .tempfile_in(dir)?;
        config.export_to(&mut file)?;
        file.flush()?;
        // Closes the handle; the path still deletes on drop
        let path = file.into_temp_path();
        debug!("Staged temporary config at {}", path.display());
        Ok(StagedConfig::Temporary(path))
    }

    pub fn path(&self) -> &Path {
        match self {
            StagedConfig::Temporary(path) => &**path,
            StagedConfig::Persistent(path) => path.as_path(),
        }
    }

    pub fn is_temporary(&self) -> bool {
        matches!(self, StagedConfig::Temporary(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IniConfig;
    use crate::error::Error;
    use std::io;
    use tempfile::TempDir;

    struct FailingConfig;

    impl ConfigExport for FailingConfig {
        fn export_to(&self, writer: &mut dyn Write) -> Result<()> {
            writer.write_all(b"[partial]\n")?;
            Err(Error::ExportError("engine section missing".to_string()))
        }
    }

    #[test]
    fn test_temporary_config_has_ini_suffix_and_is_removed_on_drop() {
        let config = IniConfig::new().with("run", "steps", "1");
        let staged = StagedConfig::stage(&config, None).unwrap();
        let path = staged.path().to_path_buf();

        assert!(staged.is_temporary());
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("ini"));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "[run]\nsteps = 1\n\n"
        );

        drop(staged);
        assert!(!path.exists());
    }

    #[test]
    fn test_persistent_config_is_kept_and_overwritten() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("saved.ini");
        std::fs::write(&target, "stale contents that are much longer than the new ones\n")
            .unwrap();

        let config = IniConfig::new().with("run", "steps", "2");
        let staged = StagedConfig::stage(&config, Some(&target)).unwrap();
        assert!(!staged.is_temporary());
        assert_eq!(staged.path(), target);
        drop(staged);

        assert_eq!(
            std::fs::read_to_string(&target).unwrap(),
            "[run]\nsteps = 2\n\n"
        );
    }

    #[test]
    fn test_failed_export_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = StagedConfig::temporary_in(&FailingConfig, temp_dir.path()).unwrap_err();

        assert!(matches!(err, Error::ExportError(_)));
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_parent_dir_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("nope").join("saved.ini");
        let err = StagedConfig::stage(&IniConfig::new(), Some(&target)).unwrap_err();
        match err {
            Error::IoError(e) => assert_eq!(e.kind(), io::ErrorKind::NotFound),
            other => panic!("unexpected error: {other}"),
        }
    }
}
