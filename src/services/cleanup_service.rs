//! Cleanup Service
//!
//! Rewrites raw exports so they parse as comma-separated files with `.`
//! decimals: every `,` becomes `.`, then every `;` becomes `,`.
//! The rewrite is byte-level, so Latin-1 exports pass through unchanged
//! apart from the two separators.

use crate::config::CleanupConfig;
use crate::error::{AppError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Replace `,` with `.` and then `;` with `,`
pub fn normalize_separators(input: &[u8]) -> Vec<u8> {
    input
        .iter()
        .map(|&b| match b {
            b',' => b'.',
            b';' => b',',
            other => other,
        })
        .collect()
}

pub struct CleanupService;

impl CleanupService {
    /// Resolve a file name typed at the prompt against the data directory
    pub fn resolve(config: &CleanupConfig, name: &str) -> Result<PathBuf> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::InvalidArgument("file name is empty".into()));
        }
        let path = Path::new(name);
        Ok(if path.is_absolute() {
            path.to_path_buf()
        } else {
            config.data_dir.join(path)
        })
    }

    /// Normalize a file in place, returning the rewritten path
    pub fn update_file(config: &CleanupConfig, name: &str) -> Result<PathBuf> {
        let path = Self::resolve(config, name)?;
        info!("CleanupService::update_file - {}", path.display());

        let original = fs::read(&path)?;
        if config.backup {
            let mut backup = path.clone().into_os_string();
            backup.push(".bak");
            fs::write(&backup, &original)?;
            debug!("Backup written to {:?}", backup);
        }

        let cleaned = normalize_separators(&original);
        fs::write(&path, cleaned)?;
        Ok(path)
    }

    /// File contents for display, with invalid UTF-8 replaced
    pub fn read_file(config: &CleanupConfig, name: &str) -> Result<String> {
        let path = Self::resolve(config, name)?;
        info!("CleanupService::read_file - {}", path.display());
        let bytes = fs::read(&path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(dir: &Path, backup: bool) -> CleanupConfig {
        CleanupConfig {
            data_dir: dir.to_path_buf(),
            backup,
        }
    }

    #[test]
    fn test_normalize_order_matters() {
        assert_eq!(
            normalize_separators(b"24.12.2018;1,5;2,25\n"),
            b"24.12.2018,1.5,2.25\n".to_vec()
        );
    }

    #[test]
    fn test_latin1_bytes_untouched() {
        assert_eq!(normalize_separators(b"Caf\xe9;1,0"), b"Caf\xe9,1.0".to_vec());
    }

    #[test]
    fn test_update_file_in_place_with_backup() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("SELL_1.csv"), "a;b\n1,5;2\n").unwrap();

        let path = CleanupService::update_file(&config(dir.path(), true), "SELL_1.csv").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "a,b\n1.5,2\n");
        assert_eq!(
            fs::read_to_string(dir.path().join("SELL_1.csv.bak")).unwrap(),
            "a;b\n1,5;2\n"
        );
    }

    #[test]
    fn test_update_without_backup() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("x.csv"), "1;2").unwrap();
        CleanupService::update_file(&config(dir.path(), false), "x.csv").unwrap();
        assert!(!dir.path().join("x.csv.bak").exists());
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CleanupService::update_file(&config(dir.path(), false), "nope.csv").unwrap_err();
        assert!(matches!(err, AppError::Load(_)));
        assert!(matches!(
            CleanupService::resolve(&config(dir.path(), false), "  "),
            Err(AppError::InvalidArgument(_))
        ));
    }
}
