//! Exclusive lock on the JSON data file, so two servers never write the
//! same document.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

/// A lock guard that releases the lock when dropped
pub struct LockGuard {
    _file: File,
}

fn lock_path(data_file: &Path) -> PathBuf {
    let mut name = data_file.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

/// Acquire an exclusive lock next to `data_file`, failing if another
/// instance holds it.
pub fn acquire_lock(data_file: &Path) -> Result<LockGuard> {
    if let Some(dir) = data_file.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let path = lock_path(data_file);
    let file = File::create(&path).context("Failed to create lock file")?;

    file.try_lock_exclusive().map_err(|_| {
        anyhow::anyhow!(
            "Another schoolcal-server instance is already using {}.\n\
            If you believe this is an error, remove: {}",
            data_file.display(),
            path.display()
        )
    })?;

    Ok(LockGuard { _file: file })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_file_sits_next_to_data_file() {
        assert_eq!(
            lock_path(Path::new("/var/lib/schoolcal/events.json")),
            PathBuf::from("/var/lib/schoolcal/events.json.lock")
        );
    }

    #[test]
    fn second_lock_on_same_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let data_file = dir.path().join("events.json");

        let _first = acquire_lock(&data_file).unwrap();
        assert!(acquire_lock(&data_file).is_err());
    }

    #[test]
    fn lock_is_released_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let data_file = dir.path().join("events.json");

        drop(acquire_lock(&data_file).unwrap());
        assert!(acquire_lock(&data_file).is_ok());
    }
}
