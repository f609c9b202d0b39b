use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

/// Ensures that a directory exists at the specified path, creating it and any
/// missing parents if necessary.
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("create directory '{}'", path.display()))?;
    }
    Ok(())
}

pub fn home_dir() -> Result<PathBuf> {
    let dir = std::env::var_os("HOME") // Unix/Linux/macOS
        .or_else(|| std::env::var_os("USERPROFILE")) // Windows
        .map(PathBuf::from);
    match dir {
        Some(dir) => Ok(dir),
        None => {
            bail!("could not determine home directory, please specify config path manually")
        }
    }
}

pub fn config_dir() -> Result<PathBuf> {
    if is_root() {
        return Ok(PathBuf::from("/etc/bookdesk"));
    }

    let home = home_dir()?;
    Ok(home.join(".config").join("bookdesk"))
}

pub fn data_dir() -> Result<PathBuf> {
    if is_root() {
        return Ok(PathBuf::from("/var/lib/bookdesk"));
    }

    let home = home_dir()?;

    if cfg!(windows) {
        return Ok(home.join("AppData").join("bookdesk"));
    }

    Ok(home.join(".local").join("share").join("bookdesk"))
}

#[cfg(unix)]
fn is_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
fn is_root() -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_dir_exists() {
        let base_path = Path::new("_test_bookdesk_dirs");
        let _ = fs::remove_dir_all(base_path);

        let nested = base_path.join("parent/child");
        ensure_dir_exists(&nested).unwrap();
        assert!(nested.is_dir());

        // Existing directory is fine.
        ensure_dir_exists(&nested).unwrap();
        assert!(nested.is_dir());

        fs::remove_dir_all(base_path).unwrap();
    }
}
