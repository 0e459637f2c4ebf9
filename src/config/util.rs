//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Find config file by searching upward from current directory
///
/// Starts from cwd and walks up parent directories until finding `config_name`
/// Returns the absolute path to the config file if found
///
/// # Example
/// ```text
/// /home/user/site/forms/        ← cwd
/// /home/user/site/sitesmith.toml ← found!
/// ```
pub fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.is_file().then(|| config_name.to_path_buf());
    }

    let cwd = std::env::current_dir().ok()?;
    find_config_from(&cwd, config_name)
}

/// Walk up from `start` looking for `config_name`.
fn find_config_from(start: &Path, config_name: &Path) -> Option<PathBuf> {
    let mut current = start;
    loop {
        let candidate = current.join(config_name);
        if candidate.is_file() {
            return Some(candidate);
        }

        match current.parent() {
            Some(parent) => current = parent,
            None => return None, // Reached filesystem root
        }
    }
}

/// Make a path absolute, canonicalizing when it exists.
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_walks_up() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a/b/c");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(temp.path().join("sitesmith.toml"), "").unwrap();

        let found = find_config_from(&nested, Path::new("sitesmith.toml")).unwrap();
        assert_eq!(found, temp.path().join("sitesmith.toml"));
    }

    #[test]
    fn test_find_config_ignores_directories() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("custom.toml")).unwrap();
        assert!(find_config_from(temp.path(), Path::new("custom.toml")).is_none_or(|p| p.is_file()));
    }

    #[test]
    fn test_normalize_path_absolute_missing() {
        let path = Path::new("/definitely/not/here");
        assert_eq!(normalize_path(path), PathBuf::from("/definitely/not/here"));
    }
}
