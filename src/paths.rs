//! Path utilities for determining data storage locations.
//!
//! Unless configured otherwise, the tracker keeps its database in
//! `~/.project-tracker/`.

use std::path::PathBuf;

/// The base directory name for project-tracker data.
const DATA_DIR_NAME: &str = ".project-tracker";

/// The database filename.
pub const DATABASE_FILENAME: &str = "tracker.sqlite3";

/// Get the base data directory for project-tracker.
///
/// Returns `~/.project-tracker/` or `None` if the home directory
/// cannot be determined.
#[must_use]
pub fn data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(DATA_DIR_NAME))
}

/// Get the default database path.
///
/// Falls back to the working directory when there is no home directory.
#[must_use]
pub fn default_db_path() -> PathBuf {
    data_dir().map_or_else(|| PathBuf::from(DATABASE_FILENAME), |dir| dir.join(DATABASE_FILENAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_dir_returns_home_based_path() {
        if let Some(home) = dirs::home_dir() {
            let data = data_dir().unwrap();
            assert_eq!(data, home.join(".project-tracker"));
        }
    }

    #[test]
    fn test_default_db_path_ends_with_filename() {
        let path = default_db_path();
        assert!(path.to_string_lossy().ends_with(DATABASE_FILENAME));
    }
}
