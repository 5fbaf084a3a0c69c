//! Local libSQL store configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_path() -> String {
    ".sift/sift.db".into()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Database file, relative to the project root unless absolute.
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

impl StoreConfig {
    /// Resolve the database path against a project root.
    #[must_use]
    pub fn resolve(&self, project_root: &std::path::Path) -> PathBuf {
        let path = PathBuf::from(&self.path);
        if path.is_absolute() {
            path
        } else {
            project_root.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn relative_path_resolves_under_root() {
        let config = StoreConfig::default();
        assert_eq!(
            config.resolve(Path::new("/work/review")),
            PathBuf::from("/work/review/.sift/sift.db")
        );
    }

    #[test]
    fn absolute_path_is_kept() {
        let config = StoreConfig {
            path: "/var/lib/sift.db".into(),
        };
        assert_eq!(
            config.resolve(Path::new("/work/review")),
            PathBuf::from("/var/lib/sift.db")
        );
    }
}
