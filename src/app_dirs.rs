use directories::ProjectDirs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "codetyper";

/// Where config, history and logs live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirs {
    config_dir: PathBuf,
    data_dir: PathBuf,
    state_dir: PathBuf,
}

impl AppDirs {
    /// Resolve the platform directories, or put everything under `root`
    pub fn resolve(root: Option<&Path>) -> Self {
        if let Some(root) = root {
            return Self::rooted(root);
        }

        let project = ProjectDirs::from("", "", APP_NAME);
        let state_dir = match std::env::var("HOME") {
            Ok(home) => PathBuf::from(home).join(".local").join("state").join(APP_NAME),
            Err(_) => project
                .as_ref()
                .map(|p| p.data_local_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".")),
        };

        match project {
            Some(p) => Self {
                config_dir: p.config_dir().to_path_buf(),
                data_dir: p.data_dir().to_path_buf(),
                state_dir,
            },
            None => Self::rooted(Path::new(".codetyper")),
        }
    }

    pub fn rooted(root: &Path) -> Self {
        Self {
            config_dir: root.to_path_buf(),
            data_dir: root.to_path_buf(),
            state_dir: root.to_path_buf(),
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join("config.json")
    }

    /// Directory backing the history key-value store
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn log_path(&self) -> PathBuf {
        self.state_dir.join("codetyper.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rooted_dirs_share_one_directory() {
        let dirs = AppDirs::resolve(Some(Path::new("/tmp/ct")));

        assert_eq!(dirs.config_path(), PathBuf::from("/tmp/ct/config.json"));
        assert_eq!(dirs.data_dir(), Path::new("/tmp/ct"));
        assert_eq!(dirs.log_path(), PathBuf::from("/tmp/ct/codetyper.log"));
    }
}
