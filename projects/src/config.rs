use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_DATA_DIR: &str = "/etc/gha2db/";
pub const DEFAULT_PROJECTS_FILE: &str = "projects.yaml";

/// Where the project list is read from.
#[derive(Clone, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct ProjectsConfig {
    pub data_dir: String,
    pub file: String,
    /// Read the file from the working directory instead of `data_dir`.
    pub local: bool,
}

impl Default for ProjectsConfig {
    fn default() -> Self {
        ProjectsConfig {
            data_dir: DEFAULT_DATA_DIR.into(),
            file: DEFAULT_PROJECTS_FILE.into(),
            local: false,
        }
    }
}

impl ProjectsConfig {
    /// Applies `GHA2DB_DATADIR`, `GHA2DB_PROJECTS_YAML` and `GHA2DB_LOCAL` on top of
    /// the configured values. Empty variables are treated as unset.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(data_dir) = get("GHA2DB_DATADIR") {
            self.data_dir = data_dir;
        }
        if let Some(file) = get("GHA2DB_PROJECTS_YAML") {
            self.file = file;
        }
        if get("GHA2DB_LOCAL").is_some() {
            self.local = true;
        }
    }

    pub fn path(&self) -> PathBuf {
        if self.local {
            PathBuf::from("./").join(&self.file)
        } else {
            PathBuf::from(&self.data_dir).join(&self.file)
        }
    }
}
