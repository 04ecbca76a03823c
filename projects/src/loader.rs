//! Reads the project list from projects.yaml.
use crate::types::{Project, ProjectsFile};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("could not read projects file {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("could not parse projects file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

pub fn load_projects(path: &Path) -> Result<Vec<Project>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let parsed: ProjectsFile =
        serde_yaml::from_reader(BufReader::new(file)).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let projects = parsed.into_projects();
    tracing::debug!(path = %path.display(), count = projects.len(), "Loaded project list");

    Ok(projects)
}
