use indexmap::IndexMap;
use serde::Deserialize;

/// A single project descriptor, as consumed by the registry builder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Project {
    /// Short name, the key under `projects:` (e.g. "kubernetes").
    pub name: String,
    /// Display name (e.g. "Kubernetes").
    pub full_name: String,
    /// Name of the database holding the project's data.
    pub database: String,
    pub disabled: bool,
}

impl Project {
    pub fn new<N, F, D>(name: N, full_name: F, database: D) -> Self
    where
        N: Into<String>,
        F: Into<String>,
        D: Into<String>,
    {
        Project {
            name: name.into(),
            full_name: full_name.into(),
            database: database.into(),
            disabled: false,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

/// One entry of the `projects:` section of projects.yaml.
///
/// The file carries many more keys per project (dashboards, start dates, ...);
/// only the ones needed for database resolution are read. Missing values are
/// left empty so an incomplete entry never aborts loading the whole list.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ProjectEntry {
    #[serde(rename = "name", default)]
    pub full_name: String,
    #[serde(rename = "psql_db", default)]
    pub database: String,
    #[serde(default)]
    pub disabled: bool,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ProjectsFile {
    pub projects: IndexMap<String, ProjectEntry>,
}

impl ProjectsFile {
    pub fn into_projects(self) -> Vec<Project> {
        self.projects
            .into_iter()
            .map(|(name, entry)| Project {
                name,
                full_name: entry.full_name,
                database: entry.database,
                disabled: entry.disabled,
            })
            .collect()
    }
}
