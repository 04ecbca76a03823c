use crate::types::Project;
use indexmap::IndexMap;
use indexmap::map::Entry;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RegistryError {
    #[error("database not found for project '{0}'")]
    NotFound(String),
}

/// Maps project names to the database holding their data.
///
/// Every enabled project is reachable under both its short name and its full
/// name. Disabled projects and projects without a database are never inserted. The registry has no mutating
/// methods: it is built once, then shared (typically behind an `Arc`) and read
/// concurrently without locking.
#[derive(Clone, Debug, Default)]
pub struct ProjectRegistry {
    name_to_db: IndexMap<String, String>,
}

impl ProjectRegistry {
    pub fn build<I>(projects: I) -> Self
    where
        I: IntoIterator<Item = Project>,
    {
        let mut name_to_db = IndexMap::new();

        for project in projects {
            if project.disabled {
                tracing::debug!(project = %project.name, "Skipping disabled project");
                continue;
            }
            if project.database.is_empty() {
                tracing::warn!(project = %project.name, "Skipping project without a database");
                continue;
            }

            for key in [&project.name, &project.full_name] {
                if key.is_empty() {
                    continue;
                }
                match name_to_db.entry(key.clone()) {
                    Entry::Vacant(entry) => {
                        entry.insert(project.database.clone());
                    }
                    Entry::Occupied(entry) => {
                        if entry.get() != &project.database {
                            tracing::warn!(
                                key = %key,
                                kept = %entry.get(),
                                ignored = %project.database,
                                "Project key maps to two databases, keeping the first one"
                            );
                        }
                    }
                }
            }
        }

        ProjectRegistry { name_to_db }
    }

    pub fn resolve(&self, project: &str) -> Result<&str, RegistryError> {
        self.name_to_db
            .get(project)
            .map(String::as_str)
            .ok_or_else(|| RegistryError::NotFound(project.to_string()))
    }

    /// Number of resolvable keys (two per enabled project, unless both names are equal).
    pub fn len(&self) -> usize {
        self.name_to_db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.name_to_db.is_empty()
    }

    /// Iterates over `(key, database)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.name_to_db
            .iter()
            .map(|(name, db)| (name.as_str(), db.as_str()))
    }
}
