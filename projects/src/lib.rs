//! Project list loading and the project name to database registry.

pub mod config;
pub mod loader;
pub mod registry;
pub mod types;

pub use config::ProjectsConfig;
pub use loader::{LoadError, load_projects};
pub use registry::{ProjectRegistry, RegistryError};
pub use types::Project;

/// Reads the configured project list and builds the registry from it.
pub fn load_registry(config: &ProjectsConfig) -> Result<ProjectRegistry, LoadError> {
    let projects = load_projects(&config.path())?;
    Ok(ProjectRegistry::build(projects))
}
