//! The supported operations.

mod dev_activity;
mod health;

pub use dev_activity::{DEV_ACT_CNT_REPO_GRP, DevActivityHandler, DevActivityParams};
pub use health::{HEALTH, HealthHandler, HealthResponse};
