use crate::db::Database;
use crate::dispatch::Handler;
use crate::envelope::Payload;
use crate::errors::ApiError;
use crate::validation::{SharedFields, shared_fields};
use async_trait::async_trait;
use projects::ProjectRegistry;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

pub const HEALTH: &str = "health";

const EVENTS_QUERY: &str = "select count(*) from gha_events";

#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct HealthResponse {
    pub project: String,
    pub db_name: String,
    pub events: i64,
}

struct HealthRequest {
    shared: SharedFields,
}

impl HealthRequest {
    fn from_payload(
        payload: Option<&Payload>,
        registry: &ProjectRegistry,
    ) -> Result<Self, ApiError> {
        Ok(HealthRequest {
            shared: shared_fields(HEALTH, payload, registry)?,
        })
    }
}

/// Counts the events stored in the project's database. Doubles as a liveness
/// check of that database.
pub struct HealthHandler {
    database: Arc<dyn Database>,
}

impl HealthHandler {
    pub fn new(database: Arc<dyn Database>) -> Self {
        HealthHandler { database }
    }
}

#[async_trait]
impl Handler for HealthHandler {
    fn name(&self) -> &'static str {
        HEALTH
    }

    async fn handle(
        &self,
        payload: Option<&Payload>,
        registry: &ProjectRegistry,
    ) -> Result<Value, ApiError> {
        let HealthRequest { shared } = HealthRequest::from_payload(payload, registry)?;

        // The connection is closed when it goes out of scope, on every path.
        let mut connection = self.database.connect(&shared.database).await?;
        let rows = connection.query_i64(EVENTS_QUERY).await?;
        drop(connection);

        let events = rows.last().copied().unwrap_or(0);
        tracing::info!(
            project = %shared.project,
            database = %shared.database,
            events,
            "Counted events"
        );

        let response = HealthResponse {
            project: shared.project,
            db_name: shared.database,
            events,
        };
        Ok(serde_json::to_value(response)?)
    }
}
