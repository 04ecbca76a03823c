use crate::dispatch::Handler;
use crate::envelope::Payload;
use crate::errors::ApiError;
use crate::validation::{SharedFields, shared_fields, string_param};
use async_trait::async_trait;
use projects::ProjectRegistry;
use serde::Serialize;
use serde_json::Value;

/// Developer activity counts per repository group.
pub const DEV_ACT_CNT_REPO_GRP: &str = "dev_act_cnt_repo_grp";

/// Required parameters, validated in this order.
const PARAMS: [&str; 5] = ["range", "metric", "repository_group", "country", "github_id"];

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DevActivityParams {
    pub range: String,
    pub metric: String,
    pub repository_group: String,
    pub country: String,
    pub github_id: String,
}

impl DevActivityParams {
    fn from_payload(payload: Option<&Payload>) -> Result<Self, ApiError> {
        let get = |name| string_param(DEV_ACT_CNT_REPO_GRP, name, payload);

        // Fields are evaluated top to bottom, which fixes the reporting order.
        Ok(DevActivityParams {
            range: get(PARAMS[0])?,
            metric: get(PARAMS[1])?,
            repository_group: get(PARAMS[2])?,
            country: get(PARAMS[3])?,
            github_id: get(PARAMS[4])?,
        })
    }
}

#[derive(Serialize)]
struct DevActivityResponse {
    project: String,
    db_name: String,
    params: DevActivityParams,
}

/// Validates the parameter set for the developer activity statistic and echoes
/// it back. Computing the statistic itself is not part of this service.
#[derive(Default)]
pub struct DevActivityHandler {}

impl DevActivityHandler {
    pub fn new() -> Self {
        DevActivityHandler {}
    }
}

#[async_trait]
impl Handler for DevActivityHandler {
    fn name(&self) -> &'static str {
        DEV_ACT_CNT_REPO_GRP
    }

    async fn handle(
        &self,
        payload: Option<&Payload>,
        registry: &ProjectRegistry,
    ) -> Result<Value, ApiError> {
        let SharedFields { project, database } =
            shared_fields(DEV_ACT_CNT_REPO_GRP, payload, registry)?;
        let params = DevActivityParams::from_payload(payload)?;

        tracing::info!(
            project = %project,
            database = %database,
            params = ?params,
            "Validated developer activity request"
        );

        Ok(serde_json::to_value(DevActivityResponse {
            project,
            db_name: database,
            params,
        })?)
    }
}
