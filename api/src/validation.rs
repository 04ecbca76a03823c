//! Validation of the payload fields shared by every operation.
//!
//! Each check reports the first failure only. A failing check ends the request;
//! handlers never run with a partially validated payload.
use crate::envelope::Payload;
use crate::errors::ApiError;
use projects::ProjectRegistry;
use serde_json::Value;

pub const PROJECT_FIELD: &str = "project";

/// The project named by a request and the database it resolves to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SharedFields {
    pub project: String,
    pub database: String,
}

pub fn shared_fields(
    api: &'static str,
    payload: Option<&Payload>,
    registry: &ProjectRegistry,
) -> Result<SharedFields, ApiError> {
    let payload = match payload {
        Some(payload) if !payload.is_empty() => payload,
        _ => return Err(ApiError::EmptyPayload { api }),
    };

    let project = string_param(api, PROJECT_FIELD, Some(payload))?;
    let database = registry.resolve(&project)?.to_string();

    Ok(SharedFields { project, database })
}

/// Extracts a required string parameter: presence first, then type.
pub fn string_param(
    api: &'static str,
    field: &'static str,
    payload: Option<&Payload>,
) -> Result<String, ApiError> {
    match payload.and_then(|p| p.get(field)) {
        None => Err(ApiError::MissingField { api, field }),
        Some(Value::String(value)) => Ok(value.clone()),
        Some(other) => Err(ApiError::NotAString {
            api,
            field,
            value: other.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use projects::{Project, RegistryError};
    use serde_json::json;

    fn registry() -> ProjectRegistry {
        ProjectRegistry::build(vec![
            Project::new("kubernetes", "Kubernetes", "db1"),
            Project::new("legacy", "Legacy", "db2").disabled(),
        ])
    }

    fn payload(value: Value) -> Payload {
        match value {
            Value::Object(map) => map,
            _ => panic!("payload must be an object"),
        }
    }

    #[test]
    fn test_shared_fields() {
        let registry = registry();

        let p = payload(json!({"project": "kubernetes"}));
        assert_eq!(
            shared_fields("health", Some(&p), &registry).unwrap(),
            SharedFields {
                project: "kubernetes".into(),
                database: "db1".into()
            }
        );

        let p = payload(json!({"project": "Kubernetes", "other": 1}));
        assert_eq!(
            shared_fields("health", Some(&p), &registry)
                .unwrap()
                .database,
            "db1"
        );
    }

    #[test]
    fn test_empty_payload() {
        let registry = registry();

        for p in [None, Some(Payload::new())] {
            let err = shared_fields("health", p.as_ref(), &registry).unwrap_err();
            assert!(matches!(err, ApiError::EmptyPayload { api: "health" }));
        }
    }

    #[test]
    fn test_project_field_errors() {
        let registry = registry();

        let p = payload(json!({"range": "d"}));
        let err = shared_fields("health", Some(&p), &registry).unwrap_err();
        assert_eq!(
            err.to_string(),
            "API 'health' missing 'project' field in 'payload' section"
        );

        let p = payload(json!({"project": 42}));
        let err = shared_fields("health", Some(&p), &registry).unwrap_err();
        assert_eq!(
            err.to_string(),
            "API 'health' 'payload' 'project' field '42' is not a string"
        );

        let p = payload(json!({"project": null}));
        let err = shared_fields("health", Some(&p), &registry).unwrap_err();
        assert!(matches!(err, ApiError::NotAString { value: Value::Null, .. }));

        let p = payload(json!({"project": "legacy"}));
        let err = shared_fields("health", Some(&p), &registry).unwrap_err();
        assert!(matches!(
            err,
            ApiError::ProjectNotFound(RegistryError::NotFound(ref name)) if name == "legacy"
        ));
    }

    #[test]
    fn test_string_param() {
        let p = payload(json!({"metric": "commits", "country": ["PL"]}));

        assert_eq!(
            string_param("dev_act_cnt_repo_grp", "metric", Some(&p)).unwrap(),
            "commits"
        );
        assert_eq!(
            string_param("dev_act_cnt_repo_grp", "range", Some(&p))
                .unwrap_err()
                .to_string(),
            "API 'dev_act_cnt_repo_grp' missing 'range' field in 'payload' section"
        );
        assert_eq!(
            string_param("dev_act_cnt_repo_grp", "country", Some(&p))
                .unwrap_err()
                .to_string(),
            r#"API 'dev_act_cnt_repo_grp' 'payload' 'country' field '["PL"]' is not a string"#
        );
        assert!(matches!(
            string_param("dev_act_cnt_repo_grp", "metric", None),
            Err(ApiError::MissingField { field: "metric", .. })
        ));
    }
}
