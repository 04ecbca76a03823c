use crate::db::Database;
use crate::envelope::Payload;
use crate::errors::ApiError;
use crate::handlers::{DevActivityHandler, HealthHandler};
use async_trait::async_trait;
use projects::ProjectRegistry;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// A single named operation ("API" on the wire).
#[async_trait]
pub trait Handler: Send + Sync {
    fn name(&self) -> &'static str;

    /// Validates the payload, runs the operation and returns the success body.
    ///
    /// Any error ends the request; nothing is written before the handler
    /// returns, so a failure can never produce a partial response.
    async fn handle(
        &self,
        payload: Option<&Payload>,
        registry: &ProjectRegistry,
    ) -> Result<Value, ApiError>;
}

/// Maps operation names to handlers. Built once at startup and never modified.
pub struct Dispatcher {
    registry: Arc<ProjectRegistry>,
    handlers: HashMap<&'static str, Arc<dyn Handler>>,
}

impl Dispatcher {
    pub fn new(registry: Arc<ProjectRegistry>, handlers: Vec<Arc<dyn Handler>>) -> Self {
        let handlers = handlers
            .into_iter()
            .map(|handler| (handler.name(), handler))
            .collect();

        Dispatcher { registry, handlers }
    }

    /// The dispatcher with every supported operation.
    pub fn with_default_handlers(
        registry: Arc<ProjectRegistry>,
        database: Arc<dyn Database>,
    ) -> Self {
        Self::new(
            registry,
            vec![
                Arc::new(HealthHandler::new(database)),
                Arc::new(DevActivityHandler::new()),
            ],
        )
    }

    pub async fn dispatch(&self, api: &str, payload: Option<&Payload>) -> Result<Value, ApiError> {
        let handler = self
            .handlers
            .get(api)
            .ok_or_else(|| ApiError::UnknownApi(api.to_string()))?;

        handler.handle(payload, &self.registry).await
    }

    /// Returns the static name of a known operation.
    pub fn operation_name(&self, api: &str) -> Option<&'static str> {
        self.handlers.get(api).map(|handler| handler.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{DEV_ACT_CNT_REPO_GRP, HEALTH};
    use crate::testutils::{FakeDatabase, payload, test_registry};
    use serde_json::json;

    struct EchoHandler;

    #[async_trait]
    impl Handler for EchoHandler {
        fn name(&self) -> &'static str {
            "echo"
        }

        async fn handle(
            &self,
            payload: Option<&Payload>,
            _registry: &ProjectRegistry,
        ) -> Result<Value, ApiError> {
            Ok(Value::Object(payload.cloned().unwrap_or_default()))
        }
    }

    #[tokio::test]
    async fn test_dispatch_by_name() {
        let dispatcher = Dispatcher::new(Arc::new(test_registry()), vec![Arc::new(EchoHandler)]);

        let p = payload(json!({"a": 1}));
        assert_eq!(
            dispatcher.dispatch("echo", Some(&p)).await.unwrap(),
            json!({"a": 1})
        );
        assert_eq!(dispatcher.operation_name("echo"), Some("echo"));
        assert_eq!(dispatcher.operation_name("Echo"), None);
    }

    #[tokio::test]
    async fn test_unknown_api() {
        let dispatcher = Dispatcher::with_default_handlers(
            Arc::new(test_registry()),
            Arc::new(FakeDatabase::new()),
        );

        for api in ["", "HEALTH", "metrics", "health "] {
            let err = dispatcher.dispatch(api, None).await.unwrap_err();
            assert_eq!(err.to_string(), format!("unknown API '{api}'"));
        }
    }

    #[tokio::test]
    async fn test_empty_payload_for_every_operation() {
        let dispatcher = Dispatcher::with_default_handlers(
            Arc::new(test_registry()),
            Arc::new(FakeDatabase::new()),
        );

        for api in [HEALTH, DEV_ACT_CNT_REPO_GRP] {
            for p in [None, Some(Payload::new())] {
                let err = dispatcher.dispatch(api, p.as_ref()).await.unwrap_err();
                assert_eq!(
                    err.to_string(),
                    format!("API '{api}' 'payload' section empty or missing")
                );
            }
        }
    }

    #[tokio::test]
    async fn test_non_string_project_for_every_operation() {
        let dispatcher = Dispatcher::with_default_handlers(
            Arc::new(test_registry()),
            Arc::new(FakeDatabase::new()),
        );

        for api in [HEALTH, DEV_ACT_CNT_REPO_GRP] {
            for value in [json!(1), json!(1.5), json!(true), json!({"x": "y"}), json!([])] {
                let p = payload(json!({"project": value.clone()}));
                let err = dispatcher.dispatch(api, Some(&p)).await.unwrap_err();
                let message = err.to_string();
                assert!(message.contains(&format!("API '{api}'")), "{message}");
                assert!(message.contains(&value.to_string()), "{message}");
            }
        }
    }
}
