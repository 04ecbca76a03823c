use crate::dispatch::Dispatcher;
use crate::envelope::decode_envelope;
use crate::errors::ApiError;
use crate::metrics_defs::{REQUEST_DURATION, REQUESTS};
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Limited};
use hyper::body::{Body, Bytes, Incoming};
use hyper::service::Service;
use hyper::{Method, Request, Response, StatusCode};
use serde_json::Value;
use shared::http::{make_json_error_response, make_json_response};
use shared::{counter, histogram};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

/// The single endpoint of the service.
pub const API_PATH: &str = "/api/v1";

const MAX_BODY_BYTES: usize = 1024 * 1024;

pub type ApiBody = BoxBody<Bytes, ApiError>;

#[derive(Clone)]
pub struct ApiService {
    dispatcher: Arc<Dispatcher>,
}

impl ApiService {
    pub fn new(dispatcher: Dispatcher) -> Self {
        ApiService {
            dispatcher: Arc::new(dispatcher),
        }
    }
}

impl Service<Request<Incoming>> for ApiService {
    type Response = Response<ApiBody>;
    type Error = ApiError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let dispatcher = self.dispatcher.clone();
        Box::pin(async move { Ok(handle_request(&dispatcher, req).await) })
    }
}

/// Runs one request to completion and renders either the success body or the
/// error body, never both.
pub async fn handle_request<B>(dispatcher: &Dispatcher, req: Request<B>) -> Response<ApiBody>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let start = Instant::now();
    let (api, result) = process(dispatcher, req).await;

    let response = match result {
        Ok(value) => {
            tracing::info!(api, "Request succeeded");
            counter!(REQUESTS, "api" => api, "status" => "ok").increment(1);
            make_json_response(StatusCode::OK, &value)
        }
        Err(e) => {
            tracing::warn!(api, error = %e, "Request failed");
            counter!(REQUESTS, "api" => api, "status" => "error").increment(1);
            make_json_error_response(e.status_code(), &e.to_string())
        }
    };

    histogram!(REQUEST_DURATION, "api" => api).record(start.elapsed().as_secs_f64());
    response
}

/// Returns the operation name used for logs and metrics alongside the outcome.
/// Unknown operation names are reported as "unknown" to bound metric tags.
async fn process<B>(
    dispatcher: &Dispatcher,
    req: Request<B>,
) -> (&'static str, Result<Value, ApiError>)
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    if req.uri().path() != API_PATH {
        return ("unknown", Err(ApiError::NotFound));
    }
    if req.method() != Method::POST {
        return ("unknown", Err(ApiError::MethodNotAllowed));
    }

    let body = match Limited::new(req.into_body(), MAX_BODY_BYTES).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => return ("unknown", Err(ApiError::Decode(e.to_string()))),
    };

    let envelope = match decode_envelope(&body) {
        Ok(envelope) => envelope,
        Err(e) => return ("unknown", Err(e)),
    };

    let api = dispatcher.operation_name(&envelope.api).unwrap_or("unknown");
    let result = dispatcher.dispatch(&envelope.api, envelope.payload()).await;

    (api, result)
}
