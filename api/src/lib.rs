//! Request handling for the statistics API: envelope decoding, validation,
//! dispatch to the operation handlers and the HTTP service tying them together.

pub mod config;
pub mod db;
pub mod dispatch;
pub mod envelope;
pub mod errors;
pub mod handlers;
mod metrics_defs;
pub mod service;
#[cfg(test)]
mod testutils;
pub mod validation;

pub use dispatch::Dispatcher;
pub use errors::ApiError;
pub use service::ApiService;

use shared::http::run_http_service;

pub async fn run(config: &config::Config, dispatcher: Dispatcher) -> Result<(), ApiError> {
    let service = ApiService::new(dispatcher);
    run_http_service(&config.listener.host, config.listener.port, service).await
}

/// Registers descriptions for every metric emitted by this crate with the
/// installed recorder.
pub fn describe_metrics() {
    for def in metrics_defs::ALL_METRICS {
        match def.metric_type {
            shared::metrics_defs::MetricType::Counter => {
                metrics::describe_counter!(def.name, def.description)
            }
            shared::metrics_defs::MetricType::Gauge => {
                metrics::describe_gauge!(def.name, def.description)
            }
            shared::metrics_defs::MetricType::Histogram => {
                metrics::describe_histogram!(def.name, def.description)
            }
        }
    }
}
