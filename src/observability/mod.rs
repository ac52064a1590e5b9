//! Observability
//!
//! Counters in Prometheus text format, structured logging setup and health
//! endpoints. Health follows live traffic: each provider is as healthy as
//! its most recent call.

use axum::{Json, Router, response::IntoResponse, routing::get};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::config::LoggingConfig;
use crate::error::{AppError, Result};

// ===== Metrics =====

/// Application counters
#[derive(Clone, Default)]
pub struct AppMetrics {
    pub http_requests_total: Arc<AtomicU64>,
    pub http_request_duration_sum: Arc<AtomicU64>,
    pub active_connections: Arc<AtomicUsize>,
    pub messages_total: Arc<AtomicU64>,
    pub callbacks_total: Arc<AtomicU64>,
    pub profiles_created_total: Arc<AtomicU64>,
    pub provider_errors_total: Arc<AtomicU64>,
    pub errors_total: Arc<AtomicU64>,
    pub providers: Arc<ProviderHealth>,
}

impl AppMetrics {
    pub fn record_http_request(&self, duration_ms: u64) {
        self.http_requests_total.fetch_add(1, Ordering::SeqCst);
        self.http_request_duration_sum
            .fetch_add(duration_ms, Ordering::SeqCst);
    }

    pub fn connection_opened(&self) {
        self.active_connections.fetch_add(1, Ordering::SeqCst);
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::SeqCst);
    }

    /// Incoming chat text, command or free-form answer
    pub fn record_message(&self) {
        self.messages_total.fetch_add(1, Ordering::SeqCst);
    }

    /// Button press
    pub fn record_callback(&self) {
        self.callbacks_total.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_profile_created(&self) {
        self.profiles_created_total.fetch_add(1, Ordering::SeqCst);
    }

    /// Provider answered, possibly with "nothing found"
    pub fn record_provider_success(&self, provider: &'static str, latency_ms: u64) {
        self.providers.record(provider, latency_ms, None);
    }

    /// Weather, nutrition or translation call failed or timed out
    pub fn record_provider_error(&self, provider: &'static str, latency_ms: u64, message: String) {
        self.provider_errors_total.fetch_add(1, Ordering::SeqCst);
        self.providers.record(provider, latency_ms, Some(message));
    }

    pub fn record_error(&self) {
        self.errors_total.fetch_add(1, Ordering::SeqCst);
    }

    /// Render in Prometheus text format
    pub fn gather(&self) -> String {
        let mut output = format!(
            r#"# HELP http_requests_total Total HTTP requests
# TYPE http_requests_total counter
http_requests_total {}
# HELP http_request_duration_seconds HTTP request duration in seconds
# TYPE http_request_duration_seconds histogram
http_request_duration_seconds_sum {}
http_request_duration_seconds_count {}
# HELP active_connections Active HTTP connections
# TYPE active_connections gauge
active_connections {}
# HELP messages_total Chat messages handled
# TYPE messages_total counter
messages_total {}
# HELP callbacks_total Button callbacks handled
# TYPE callbacks_total counter
callbacks_total {}
# HELP profiles_created_total Profiles completed
# TYPE profiles_created_total counter
profiles_created_total {}
# HELP provider_errors_total Failed weather, nutrition or translation calls
# TYPE provider_errors_total counter
provider_errors_total {}
# HELP errors_total Total errors
# TYPE errors_total counter
errors_total {}
"#,
            self.http_requests_total.load(Ordering::SeqCst),
            self.http_request_duration_sum.load(Ordering::SeqCst) as f64 / 1000.0,
            self.http_requests_total.load(Ordering::SeqCst),
            self.active_connections.load(Ordering::SeqCst),
            self.messages_total.load(Ordering::SeqCst),
            self.callbacks_total.load(Ordering::SeqCst),
            self.profiles_created_total.load(Ordering::SeqCst),
            self.provider_errors_total.load(Ordering::SeqCst),
            self.errors_total.load(Ordering::SeqCst),
        );

        output.push_str(
            "# HELP provider_up Whether the last call to a provider succeeded\n# TYPE provider_up gauge\n",
        );
        for (name, status) in self.providers.snapshot() {
            let _ = writeln!(
                output,
                "provider_up{{provider=\"{}\"}} {}",
                name, status.healthy as u8
            );
        }
        output
    }
}

// ===== Provider Health =====

/// Most recent call to one external provider
#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatus {
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub latency_ms: u64,
    pub checked_at: DateTime<Utc>,
}

/// Last known state per provider, updated by every provider call
#[derive(Debug, Default)]
pub struct ProviderHealth {
    statuses: DashMap<&'static str, ProviderStatus>,
}

impl ProviderHealth {
    /// `error` is `None` when the provider answered
    pub fn record(&self, provider: &'static str, latency_ms: u64, error: Option<String>) {
        self.statuses.insert(
            provider,
            ProviderStatus {
                healthy: error.is_none(),
                error,
                latency_ms,
                checked_at: Utc::now(),
            },
        );
    }

    /// True until some provider's latest call fails
    pub fn all_healthy(&self) -> bool {
        self.statuses.iter().all(|entry| entry.healthy)
    }

    /// Statuses ordered by provider name
    pub fn snapshot(&self) -> BTreeMap<&'static str, ProviderStatus> {
        self.statuses
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }
}

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub version: String,
    pub uptime_seconds: i64,
    pub providers: BTreeMap<&'static str, ProviderStatus>,
}

/// State behind the observability routes
#[derive(Clone)]
pub struct ObservabilityState {
    pub metrics: Arc<AppMetrics>,
    pub started_at: DateTime<Utc>,
    pub version: String,
}

impl ObservabilityState {
    pub fn new(version: String, metrics: Arc<AppMetrics>) -> Self {
        Self {
            metrics,
            started_at: Utc::now(),
            version,
        }
    }

    fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}

// ===== Handlers =====

/// 503 while any provider's latest call failed
pub async fn health_check(
    state: axum::extract::State<Arc<ObservabilityState>>,
) -> impl IntoResponse {
    let healthy = state.metrics.providers.all_healthy();
    let report = HealthReport {
        status: if healthy { "healthy" } else { "degraded" },
        version: state.version.clone(),
        uptime_seconds: state.uptime_seconds(),
        providers: state.metrics.providers.snapshot(),
    };
    (availability(healthy), Json(report))
}

pub async fn liveness() -> impl IntoResponse {
    "OK"
}

pub async fn readiness(state: axum::extract::State<Arc<ObservabilityState>>) -> impl IntoResponse {
    let ready = state.metrics.providers.all_healthy();
    (availability(ready), if ready { "Ready" } else { "Not Ready" })
}

pub async fn metrics(state: axum::extract::State<Arc<ObservabilityState>>) -> impl IntoResponse {
    state.metrics.gather()
}

pub async fn version(state: axum::extract::State<Arc<ObservabilityState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "version": state.version,
        "uptime_seconds": state.uptime_seconds(),
    }))
}

fn availability(ok: bool) -> axum::http::StatusCode {
    if ok {
        axum::http::StatusCode::OK
    } else {
        axum::http::StatusCode::SERVICE_UNAVAILABLE
    }
}

pub fn create_observability_router(state: Arc<ObservabilityState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness))
        .route("/health/ready", get(readiness))
        .route("/metrics", get(metrics))
        .route("/version", get(version))
        .with_state(state)
}

// ===== Structured Logging =====

/// Install the global subscriber
///
/// `RUST_LOG` wins over the configured level. When a log directory is set,
/// a daily rolling JSON file is written next to console output; keep the
/// returned guard alive or buffered lines are lost on exit.
pub fn init_tracing(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let (console_json, console_text) = if config.structured {
        (Some(fmt::layer().json()), None)
    } else {
        (
            None,
            Some(fmt::layer().with_target(true).with_line_number(true)),
        )
    };

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "hydrotrack.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().json().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_json)
        .with(console_text)
        .with(file_layer)
        .try_init()
        .map_err(|e| AppError::Internal(format!("failed to set tracing subscriber: {}", e)))?;

    Ok(guard)
}

// ===== Request Metrics Middleware =====

/// Count requests and their latency
pub async fn metrics_middleware(
    axum::extract::State(metrics): axum::extract::State<Arc<AppMetrics>>,
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let start = std::time::Instant::now();
    metrics.connection_opened();

    let response = next.run(req).await;

    metrics.record_http_request(start.elapsed().as_millis() as u64);
    metrics.connection_closed();
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[test]
    fn test_metrics_gather() {
        let metrics = AppMetrics::default();
        metrics.record_http_request(100);
        metrics.record_message();
        metrics.record_message();
        metrics.record_callback();
        metrics.record_profile_created();
        metrics.record_provider_success("translator", 3);
        metrics.record_provider_error("weather", 12, "timed out".into());
        metrics.record_error();

        let output = metrics.gather();
        assert!(output.contains("http_requests_total 1"));
        assert!(output.contains("messages_total 2"));
        assert!(output.contains("callbacks_total 1"));
        assert!(output.contains("profiles_created_total 1"));
        assert!(output.contains("provider_errors_total 1"));
        assert!(output.contains("errors_total 1"));
        assert!(output.contains("provider_up{provider=\"translator\"} 1"));
        assert!(output.contains("provider_up{provider=\"weather\"} 0"));
    }

    #[test]
    fn test_connections_gauge() {
        let metrics = AppMetrics::default();
        metrics.connection_opened();
        metrics.connection_opened();
        metrics.connection_closed();
        assert!(metrics.gather().contains("active_connections 1"));
    }

    #[test]
    fn test_latest_call_wins() {
        let health = ProviderHealth::default();
        assert!(health.all_healthy());

        health.record("nutrition", 40, Some("502 Bad Gateway".into()));
        assert!(!health.all_healthy());
        assert_eq!(
            health.snapshot()["nutrition"].error.as_deref(),
            Some("502 Bad Gateway")
        );

        health.record("nutrition", 35, None);
        assert!(health.all_healthy());
        assert_eq!(health.snapshot().len(), 1);
    }

    async fn fetch(router: &Router, uri: &str) -> (StatusCode, String) {
        let response = router
            .clone()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_readiness_follows_provider_calls() {
        let metrics = Arc::new(AppMetrics::default());
        let router = create_observability_router(Arc::new(ObservabilityState::new(
            "0.1.0".into(),
            metrics.clone(),
        )));

        assert_eq!(fetch(&router, "/health/ready").await.0, StatusCode::OK);

        metrics.record_provider_error("weather", 10_000, "weather did not answer".into());
        assert_eq!(
            fetch(&router, "/health/ready").await.0,
            StatusCode::SERVICE_UNAVAILABLE
        );
        let (status, body) = fetch(&router, "/health").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        let report: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(report["status"], "degraded");
        assert_eq!(report["providers"]["weather"]["healthy"], false);

        metrics.record_provider_success("weather", 80);
        assert_eq!(fetch(&router, "/health/ready").await.0, StatusCode::OK);
        assert_eq!(fetch(&router, "/health/live").await.0, StatusCode::OK);
    }
}
