//! Application startup and lifecycle management.

use crate::config::{AppointmentConfig, TwilioConfig};
use crate::handlers::{
    book_appointment, health_check, liveness, metrics_endpoint, not_found, readiness_check,
};
use crate::services::{AppointmentNotifier, MessagingProvider, MockMessagingProvider, TwilioProvider};
use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{metrics_middleware, request_id_middleware, REQUEST_ID_HEADER};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn MessagingProvider>,
    pub notifier: AppointmentNotifier,
}

impl AppState {
    pub fn new(config: AppointmentConfig, provider: Arc<dyn MessagingProvider>) -> Self {
        let notifier = AppointmentNotifier::new(provider.clone(), config.twilio.channel.clone());
        Self {
            provider,
            notifier,
        }
    }
}

/// Pick the messaging provider for this process.
///
/// The mock is only used when Twilio is explicitly disabled. An enabled
/// Twilio configuration without full credentials refuses to start.
pub fn build_provider(config: &TwilioConfig) -> Result<Arc<dyn MessagingProvider>, AppError> {
    if !config.enabled {
        tracing::warn!("Twilio provider disabled, using mock messaging provider");
        return Ok(Arc::new(MockMessagingProvider::new()));
    }

    if !config.has_credentials() {
        return Err(AppError::ConfigError(anyhow::anyhow!(
            "TWILIO_ACCOUNT_SID, TWILIO_AUTH_TOKEN and TWILIO_PHONE_NUMBER are required when Twilio is enabled"
        )));
    }

    tracing::info!(channel = %config.channel, "Twilio messaging provider initialized");
    Ok(Arc::new(TwilioProvider::new(config.clone())))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/api/book-appointment", post(book_appointment))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics_endpoint))
        .fallback(not_found)
        .with_state(state)
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the provider selected from configuration.
    pub async fn build(config: AppointmentConfig) -> Result<Self, AppError> {
        let provider = build_provider(&config.twilio).map_err(|e| {
            tracing::error!("Failed to initialize messaging provider: {}", e);
            e
        })?;
        Self::build_with_provider(config, provider).await
    }

    /// Build the application around an already constructed provider.
    pub async fn build_with_provider(
        config: AppointmentConfig,
        provider: Arc<dyn MessagingProvider>,
    ) -> Result<Self, AppError> {
        // Port 0 binds a random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            state: AppState::new(config, provider),
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);

        tracing::info!("Server running on port {}", self.port);

        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}
