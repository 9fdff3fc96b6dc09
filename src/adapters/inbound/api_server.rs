//! Geolocation API Server
//!
//! HTTP surface of the service: an unauthenticated liveness probe and
//! the basic-auth protected location check.

use crate::adapters::inbound::basic_auth::{require_basic_auth, BasicAuth};
use crate::application::{CheckError, LocationService};
use crate::domain::entities::GeoLookupRequest;
use crate::domain::errors::ValidationError;
use crate::infrastructure::ShutdownController;
use axum::{
    body::Bytes,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub const ALIVE_PATH: &str = "/alive";
pub const CHECK_IP_LOCATION_PATH: &str = "/api/v1/checkiplocation";

/// Body of the liveness probe.
pub const ALIVE_BODY: &str = "It's...ALIVE!!!";

/// Country list as sent by callers: a JSON array, or the legacy
/// comma-separated string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CountryNames {
    List(Vec<String>),
    Csv(String),
}

impl Default for CountryNames {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl CountryNames {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::List(names) => names,
            Self::Csv(csv) => csv
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

/// Check request body.
///
/// Missing fields decode as empty so validation can name them.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckLocationPayload {
    #[serde(default)]
    pub ip_address: String,
    #[serde(default)]
    pub country_names: CountryNames,
}

impl CheckLocationPayload {
    /// Decode a raw JSON body.
    pub fn decode(body: &[u8]) -> Result<Self, ValidationError> {
        serde_json::from_slice(body).map_err(|e| ValidationError::MalformedBody(e.to_string()))
    }
}

impl From<CheckLocationPayload> for GeoLookupRequest {
    fn from(payload: CheckLocationPayload) -> Self {
        GeoLookupRequest::new(payload.ip_address, payload.country_names.into_vec())
    }
}

impl IntoResponse for CheckError {
    fn into_response(self) -> Response {
        let status = match &self {
            CheckError::Validation(_) | CheckError::Parse(_) => StatusCode::BAD_REQUEST,
            // Lookup failures are reported like a non-match.
            CheckError::Lookup(_) => StatusCode::NOT_FOUND,
        };
        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

/// API Server state.
#[derive(Clone)]
pub struct ApiState {
    pub service: Arc<LocationService>,
}

impl ApiState {
    pub fn new(service: Arc<LocationService>) -> Self {
        Self { service }
    }
}

/// API Server for location checks.
pub struct ApiServer {
    listen_addr: String,
    state: ApiState,
    auth: Arc<BasicAuth>,
    request_timeout: Duration,
    shutdown: ShutdownController,
    shutdown_grace: Duration,
}

impl ApiServer {
    pub fn new(listen_addr: String, service: Arc<LocationService>, auth: BasicAuth) -> Self {
        Self {
            listen_addr,
            state: ApiState::new(service),
            auth: Arc::new(auth),
            request_timeout: Duration::from_secs(5),
            shutdown: ShutdownController::new(),
            shutdown_grace: Duration::from_secs(5),
        }
    }

    /// Deadline for one inbound request; exceeded requests get 408.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Coordinate shutdown through `controller`, allowing `grace` for
    /// in-flight requests once it fires.
    pub fn shutdown(mut self, controller: ShutdownController, grace: Duration) -> Self {
        self.shutdown = controller;
        self.shutdown_grace = grace;
        self
    }

    /// Get shared state for use by other components.
    pub fn state(&self) -> ApiState {
        self.state.clone()
    }

    /// Build the router with all routes and layers.
    pub fn router(&self) -> Router {
        let protected = Router::new()
            .route(CHECK_IP_LOCATION_PATH, post(check_location_handler))
            .route_layer(middleware::from_fn_with_state(
                self.auth.clone(),
                require_basic_auth,
            ));

        Router::new()
            .route(ALIVE_PATH, get(alive_handler))
            .merge(protected)
            .layer(middleware::from_fn_with_state(
                self.shutdown.clone(),
                track_in_flight,
            ))
            .layer(TimeoutLayer::new(self.request_timeout))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the API server until shutdown.
    #[cfg_attr(coverage_nightly, coverage(off))]
    pub async fn run(&self) -> anyhow::Result<()> {
        let app = self.router();

        let listener = TcpListener::bind(&self.listen_addr).await?;
        tracing::info!("geolocation API listening on {}", self.listen_addr);

        let signal = self.shutdown.clone();
        let server = axum::serve(listener, app)
            .with_graceful_shutdown(async move { signal.wait().await })
            .into_future();

        let controller = self.shutdown.clone();
        let grace = self.shutdown_grace;
        let deadline = async move {
            controller.wait().await;
            tokio::time::sleep(grace).await;
        };

        tokio::select! {
            result = server => result?,
            _ = deadline => {
                tracing::warn!(
                    in_flight = self.shutdown.in_flight(),
                    "shutdown grace period elapsed, abandoning in-flight requests"
                );
            }
        }

        tracing::info!("geolocation API stopped");
        Ok(())
    }
}

// Middleware

async fn track_in_flight(
    State(shutdown): State<ShutdownController>,
    request: Request,
    next: Next,
) -> Response {
    let _guard = shutdown.track_request();
    next.run(request).await
}

// Handler functions

async fn alive_handler() -> impl IntoResponse {
    tracing::info!("{}", ALIVE_BODY);
    (StatusCode::OK, ALIVE_BODY)
}

async fn check_location_handler(State(state): State<ApiState>, body: Bytes) -> Response {
    tracing::info!("received call to check geolocation");

    let request: GeoLookupRequest = match CheckLocationPayload::decode(&body) {
        Ok(payload) => payload.into(),
        Err(e) => {
            tracing::warn!(error = %e, "could not decode check request");
            return CheckError::from(e).into_response();
        }
    };

    match state.service.check_location(&request).await {
        Ok(result) if result.location_check_pass => (StatusCode::FOUND, Json(result)).into_response(),
        Ok(result) => (StatusCode::NOT_FOUND, Json(result)).into_response(),
        Err(e) => {
            if !matches!(e, CheckError::Lookup(_)) {
                tracing::warn!(ip_address = %request.ip_address, error = %e, "rejected check request");
            }
            e.into_response()
        }
    }
}
