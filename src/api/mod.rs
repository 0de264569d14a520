// Axum web server layer

use axum::{
    error_handling::HandleErrorLayer,
    http::StatusCode,
    routing::{get, post},
    BoxError, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

pub mod handlers;
pub mod responses;
pub mod validation;

use crate::auth::audit_logger::AuditLogger;
use crate::auth::session_middleware::require_session;
use crate::core::meal::Clock;
use crate::store::Datastore;

pub use crate::config::Config;

/// Application state shared by every handler
///
/// All components are wrapped in Arc so cloning per request is cheap.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Datastore>,
    pub clock: Arc<dyn Clock>,
    pub audit_logger: Arc<AuditLogger>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn Datastore>, clock: Arc<dyn Clock>, config: Config) -> Self {
        Self {
            store,
            clock,
            audit_logger: Arc::new(AuditLogger::new()),
            config: Arc::new(config),
        }
    }
}

/// Create the Axum router with all routes and middleware
///
/// Middleware stack (outermost to innermost):
/// - Tracing (tower-http::trace) - one span per request
/// - Request timeout (tower::timeout) - mapped to 408
/// - Body size limit (tower-http::limit)
/// - Session guard - dashboard and order routes only
pub fn create_router(app_state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/dashboard/items", get(handlers::dashboard_items_handler))
        .route("/api/orders", post(handlers::place_order_handler))
        .route_layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            require_session,
        ));

    let body_limit = app_state.config.body_size_limit_bytes;
    let timeout_secs = app_state.config.request_timeout_secs;

    let timeout_stack = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(|e: BoxError| async move {
            let status = if e.is::<tower::timeout::error::Elapsed>() {
                StatusCode::REQUEST_TIMEOUT
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (status, e.to_string())
        }))
        .timeout(Duration::from_secs(timeout_secs))
        .into_inner();

    Router::new()
        .route("/api/registerUser", post(handlers::register_handler))
        .route("/api/login", post(handlers::login_handler))
        .route("/api/logOutUser", post(handlers::logout_handler))
        .route("/api/me", get(handlers::me_handler))
        .route("/api/meals/current", get(handlers::current_meal_handler))
        .route("/health", get(handlers::health_handler))
        .merge(protected)
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(timeout_stack)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
