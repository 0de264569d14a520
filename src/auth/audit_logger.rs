// Security event logging

use axum::http::HeaderMap;
use tracing::{info, warn};
use uuid::Uuid;

/// Authentication event type
#[derive(Debug, Clone)]
pub enum AuthEvent {
    LoginSuccess { user_id: Uuid },
    LoginFailure { reason: String },
    Logout,
    SessionExpired { user_id: Uuid },
}

/// Client details captured from request headers
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl ClientInfo {
    /// Checks `X-Forwarded-For` first (for proxied requests), then `X-Real-IP`.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let ip_address = headers
            .get("X-Forwarded-For")
            .or_else(|| headers.get("X-Real-IP"))
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let user_agent = headers
            .get("User-Agent")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        Self {
            ip_address,
            user_agent,
        }
    }
}

/// Audit logger for authentication events
///
/// Events go to the tracing pipeline under the `audit` target. Logging never
/// fails the request that triggered it.
#[derive(Debug, Clone, Default)]
pub struct AuditLogger;

impl AuditLogger {
    pub fn new() -> Self {
        Self
    }

    pub fn log_auth_event(&self, event: &AuthEvent, email: Option<&str>, client: &ClientInfo) {
        match event {
            AuthEvent::LoginSuccess { user_id } => {
                info!(
                    target: "audit",
                    event = "LOGIN_SUCCESS",
                    user_id = %user_id,
                    email = ?email,
                    ip_address = ?client.ip_address,
                    user_agent = ?client.user_agent,
                    "Login successful"
                );
            }
            AuthEvent::LoginFailure { reason } => {
                warn!(
                    target: "audit",
                    event = "LOGIN_FAILURE",
                    email = ?email,
                    ip_address = ?client.ip_address,
                    user_agent = ?client.user_agent,
                    reason = %reason,
                    "Login failed"
                );
            }
            AuthEvent::Logout => {
                info!(
                    target: "audit",
                    event = "LOGOUT",
                    ip_address = ?client.ip_address,
                    user_agent = ?client.user_agent,
                    "Session ended"
                );
            }
            AuthEvent::SessionExpired { user_id } => {
                info!(
                    target: "audit",
                    event = "SESSION_EXPIRED",
                    user_id = %user_id,
                    ip_address = ?client.ip_address,
                    "Expired session removed"
                );
            }
        }
    }
}
