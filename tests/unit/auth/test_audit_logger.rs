// Unit tests for audit logger

use axum::http::HeaderMap;
use go_eats::auth::audit_logger::{AuditLogger, AuthEvent, ClientInfo};
use uuid::Uuid;

fn client() -> ClientInfo {
    let mut headers = HeaderMap::new();
    headers.insert("X-Real-IP", "198.51.100.4".parse().unwrap());
    headers.insert("User-Agent", "go-eats-test".parse().unwrap());
    ClientInfo::from_headers(&headers)
}

#[test]
fn test_client_info_falls_back_to_real_ip() {
    let client = client();
    assert_eq!(client.ip_address.as_deref(), Some("198.51.100.4"));
    assert_eq!(client.user_agent.as_deref(), Some("go-eats-test"));
}

/// Every event kind logs without panicking, with and without an email
#[test]
fn test_audit_logger_all_events() {
    let logger = AuditLogger::new();
    let user_id = Uuid::new_v4();
    let events = [
        AuthEvent::LoginSuccess { user_id },
        AuthEvent::LoginFailure {
            reason: "Wrong password".to_string(),
        },
        AuthEvent::Logout,
        AuthEvent::SessionExpired { user_id },
    ];

    for event in &events {
        logger.log_auth_event(event, Some("compras@padaria.com.br"), &client());
        logger.log_auth_event(event, None, &ClientInfo::default());
    }
}
