// Authentication: passwords, session tokens, session guard, audit events

pub mod audit_logger;
pub mod password;
pub mod session_middleware;
pub mod session_token;
