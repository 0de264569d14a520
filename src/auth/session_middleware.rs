// Cookie-backed session resolution and the Axum guard built on it

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::{debug, error};

use crate::api::responses::ApiError;
use crate::api::AppState;
use crate::auth::audit_logger::{AuthEvent, ClientInfo};
use crate::auth::session_token::SessionToken;
use crate::config::Config;
use crate::core::errors::AppError;
use crate::core::models::{CurrentUser, SessionWithUser};

pub const SESSION_COOKIE: &str = "session_id";

/// Cookie carrying a freshly issued session token
pub fn session_cookie(token: &SessionToken, config: &Config) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token.expose_secret().to_string()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.cookie_secure)
        .path("/")
        .max_age(time::Duration::days(i64::from(config.session_ttl_days)))
        .build()
}

/// Cookie handed to `CookieJar::remove`; path must match the issued cookie
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}

/// Look up the session named by the request cookie.
///
/// Returns `Ok(None)` when there is no cookie, no matching row, or the row
/// has expired. Expired rows are deleted on the way out.
pub async fn resolve_session(
    state: &AppState,
    jar: &CookieJar,
    client: &ClientInfo,
) -> Result<Option<SessionWithUser>, AppError> {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Ok(None);
    };

    let token_hash = SessionToken::new(cookie.value()).hash();
    let Some(found) = state.store.find_session(&token_hash).await? else {
        debug!("Session cookie does not match any session");
        return Ok(None);
    };

    if found.session.is_expired(state.clock.now_utc()) {
        state.store.delete_session(&token_hash).await?;
        state.audit_logger.log_auth_event(
            &AuthEvent::SessionExpired {
                user_id: found.user.id,
            },
            None,
            client,
        );
        return Ok(None);
    }

    Ok(Some(found))
}

/// Reject requests without a live session; otherwise expose the caller as
/// a `CurrentUser` extension.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let client = ClientInfo::from_headers(request.headers());

    match resolve_session(&state, &jar, &client).await {
        Ok(Some(session)) => {
            request.extensions_mut().insert(CurrentUser::from(&session));
            next.run(request).await
        }
        Ok(None) => (
            jar.remove(removal_cookie()),
            ApiError::from(AppError::Unauthenticated),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Session lookup failed");
            ApiError::from(e).into_response()
        }
    }
}
