// Request handlers for API endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    Extension,
};
use axum_extra::extract::cookie::CookieJar;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::api::responses::{
    ApiError, CurrentMealResponse, HealthResponse, ItemsResponse, LoginResponse, LoginUser,
    MeResponse, MeUser, OrderResponse, RegisterResponse,
};
use crate::api::validation::{normalize_email, validate_registration, LoginRequest, RegisterRequest};
use crate::api::AppState;
use crate::auth::audit_logger::{AuthEvent, ClientInfo};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::session_middleware::{removal_cookie, resolve_session, session_cookie};
use crate::auth::session_token::SessionToken;
use crate::core::catalog::group_catalog;
use crate::core::errors::AppError;
use crate::core::meal;
use crate::core::models::{CurrentUser, NewAccount, NewOrder};
use crate::core::order::{Order, OrderEntry};

const NOTE_MAX_CHARS: usize = 500;

/// Unwrap a JSON body, answering 400 instead of axum's default rejection.
/// Oversized bodies keep their 413.
fn parse_json<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(value)| value).map_err(|rejection| {
        debug!(error = %rejection, "Rejected request body");
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ApiError {
                status: StatusCode::PAYLOAD_TOO_LARGE,
                message: "Request body too large".to_string(),
            };
        }
        ApiError::from(AppError::InvalidInput("Invalid data".to_string()))
    })
}

/// Argon2 hashing runs on the blocking pool
async fn hash_blocking(password: SecretString) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::PasswordHash(e.to_string()))?
}

async fn verify_blocking(password: SecretString, stored_hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| AppError::PasswordHash(e.to_string()))?
}

/// POST /api/registerUser
pub async fn register_handler(
    State(app_state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let registration = validate_registration(parse_json(payload)?)?;
    let password_hash = hash_blocking(registration.password).await?;

    let result = app_state
        .store
        .register(NewAccount {
            email: registration.email,
            password_hash,
            cnpj: registration.cnpj,
            social_name: registration.social_name,
            items: registration.items,
        })
        .await
        .map_err(|e| {
            if !matches!(e, AppError::AccountExists) {
                error!(error = %e, "Registration failed");
            }
            ApiError::from(e)
        })?;

    info!(
        user_id = %result.user_id,
        company_id = %result.company_id,
        "Account registered"
    );

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            result,
        }),
    ))
}

/// POST /api/login
///
/// Unknown email answers 404 and a wrong password 401, both with the same
/// message. Expired sessions are purged before the new one is created.
pub async fn login_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    let request = parse_json(payload)?;
    let client = ClientInfo::from_headers(&headers);

    let (email, password) = match (request.email, request.password) {
        (Some(email), Some(password))
            if !email.trim().is_empty() && !password.expose_secret().is_empty() =>
        {
            (normalize_email(&email), password)
        }
        _ => return Err(AppError::InvalidInput("Invalid data".to_string()).into()),
    };

    let Some(user) = app_state.store.find_user_by_email(&email).await? else {
        app_state.audit_logger.log_auth_event(
            &AuthEvent::LoginFailure {
                reason: "Unknown account".to_string(),
            },
            Some(&email),
            &client,
        );
        return Err(AppError::UnknownAccount.into());
    };

    if !verify_blocking(password, user.password_hash.clone()).await? {
        app_state.audit_logger.log_auth_event(
            &AuthEvent::LoginFailure {
                reason: "Wrong password".to_string(),
            },
            Some(&email),
            &client,
        );
        return Err(AppError::InvalidCredentials.into());
    }

    let now = app_state.clock.now_utc();
    let purged = app_state.store.delete_expired_sessions(now).await?;
    if purged > 0 {
        debug!(purged, "Expired sessions removed");
    }

    let token = SessionToken::generate();
    let expires_at = now + chrono::Duration::days(i64::from(app_state.config.session_ttl_days));
    app_state
        .store
        .create_session(user.id, &token.hash(), expires_at)
        .await?;

    app_state.audit_logger.log_auth_event(
        &AuthEvent::LoginSuccess { user_id: user.id },
        Some(&email),
        &client,
    );

    let jar = jar.add(session_cookie(&token, &app_state.config));
    Ok((
        jar,
        Json(LoginResponse {
            success: true,
            user: LoginUser {
                id: user.id,
                email: user.email,
                company_id: user.company_id,
            },
        }),
    ))
}

/// POST /api/logOutUser
pub async fn logout_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<(StatusCode, CookieJar), ApiError> {
    if let Some(cookie) = jar.get(crate::auth::session_middleware::SESSION_COOKIE) {
        let token_hash = SessionToken::new(cookie.value()).hash();
        app_state.store.delete_session(&token_hash).await?;
        app_state.audit_logger.log_auth_event(
            &AuthEvent::Logout,
            None,
            &ClientInfo::from_headers(&headers),
        );
    }

    Ok((StatusCode::NO_CONTENT, jar.remove(removal_cookie())))
}

/// GET /api/me
pub async fn me_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Response {
    let client = ClientInfo::from_headers(&headers);

    match resolve_session(&app_state, &jar, &client).await {
        Ok(Some(found)) => Json(MeResponse {
            user: Some(MeUser {
                id: found.user.id,
                email: found.user.email,
                name: found.company_name,
            }),
        })
        .into_response(),
        Ok(None) => (
            StatusCode::UNAUTHORIZED,
            jar.remove(removal_cookie()),
            Json(MeResponse { user: None }),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Session lookup failed");
            ApiError::from(e).into_response()
        }
    }
}

/// GET /api/dashboard/items
///
/// Catalog of the authenticated user, grouped by item.
pub async fn dashboard_items_handler(
    State(app_state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ItemsResponse>, ApiError> {
    let rows = app_state.store.list_user_items(user.id).await.map_err(|e| {
        error!(error = %e, user_id = %user.id, "Failed to load dashboard items");
        ApiError::from(e)
    })?;

    Ok(Json(ItemsResponse {
        items: group_catalog(rows),
    }))
}

/// GET /api/meals/current
pub async fn current_meal_handler(State(app_state): State<AppState>) -> Json<CurrentMealResponse> {
    let (hour, minute) = app_state.clock.local_hour_minute();
    let meal = meal::current_meal(hour);
    let remaining = meal.and_then(|m| meal::remaining(m, hour, minute));

    Json(CurrentMealResponse { meal, remaining })
}

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub items: Vec<OrderEntry>,
    #[serde(default)]
    pub note: Option<String>,
}

/// POST /api/orders
pub async fn place_order_handler(
    State(app_state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<PlaceOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let request = parse_json(payload)?;

    let note = request
        .note
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());
    if note.as_ref().is_some_and(|n| n.chars().count() > NOTE_MAX_CHARS) {
        return Err(AppError::InvalidInput(format!(
            "Note must have at most {} characters",
            NOTE_MAX_CHARS
        ))
        .into());
    }

    let order = Order {
        items: request.items,
    };
    let catalog = group_catalog(app_state.store.list_user_items(user.id).await?);
    let (hour, _) = app_state.clock.local_hour_minute();

    let checked = order.to_lines(&catalog, hour).map_err(|e| {
        warn!(user_id = %user.id, error = %e, "Order rejected");
        ApiError::from(e)
    })?;
    let total_items = checked.total_items;

    let placed = app_state
        .store
        .create_order(NewOrder {
            user_id: user.id,
            note,
            lines: checked.lines,
        })
        .await?;

    info!(
        order_id = %placed.id,
        user_id = %user.id,
        lines = placed.lines.len(),
        total_items,
        "Order placed"
    );

    Ok((
        StatusCode::CREATED,
        Json(OrderResponse {
            success: true,
            order_id: placed.id,
            total_items,
        }),
    ))
}

/// GET /health
///
/// Reports 503 when the datastore does not answer within 500ms.
pub async fn health_handler(State(app_state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (status, database) =
        match tokio::time::timeout(Duration::from_millis(500), app_state.store.ping()).await {
            Ok(Ok(())) => (StatusCode::OK, "connected"),
            Ok(Err(e)) => {
                warn!(error = %e, "Datastore ping failed");
                (StatusCode::SERVICE_UNAVAILABLE, "disconnected")
            }
            Err(_) => {
                warn!("Datastore ping timed out");
                (StatusCode::SERVICE_UNAVAILABLE, "timeout")
            }
        };

    let health = if status == StatusCode::OK {
        "healthy"
    } else {
        "unhealthy"
    };

    (
        status,
        Json(HealthResponse {
            status: health.to_string(),
            database: database.to_string(),
        }),
    )
}
