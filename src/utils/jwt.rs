// src/utils/jwt.rs

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{error::AppError, models::user::CurrentUser, state::AppState};

/// Header accepted as an alternative to a bearer token.
pub const USER_ID_HEADER: &str = "x-user-id";

/// JWT Claims structure.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// Subject - Stores the User ID (as string).
    pub sub: String,
    /// User's role (e.g., 'student', 'admin').
    pub role: String,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

/// Signs a new JWT for the user.
pub fn sign_jwt(
    id: i64,
    role: &str,
    secret: &str,
    expiration_seconds: u64,
) -> Result<String, AppError> {
    let expiration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs() as usize
        + expiration_seconds as usize;

    let claims = Claims {
        sub: id.to_string(),
        role: role.to_owned(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Verifies and decodes a JWT string.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    let token_data = decode(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::AuthError("Not authorized, token failed".to_string()))?;

    Ok(token_data.claims)
}

/// Extracts the caller's user id from `Authorization: Bearer` or `X-User-ID`.
/// The bearer token wins when both are present.
fn caller_id(headers: &HeaderMap, secret: &str) -> Result<i64, AppError> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    if let Some(token) = bearer {
        let claims = verify_jwt(token.trim(), secret)?;
        return claims
            .sub
            .parse::<i64>()
            .map_err(|_| AppError::AuthError("Not authorized, token failed".to_string()));
    }

    if let Some(raw) = headers.get(USER_ID_HEADER) {
        let raw = raw.to_str().map(str::trim).unwrap_or_default();
        if raw.is_empty() {
            return Err(AppError::BadRequest("Invalid X-User-ID header".to_string()));
        }
        return raw
            .parse::<i64>()
            .map_err(|_| AppError::AuthError("Not authorized, invalid X-User-ID".to_string()));
    }

    Err(AppError::AuthError("Not authorized, no token".to_string()))
}

/// Axum Middleware: Authentication.
///
/// Resolves the caller from the request headers, checks that the account
/// exists and is approved, and injects `CurrentUser` into the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = caller_id(req.headers(), &state.config.jwt_secret)?;

    let user = state
        .directory
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::AuthError("Not authorized, user not found".to_string()))?;

    if !user.is_approved {
        return Err(AppError::Forbidden(
            "Account pending approval. Access denied.".to_string(),
        ));
    }

    req.extensions_mut().insert(CurrentUser {
        id: user.id,
        role: user.role,
    });
    Ok(next.run(req).await)
}

/// Axum Middleware: Admin Authorization.
///
/// Must be used AFTER `auth_middleware`.
pub async fn admin_middleware(req: Request<Body>, next: Next) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(|| AppError::AuthError("Not authorized".to_string()))?;

    if !user.is_admin() {
        return Err(AppError::Forbidden(
            "Not authorized as an administrator".to_string(),
        ));
    }

    Ok(next.run(req).await)
}
