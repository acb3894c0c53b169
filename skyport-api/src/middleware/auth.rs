use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use skyport_core::identity::User;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// JWT Claims
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub is_staff: bool,
    pub token_type: TokenType,
    pub exp: usize,
}

impl Claims {
    pub fn for_user(user: &User, token_type: TokenType, ttl_seconds: u64) -> Self {
        let now = u64::try_from(Utc::now().timestamp()).unwrap_or_default();
        Self {
            sub: user.id,
            email: user.email.clone(),
            is_staff: user.is_staff,
            token_type,
            exp: now.saturating_add(ttl_seconds) as usize,
        }
    }
}

pub fn encode_token(claims: &Claims, secret: &str) -> Result<String, AppError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::AuthenticationError("Token is invalid or expired".to_string()))
}

// ============================================================================
// Authentication Middleware
// ============================================================================

/// Requires a valid access token and injects its [`Claims`] into the request
/// extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let bearer = req
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or_else(|| {
            AppError::AuthenticationError("Authentication credentials were not provided".to_string())
        })?;

    let claims = decode_token(bearer.token(), &state.auth.secret)?;
    if claims.token_type != TokenType::Access {
        return Err(AppError::AuthenticationError(
            "Token has wrong type".to_string(),
        ));
    }

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

pub fn require_staff(claims: &Claims) -> Result<(), AppError> {
    if !claims.is_staff {
        return Err(AppError::AuthorizationError(
            "You do not have permission to perform this action".to_string(),
        ));
    }
    Ok(())
}
