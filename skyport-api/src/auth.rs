use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use skyport_core::identity::{
    hash_password, normalize_email, validate_email, validate_password, verify_credentials, User,
    UserUpdate,
};
use skyport_shared::Masked;
use tracing::{info, warn};

use crate::error::AppError;
use crate::middleware::auth::{decode_token, encode_token, Claims, TokenType};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Masked<String>,
    pub password: Masked<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub email: Masked<String>,
    pub password: Masked<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Serialize)]
pub struct AccessToken {
    pub access: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMeRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<Masked<String>>,
}

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/user/register", post(register))
        .route("/user/token", post(obtain_token_pair))
        .route("/user/token/refresh", post(refresh_token))
        .route("/user/token/verify", post(verify_token))
}

pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/user/me", get(get_me).patch(update_me))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/user/register
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let email = normalize_email(req.email.expose());
    validate_email(&email)?;
    validate_password(req.password.expose(), state.auth.min_password_length)?;

    let hash = hash_password(req.password.expose())?;
    let user = state
        .users
        .create_user(&email, &hash, req.first_name.trim(), req.last_name.trim(), false)
        .await?;

    info!(user_id = %user.id, "User registered");
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /api/user/token
async fn obtain_token_pair(
    State(state): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> Result<Json<TokenPair>, AppError> {
    let email = normalize_email(req.email.expose());
    let stored = state.users.find_by_email(&email).await?;
    let verified = verify_credentials(
        req.password.expose(),
        stored.as_ref().map(|s| s.password_hash.as_str()),
    )?;

    let user = match stored {
        Some(stored) if verified => stored.user,
        _ => {
            warn!("Rejected token request");
            return Err(AppError::AuthenticationError(
                "No active account found with the given credentials".to_string(),
            ));
        }
    };

    let access = Claims::for_user(&user, TokenType::Access, state.auth.access_expiration);
    let refresh = Claims::for_user(&user, TokenType::Refresh, state.auth.refresh_expiration);

    Ok(Json(TokenPair {
        access: encode_token(&access, &state.auth.secret)?,
        refresh: encode_token(&refresh, &state.auth.secret)?,
    }))
}

/// POST /api/user/token/refresh
async fn refresh_token(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<AccessToken>, AppError> {
    let claims = decode_token(&req.refresh, &state.auth.secret)?;
    if claims.token_type != TokenType::Refresh {
        return Err(AppError::AuthenticationError(
            "Token has wrong type".to_string(),
        ));
    }

    // Claims are rebuilt from the current user record.
    let user = state.users.get_user(claims.sub).await.map_err(|_| {
        AppError::AuthenticationError("User not found".to_string())
    })?;
    let access = Claims::for_user(&user, TokenType::Access, state.auth.access_expiration);

    Ok(Json(AccessToken {
        access: encode_token(&access, &state.auth.secret)?,
    }))
}

/// POST /api/user/token/verify
async fn verify_token(
    State(state): State<AppState>,
    Json(req): Json<VerifyRequest>,
) -> Result<Json<Value>, AppError> {
    decode_token(&req.token, &state.auth.secret)?;
    Ok(Json(json!({})))
}

/// GET /api/user/me
async fn get_me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<User>, AppError> {
    Ok(Json(state.users.get_user(claims.sub).await?))
}

/// PATCH /api/user/me
async fn update_me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateMeRequest>,
) -> Result<Json<User>, AppError> {
    let password_hash = match &req.password {
        Some(password) => {
            validate_password(password.expose(), state.auth.min_password_length)?;
            Some(hash_password(password.expose())?)
        }
        None => None,
    };

    let update = UserUpdate {
        first_name: req.first_name.map(|s| s.trim().to_string()),
        last_name: req.last_name.map(|s| s.trim().to_string()),
        password_hash,
    };

    Ok(Json(state.users.update_user(claims.sub, &update).await?))
}
