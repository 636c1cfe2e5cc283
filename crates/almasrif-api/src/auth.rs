use std::sync::{Arc, OnceLock};

use anyhow::anyhow;
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::{error, info, warn};

use almasrif_db::Database;
use almasrif_types::api::{Claims, LoginRequest, LoginResponse};
use almasrif_types::models::User;

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub session_ttl: chrono::Duration,
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| {
        warn!("Login rejected: unreadable body: {}", e.body_text());
        ApiError::InvalidCredentials
    })?;

    let phone = req.phone.trim().to_string();
    let code = req.code.trim().to_string();

    if phone.is_empty() || !is_login_code(&code) {
        warn!(phone = %phone, "Login rejected: malformed phone or code");
        return Err(ApiError::InvalidCredentials);
    }

    // Argon2 and SQLite both block; keep them off the async runtime
    let db = state.clone();
    let lookup_phone = phone.clone();
    let user = tokio::task::spawn_blocking(move || verify_login(&db.db, &lookup_phone, &code))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(anyhow!("login task failed: {}", e))
        })??;

    let Some(user) = user else {
        warn!(phone = %phone, "Login rejected: phone or code incorrect");
        return Err(ApiError::InvalidCredentials);
    };

    let token = create_token(&state.jwt_secret, &user.phone, state.session_ttl)?;

    info!(user_id = user.id, "User logged in");
    Ok(Json(LoginResponse {
        user_id: user.id,
        full_name: user.full_name,
        nickname: user.nickname,
        token,
    }))
}

/// Sessions are bearer tokens held by the client; logging out is the client
/// dropping its token.
pub async fn logout() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Hash a login code for storage in `login_codes`.
pub fn hash_code(code: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(code.as_bytes(), &salt)
        .map_err(|e| anyhow!("Failed to hash login code: {}", e))?
        .to_string();
    Ok(hash)
}

fn is_login_code(code: &str) -> bool {
    !code.is_empty() && code.chars().all(|c| c.is_ascii_digit())
}

/// Hash checked for phones with no login code, so an unknown phone costs the
/// same Argon2 work as a wrong code.
fn dummy_code_hash() -> Option<&'static str> {
    static DUMMY: OnceLock<Option<String>> = OnceLock::new();
    DUMMY
        .get_or_init(|| hash_code("000000").ok())
        .as_deref()
}

/// `Ok(None)` for any mismatch: unknown phone, wrong code, or a code with no
/// provisioned user behind it.
fn verify_login(db: &Database, phone: &str, code: &str) -> anyhow::Result<Option<User>> {
    let Some(code_hash) = db.get_login_code_hash(phone)? else {
        if let Some(dummy) = dummy_code_hash().and_then(|h| PasswordHash::new(h).ok()) {
            let _ = Argon2::default().verify_password(code.as_bytes(), &dummy);
        }
        return Ok(None);
    };

    let parsed_hash = PasswordHash::new(&code_hash)
        .map_err(|e| anyhow!("Corrupt login code hash for {}: {}", phone, e))?;

    if Argon2::default()
        .verify_password(code.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Ok(None);
    }

    db.get_user_by_phone(phone)
}

pub fn create_token(secret: &str, phone: &str, ttl: chrono::Duration) -> anyhow::Result<String> {
    let expires = chrono::Utc::now()
        .checked_add_signed(ttl)
        .ok_or_else(|| anyhow!("Session lifetime out of range: {}", ttl))?;

    let claims = Claims {
        sub: phone.to_string(),
        exp: expires.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
