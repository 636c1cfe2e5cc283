use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use tracing::{debug, error};

use almasrif_types::api::Claims;

use crate::auth::AppState;

pub const LOGIN_PATH: &str = "/login";

/// Who the session credential is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Authenticated(Identity),
    Unauthenticated,
}

/// Resolve the bearer token in `headers` against `secret`. Missing,
/// malformed, expired or forged tokens are all just `Unauthenticated`.
pub fn resolve_session(secret: &str, headers: &HeaderMap) -> Session {
    let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    else {
        return Session::Unauthenticated;
    };

    match decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    ) {
        Ok(data) if !data.claims.sub.is_empty() => Session::Authenticated(Identity {
            phone: data.claims.sub,
        }),
        Ok(_) => Session::Unauthenticated,
        Err(e) => {
            debug!("Rejected session token: {}", e);
            Session::Unauthenticated
        }
    }
}

pub fn redirect_to_login() -> Response {
    Redirect::to(LOGIN_PATH).into_response()
}

/// Resolve the session to a provisioned `User` and attach it to the request.
/// Anything short of that sends the client to the login page.
pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let Session::Authenticated(identity) = resolve_session(&state.jwt_secret, req.headers()) else {
        return redirect_to_login();
    };

    let db = state.clone();
    let lookup = tokio::task::spawn_blocking(move || db.db.get_user_by_phone(&identity.phone)).await;

    match lookup {
        Ok(Ok(Some(user))) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Ok(Ok(None)) => redirect_to_login(),
        Ok(Err(e)) => {
            error!("User lookup failed: {:#}", e);
            redirect_to_login()
        }
        Err(e) => {
            error!("spawn_blocking join error: {}", e);
            redirect_to_login()
        }
    }
}
