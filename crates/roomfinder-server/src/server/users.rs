//! Sign-up, sign-in and sign-out.

use axum::Json;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::response::{AppendHeaders, IntoResponse, Redirect};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use super::{ApiError, AppState, validate};
use crate::auth::{cookies, password};
use crate::storage::{DatabaseError, NewUser};

const USERNAME_LEN: std::ops::RangeInclusive<usize> = 1..=100;
const BIO_MAX: usize = 1000;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub username: String,
    pub password: String,
}

fn check_credentials(username: &str, password: &str) -> Result<(), ApiError> {
    validate::alphanumeric("username", username)?;
    validate::length("username", username, USERNAME_LEN)?;
    password::check_policy(password).map_err(ApiError::BadRequest)
}

/// `POST /signup`
#[instrument(skip_all, fields(username = %req.username))]
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<Json<String>, ApiError> {
    let username = req.username.trim();
    check_credentials(username, &req.password)?;
    let email = req.email.as_deref().map(str::trim);
    validate::email(email)?;
    validate::optional_length("bio", req.bio.as_deref(), BIO_MAX)?;

    let hash = password::hash_password(&req.password)
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))?;

    let created = state
        .db
        .create_user(&NewUser {
            username,
            password_hash: &hash,
            first_name: req.first_name.as_deref().map(str::trim),
            last_name: req.last_name.as_deref().map(str::trim),
            email,
            bio: req.bio.as_deref(),
        })
        .await;
    match created {
        Ok(user) => {
            info!("User signed up");
            Ok(Json(format!("user {} signed up", user.username)))
        }
        Err(DatabaseError::Conflict(_)) => Err(ApiError::Conflict(format!(
            "username {username} already exists"
        ))),
        Err(e) => Err(e.into()),
    }
}

/// `POST /signin`
#[instrument(skip_all, fields(username = %req.username))]
pub async fn signin(
    State(state): State<AppState>,
    Json(req): Json<SigninRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = req.username.trim();
    check_credentials(username, &req.password)?;

    let user = match state.db.get_user(username).await {
        Ok(user) => user,
        Err(DatabaseError::NotFound(_)) => {
            return Err(ApiError::unauthorized(
                "access denied. Have you created an account?",
            ));
        }
        Err(e) => return Err(e.into()),
    };

    let valid = password::verify_password(&req.password, &user.password_hash)
        .map_err(|_| ApiError::Internal("password verification failed".into()))?;
    if !valid {
        warn!("Failed sign-in attempt");
        return Err(ApiError::unauthorized("access denied"));
    }

    let token = state
        .sessions
        .issue(&user.username)
        .map_err(|e| ApiError::Internal(format!("session issue failed: {e}")))?;
    let [session, name] = cookies::sign_in(
        &token,
        &user.username,
        state.sessions.ttl_secs(),
        state.secure_cookies,
    );

    info!("User signed in");
    Ok((
        AppendHeaders([(SET_COOKIE, session), (SET_COOKIE, name)]),
        Json(format!("user {} signed in", user.username)),
    ))
}

/// `GET /signout`
pub async fn signout(State(state): State<AppState>) -> impl IntoResponse {
    let [session, name] = cookies::sign_out(state.secure_cookies);
    (
        AppendHeaders([(SET_COOKIE, session), (SET_COOKIE, name)]),
        Redirect::to("/"),
    )
}
