use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, SessionUser, SignupRequest, UserSummary},
        repo::{NewUser, User},
        session::Session,
    },
    error::{AppError, Result},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", delete(logout))
}

pub fn session_routes() -> Router<AppState> {
    Router::new().route("/check_session", get(check_session))
}

#[instrument(skip(state, session, payload))]
pub async fn signup(
    State(state): State<AppState>,
    mut session: Session,
    payload: std::result::Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, CookieJar, Json<UserSummary>)> {
    let Json(payload) = payload?;

    let username = payload.username.as_deref().unwrap_or_default();
    if username.is_empty() {
        warn!("signup without username");
        return Err(AppError::Validation("422 Unprocessable Entity".into()));
    }
    let Some(password) = payload.password.as_deref() else {
        warn!(%username, "signup without password");
        return Err(AppError::Validation("password is required".into()));
    };

    let user = User::create(
        &state.db,
        NewUser {
            username,
            bio: payload.bio.as_deref(),
            image_url: payload.image_url.as_deref(),
            password,
        },
    )
    .await?;

    session.set_user_id(user.id);
    let jar = session.save()?;

    info!(user_id = user.id, username = %user.username, "user signed up");
    Ok((StatusCode::CREATED, jar, Json(user.into())))
}

#[instrument(skip(state, session))]
pub async fn check_session(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<SessionUser>> {
    let Some(user_id) = session.get_user_id() else {
        return Err(AppError::Unauthorized);
    };

    match User::find_by_id(&state.db, user_id).await? {
        Some(user) => Ok(Json(user.into())),
        None => {
            warn!(user_id, "session refers to a missing user");
            Err(AppError::Unauthorized)
        }
    }
}

#[instrument(skip(state, session, payload))]
pub async fn login(
    State(state): State<AppState>,
    mut session: Session,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<UserSummary>)> {
    let Json(payload) = payload?;

    let Some(username) = payload.username.as_deref() else {
        warn!("login without username");
        return Err(AppError::Unauthorized);
    };

    let Some(user) = User::find_by_username(&state.db, username).await? else {
        warn!(%username, "login unknown username");
        return Err(AppError::Unauthorized);
    };

    let authenticated = match payload.password.as_deref() {
        Some(password) => user.authenticate(password),
        None if state.config.policy.allow_missing_password => {
            warn!(user_id = user.id, "login accepted without a password");
            true
        }
        None => false,
    };

    if !authenticated {
        warn!(%username, user_id = user.id, "login invalid password");
        return Err(AppError::Unauthorized);
    }

    session.set_user_id(user.id);
    let jar = session.save()?;

    info!(user_id = user.id, username = %user.username, "user logged in");
    Ok((jar, Json(user.into())))
}

#[instrument(skip(session))]
pub async fn logout(mut session: Session) -> Result<(StatusCode, CookieJar)> {
    let Some(user_id) = session.get_user_id() else {
        warn!("logout without an active session");
        return Err(AppError::Unauthorized);
    };

    session.clear_user_id();
    let jar = session.save()?;

    info!(user_id, "user logged out");
    Ok((StatusCode::NO_CONTENT, jar))
}
