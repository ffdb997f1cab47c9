use axum::{
    extract::{rejection::{JsonRejection, PathRejection}, Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        cookies::{read_cookie, REFRESH_COOKIE},
        dto::{LoginRequest, LoginResponse, RefreshResponse, RegisterRequest, StatusResponse, UserResponse},
        extractors::AuthUser,
        services,
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", get(refresh))
        .route("/auth/logout", get(logout))
        .route("/auth/verifyemail/:token", get(verify_email))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/users/me", get(get_me))
}

#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    services::register(&state, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(StatusResponse::with_message(
            "Verification token successfully sent to your email",
        )),
    ))
}

#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let pair = services::login(&state, payload).await?;
    let cookies = services::session_cookies(&state.config, &pair)?;
    Ok((
        cookies,
        Json(LoginResponse {
            status: "success",
            access_token: pair.access_token,
        }),
    ))
}

#[instrument(skip_all)]
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = read_cookie(&headers, REFRESH_COOKIE);
    let pair = services::refresh(&state, token.as_deref()).await?;
    let cookies = services::session_cookies(&state.config, &pair)?;
    Ok((
        cookies,
        Json(RefreshResponse {
            access_token: pair.access_token,
        }),
    ))
}

/// Clears the client-side session. Issued tokens stay valid until they expire.
#[instrument(skip(state))]
pub async fn logout(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!(%user_id, "user logged out");
    let cookies = services::cleared_cookies(&state.config)?;
    Ok((cookies, Json(StatusResponse::success())))
}

#[instrument(skip_all)]
pub async fn verify_email(
    State(state): State<AppState>,
    token: Result<Path<String>, PathRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    let Path(token) = token?;
    services::verify_email(&state, &token).await?;
    Ok(Json(StatusResponse::with_message("Account verified successfully")))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = services::current_user(&state, user_id).await?;
    Ok(Json(UserResponse::from(user)))
}
