//! Registration, login, refresh, logout and email verification.

use axum::http::{header::SET_COOKIE, HeaderMap};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::auth::{
    claims::TokenKind,
    cookies,
    dto::{LoginRequest, RegisterRequest},
    jwt::TokenError,
    password::{hash_password, verify_password},
    repo_types::{NewUser, StoreError, User},
    verification::{self, VerificationCode},
};
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::state::AppState;

const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[derive(Debug)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

fn issue_pair(state: &AppState, user_id: Uuid) -> Result<TokenPair, ApiError> {
    Ok(TokenPair {
        access_token: state.jwt.sign_access(user_id)?,
        refresh_token: state.jwt.sign_refresh(user_id)?,
    })
}

/// Headers setting the refresh cookie and the `logged_in` hint.
pub fn session_cookies(config: &AppConfig, pair: &TokenPair) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    let refresh = cookies::refresh_cookie(
        &pair.refresh_token,
        config.refresh_ttl_seconds(),
        config.cookie_secure,
    )
    .map_err(anyhow::Error::from)?;
    let logged_in = cookies::logged_in_cookie(config.access_ttl_seconds(), config.cookie_secure)
        .map_err(anyhow::Error::from)?;
    headers.append(SET_COOKIE, refresh);
    headers.append(SET_COOKIE, logged_in);
    Ok(headers)
}

/// Headers expiring both session cookies.
pub fn cleared_cookies(config: &AppConfig) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    headers.append(
        SET_COOKIE,
        cookies::clear_refresh_cookie(config.cookie_secure).map_err(anyhow::Error::from)?,
    );
    headers.append(
        SET_COOKIE,
        cookies::clear_logged_in_cookie(config.cookie_secure).map_err(anyhow::Error::from)?,
    );
    Ok(headers)
}

/// Creates an unverified account and emails its verification link.
///
/// If the email cannot be sent the account is kept but its pending code is
/// cleared, so a later resend starts from a clean slate.
#[instrument(skip(state, req), fields(email = %normalize_email(&req.email)))]
pub async fn register(state: &AppState, req: RegisterRequest) -> Result<User, ApiError> {
    let email = normalize_email(&req.email);
    let name = req.name.trim().to_string();

    if name.is_empty() {
        return Err(ApiError::BadRequest("Name is required".into()));
    }
    if !is_valid_email(&email) {
        warn!("invalid email");
        return Err(ApiError::BadRequest("Invalid email".into()));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    if state.users.find_by_email(&email).await?.is_some() {
        warn!("email already registered");
        return Err(ApiError::Conflict("Account already exist".into()));
    }
    if req.password != req.password_confirm {
        return Err(ApiError::BadRequest("Passwords do not match".into()));
    }

    let password_hash = hash_password(&req.password)?;
    let user = match state
        .users
        .create(NewUser {
            name,
            email,
            photo: req.photo.trim().to_string(),
            password_hash,
        })
        .await
    {
        Ok(u) => u,
        Err(StoreError::UniqueViolation) => {
            warn!("lost registration race on email");
            return Err(ApiError::Conflict("Account already exist".into()));
        }
        Err(StoreError::Other(e)) => return Err(ApiError::Internal(e)),
    };

    let code = VerificationCode::generate();
    state
        .users
        .set_verification_code(user.id, Some(&code.digest()))
        .await?;

    let url = verification::verification_url(&state.config.public_base_url, &code.to_hex());
    if let Err(e) = state.mailer.send_verification(&user.email, &user.name, &url).await {
        error!(error = ?e, user_id = %user.id, "verification email failed");
        if let Err(e) = state.users.set_verification_code(user.id, None).await {
            error!(error = ?e, user_id = %user.id, "clearing verification code failed");
        }
        return Err(ApiError::EmailDelivery);
    }

    info!(user_id = %user.id, "user registered");
    Ok(user)
}

#[instrument(skip(state, req), fields(email = %normalize_email(&req.email)))]
pub async fn login(state: &AppState, req: LoginRequest) -> Result<TokenPair, ApiError> {
    let email = normalize_email(&req.email);
    if !is_valid_email(&email) {
        return Err(ApiError::BadRequest("Invalid email".into()));
    }

    let Some(user) = state.users.find_by_email(&email).await? else {
        warn!("login unknown email");
        return Err(ApiError::InvalidCredentials);
    };

    if !verify_password(&req.password, &user.password)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    if !user.verified {
        warn!(user_id = %user.id, "login before email verification");
        return Err(ApiError::Unauthorized("Please verify your account".into()));
    }

    let pair = issue_pair(state, user.id)?;
    info!(user_id = %user.id, "user logged in");
    Ok(pair)
}

fn refresh_failure(e: &TokenError) -> ApiError {
    let reason = match e {
        TokenError::Missing => "Please provide refresh token",
        TokenError::Expired => "Refresh token has expired",
        TokenError::InvalidSignature => "Refresh token signature is invalid",
        TokenError::WrongType { .. } => "Only refresh tokens are allowed",
        TokenError::Invalid => "Invalid refresh token",
    };
    ApiError::BadRequest(reason.into())
}

/// Mints a new pair from a refresh token, provided its subject still exists.
#[instrument(skip_all)]
pub async fn refresh(state: &AppState, refresh_token: Option<&str>) -> Result<TokenPair, ApiError> {
    let user_id = state
        .jwt
        .verify(refresh_token, TokenKind::Refresh)
        .map_err(|e| {
            warn!(error = %e, "refresh rejected");
            refresh_failure(&e)
        })?;

    let Some(user) = state.users.find_by_id(user_id).await? else {
        warn!(%user_id, "refresh for unknown user");
        return Err(ApiError::BadRequest("Invalid token or token expired".into()));
    };

    issue_pair(state, user.id)
}

/// Consumes the code behind a verification link. Unknown and already-used
/// codes are indistinguishable.
#[instrument(skip_all)]
pub async fn verify_email(state: &AppState, token_hex: &str) -> Result<(), ApiError> {
    let digest = verification::digest_from_hex(token_hex)
        .ok_or_else(|| ApiError::BadRequest("Invalid verification token".into()))?;

    if !state.users.consume_verification_code(&digest).await? {
        warn!("verification code not found");
        return Err(ApiError::Forbidden("Email can only be verified once".into()));
    }
    info!("email verified");
    Ok(())
}

pub async fn current_user(state: &AppState, user_id: Uuid) -> Result<User, ApiError> {
    state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("The user belonging to this token no longer exists".into()))
}
