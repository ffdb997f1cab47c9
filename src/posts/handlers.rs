use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header::LOCATION, HeaderMap, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::{CreatePostRequest, ListPostResponse, ListQuery, PostResponse, UpdatePostRequest};
use super::services;
use crate::{auth::extractors::AuthUser, error::ApiError, state::AppState};

pub fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/:id", get(get_post).put(update_post).delete(delete_post))
}

#[instrument(skip(state, query))]
pub async fn list_posts(
    State(state): State<AppState>,
    _caller: AuthUser,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<ListPostResponse>, ApiError> {
    let Query(query) = query?;
    let posts = services::list_posts(&state, &query).await?;
    Ok(Json(ListPostResponse {
        status: "success",
        results: posts.len(),
        posts,
    }))
}

#[instrument(skip(state, body))]
pub async fn create_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    body: Result<Json<CreatePostRequest>, JsonRejection>,
) -> Result<(StatusCode, HeaderMap, Json<PostResponse>), ApiError> {
    let Json(body) = body?;
    let post = services::create_post(&state, user_id, body).await?;

    let mut headers = HeaderMap::new();
    let location = HeaderValue::from_str(&format!("/api/v1/posts/{}", post.id))
        .map_err(anyhow::Error::from)?;
    headers.insert(LOCATION, location);

    Ok((StatusCode::CREATED, headers, Json(post)))
}

#[instrument(skip(state, id))]
pub async fn get_post(
    State(state): State<AppState>,
    _caller: AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<PostResponse>, ApiError> {
    let Path(id) = id?;
    Ok(Json(services::get_post(&state, id).await?))
}

#[instrument(skip(state, id, body))]
pub async fn update_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<UpdatePostRequest>, JsonRejection>,
) -> Result<Json<PostResponse>, ApiError> {
    let Path(id) = id?;
    let Json(body) = body?;
    Ok(Json(services::update_post(&state, user_id, id, body).await?))
}

#[instrument(skip(state, id))]
pub async fn delete_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    services::delete_post(&state, user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
