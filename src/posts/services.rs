use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{CreatePostRequest, ListQuery, PostResponse, UpdatePostRequest};
use super::repo_types::PostRow;
use crate::error::ApiError;
use crate::state::AppState;

/// The one ownership rule shared by update and delete.
pub fn check_ownership(post: &PostRow, caller: Uuid) -> Result<(), ApiError> {
    if post.user_id != caller {
        warn!(post_id = %post.id, owner = %post.user_id, %caller, "ownership check failed");
        return Err(ApiError::Forbidden("You are not allowed to perform this action".into()));
    }
    Ok(())
}

fn not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("Post with this id: {id}, not found"))
}

async fn owned_post(state: &AppState, id: Uuid, caller: Uuid) -> Result<PostRow, ApiError> {
    let post = state.posts.find(id).await?.ok_or_else(|| not_found(id))?;
    check_ownership(&post, caller)?;
    Ok(post)
}

pub async fn list_posts(state: &AppState, query: &ListQuery) -> Result<Vec<PostResponse>, ApiError> {
    let (limit, offset) = query.window();
    let rows = state.posts.list(query.search.trim(), limit, offset).await?;
    Ok(rows.into_iter().map(PostResponse::from).collect())
}

#[instrument(skip(state, req))]
pub async fn create_post(
    state: &AppState,
    owner: Uuid,
    req: CreatePostRequest,
) -> Result<PostResponse, ApiError> {
    let new = req.validate()?;
    crate::auth::services::current_user(state, owner).await?;
    let row = state.posts.create(owner, new).await?;
    info!(post_id = %row.id, "post created");
    Ok(row.into())
}

pub async fn get_post(state: &AppState, id: Uuid) -> Result<PostResponse, ApiError> {
    let row = state.posts.find(id).await?.ok_or_else(|| not_found(id))?;
    Ok(row.into())
}

#[instrument(skip(state, req))]
pub async fn update_post(
    state: &AppState,
    caller: Uuid,
    id: Uuid,
    req: UpdatePostRequest,
) -> Result<PostResponse, ApiError> {
    owned_post(state, id, caller).await?;
    let patch = req.validate()?;
    let row = state.posts.update(id, patch).await?.ok_or_else(|| not_found(id))?;
    info!(post_id = %id, "post updated");
    Ok(row.into())
}

#[instrument(skip(state))]
pub async fn delete_post(state: &AppState, caller: Uuid, id: Uuid) -> Result<(), ApiError> {
    owned_post(state, id, caller).await?;
    if !state.posts.delete(id).await? {
        return Err(not_found(id));
    }
    info!(post_id = %id, "post deleted");
    Ok(())
}
