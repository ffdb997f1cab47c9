use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{NewPost, PostPatch, PostRow};
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub category: String,
    #[serde(default)]
    pub image: String,
}

impl CreatePostRequest {
    pub fn validate(self) -> Result<NewPost, ApiError> {
        let title = required("title", self.title)?;
        let content = required("content", self.content)?;
        let category = required("category", self.category)?;
        Ok(NewPost {
            title,
            content,
            category,
            image: self.image.trim().to_string(),
        })
    }
}

/// Any subset of the editable fields. Ownership is not editable.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
}

impl UpdatePostRequest {
    pub fn validate(self) -> Result<PostPatch, ApiError> {
        Ok(PostPatch {
            title: self.title.map(|v| required("title", v)).transpose()?,
            content: self.content.map(|v| required("content", v)).transpose()?,
            category: self.category.map(|v| required("category", v)).transpose()?,
            image: self.image.map(|v| v.trim().to_string()),
        })
    }
}

fn required(field: &str, value: String) -> Result<String, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::BadRequest(format!("{field} must not be empty")));
    }
    Ok(value.to_string())
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default)]
    pub search: String,
}
fn default_limit() -> i64 { 10 }
fn default_page() -> i64 { 1 }

impl ListQuery {
    pub const MAX_LIMIT: i64 = 100;

    /// `(limit, offset)` with out-of-range values pulled back into bounds.
    pub fn window(&self) -> (i64, i64) {
        let limit = self.limit.clamp(1, Self::MAX_LIMIT);
        let page = self.page.max(1);
        (limit, (page - 1).saturating_mul(limit))
    }
}

#[derive(Debug, Serialize)]
pub struct PostOwner {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub photo: String,
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category: String,
    pub image: String,
    pub user_id: Uuid,
    pub user: PostOwner,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<PostRow> for PostResponse {
    fn from(r: PostRow) -> Self {
        Self {
            id: r.id,
            title: r.title,
            content: r.content,
            category: r.category,
            image: r.image,
            user_id: r.user_id,
            user: PostOwner {
                id: r.user_id,
                name: r.owner_name,
                email: r.owner_email,
                photo: r.owner_photo,
            },
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListPostResponse {
    pub status: &'static str,
    pub results: usize,
    pub posts: Vec<PostResponse>,
}
