use async_trait::async_trait;
use uuid::Uuid;

use crate::db::{contains_pattern, PgStore};
use crate::posts::repo_types::{NewPost, PostPatch, PostRow};

#[async_trait]
pub trait PostStore: Send + Sync {
    /// Posts whose title contains `search` (case-insensitive), newest first.
    async fn list(&self, search: &str, limit: i64, offset: i64) -> anyhow::Result<Vec<PostRow>>;
    async fn create(&self, owner: Uuid, new: NewPost) -> anyhow::Result<PostRow>;
    async fn find(&self, id: Uuid) -> anyhow::Result<Option<PostRow>>;
    async fn update(&self, id: Uuid, patch: PostPatch) -> anyhow::Result<Option<PostRow>>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}

const JOINED_SELECT: &str = r#"
    SELECT p.id, p.user_id, p.title, p.content, p.category, p.image,
           p.created_at, p.updated_at,
           u.name AS owner_name, u.email AS owner_email, u.photo AS owner_photo
"#;

#[async_trait]
impl PostStore for PgStore {
    async fn list(&self, search: &str, limit: i64, offset: i64) -> anyhow::Result<Vec<PostRow>> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            {JOINED_SELECT}
              FROM posts p
              JOIN users u ON u.id = p.user_id
             WHERE p.title ILIKE $1
             ORDER BY p.created_at DESC, p.id
             LIMIT $2 OFFSET $3
            "#
        ))
        .bind(contains_pattern(search))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn create(&self, owner: Uuid, new: NewPost) -> anyhow::Result<PostRow> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            WITH p AS (
                INSERT INTO posts (user_id, title, content, category, image)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
            )
            {JOINED_SELECT}
              FROM p
              JOIN users u ON u.id = p.user_id
            "#
        ))
        .bind(owner)
        .bind(&new.title)
        .bind(&new.content)
        .bind(&new.category)
        .bind(&new.image)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<PostRow>> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            {JOINED_SELECT}
              FROM posts p
              JOIN users u ON u.id = p.user_id
             WHERE p.id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(&self, id: Uuid, patch: PostPatch) -> anyhow::Result<Option<PostRow>> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            WITH p AS (
                UPDATE posts
                   SET title      = COALESCE($2, title),
                       content    = COALESCE($3, content),
                       category   = COALESCE($4, category),
                       image      = COALESCE($5, image),
                       updated_at = now()
                 WHERE id = $1
                RETURNING *
            )
            {JOINED_SELECT}
              FROM p
              JOIN users u ON u.id = p.user_id
            "#
        ))
        .bind(id)
        .bind(patch.title)
        .bind(patch.content)
        .bind(patch.category)
        .bind(patch.image)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
