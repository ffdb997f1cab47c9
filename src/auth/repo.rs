use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, StoreError, User};
use crate::db::PgStore;

const USER_COLUMNS: &str =
    "id, name, email, photo, password, role, verified, verification_code, created_at, updated_at";

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    /// Fails with `UniqueViolation` when the email is already taken.
    async fn create(&self, new: NewUser) -> Result<User, StoreError>;
    async fn set_verification_code(&self, id: Uuid, digest: Option<&str>) -> anyhow::Result<()>;
    /// Marks the owner of `digest` verified and clears the code in one step.
    /// Returns `false` when no user holds that digest.
    async fn consume_verification_code(&self, digest: &str) -> anyhow::Result<bool>;
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create(&self, new: NewUser) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, photo, password)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.photo)
        .bind(&new.password_hash)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn set_verification_code(&self, id: Uuid, digest: Option<&str>) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
               SET verification_code = $2, updated_at = now()
             WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(digest)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn consume_verification_code(&self, digest: &str) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
               SET verified = TRUE, verification_code = NULL, updated_at = now()
             WHERE verification_code = $1
            "#,
        )
        .bind(digest)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
