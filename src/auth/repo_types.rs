use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String, // lowercase, unique
    pub photo: String,
    #[serde(skip_serializing)]
    pub password: String, // Argon2 PHC string
    pub role: String,
    pub verified: bool,
    #[serde(skip_serializing)]
    pub verification_code: Option<String>, // SHA-256 hex of the emailed code
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Columns supplied on registration; the rest take their defaults.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub photo: String,
    pub password_hash: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated")]
    UniqueViolation,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if crate::db::is_unique_violation(&e) {
            Self::UniqueViolation
        } else {
            Self::Other(e.into())
        }
    }
}
