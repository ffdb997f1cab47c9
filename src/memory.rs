//! In-process store used by `AppState::fake()` and the tests.
//!
//! Mirrors the Postgres semantics that matter to callers: email uniqueness,
//! single-step verification consumption, owner joins and partial updates.

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::repo::UserStore;
use crate::auth::repo_types::{NewUser, StoreError, User};
use crate::posts::repo::PostStore;
use crate::posts::repo_types::{NewPost, PostPatch, PostRow};

struct StoredPost {
    id: Uuid,
    user_id: Uuid,
    title: String,
    content: String,
    category: String,
    image: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    posts: RwLock<Vec<StoredPost>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn join(post: &StoredPost, users: &[User]) -> Option<PostRow> {
        let owner = users.iter().find(|u| u.id == post.user_id)?;
        Some(PostRow {
            id: post.id,
            user_id: post.user_id,
            title: post.title.clone(),
            content: post.content.clone(),
            category: post.category.clone(),
            image: post.image.clone(),
            created_at: post.created_at,
            updated_at: post.updated_at,
            owner_name: owner.name.clone(),
            owner_email: owner.email.clone(),
            owner_photo: owner.photo.clone(),
        })
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        Ok(self.users.read().await.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn create(&self, new: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == new.email) {
            return Err(StoreError::UniqueViolation);
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email,
            photo: new.photo,
            password: new.password_hash,
            role: "user".into(),
            verified: false,
            verification_code: None,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn set_verification_code(&self, id: Uuid, digest: Option<&str>) -> anyhow::Result<()> {
        let mut users = self.users.write().await;
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.verification_code = digest.map(str::to_string);
            user.updated_at = OffsetDateTime::now_utc();
        }
        Ok(())
    }

    async fn consume_verification_code(&self, digest: &str) -> anyhow::Result<bool> {
        let mut users = self.users.write().await;
        match users
            .iter_mut()
            .find(|u| u.verification_code.as_deref() == Some(digest))
        {
            Some(user) => {
                user.verified = true;
                user.verification_code = None;
                user.updated_at = OffsetDateTime::now_utc();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn list(&self, search: &str, limit: i64, offset: i64) -> anyhow::Result<Vec<PostRow>> {
        let needle = search.to_lowercase();
        let users = self.users.read().await;
        let posts = self.posts.read().await;
        let rows = posts
            .iter()
            .rev()
            .filter(|p| p.title.to_lowercase().contains(&needle))
            .skip(usize::try_from(offset.max(0))?)
            .take(usize::try_from(limit.max(0))?)
            .filter_map(|p| Self::join(p, &users))
            .collect();
        Ok(rows)
    }

    async fn create(&self, owner: Uuid, new: NewPost) -> anyhow::Result<PostRow> {
        let users = self.users.read().await;
        anyhow::ensure!(users.iter().any(|u| u.id == owner), "post owner {owner} does not exist");
        let now = OffsetDateTime::now_utc();
        let post = StoredPost {
            id: Uuid::new_v4(),
            user_id: owner,
            title: new.title,
            content: new.content,
            category: new.category,
            image: new.image,
            created_at: now,
            updated_at: now,
        };
        let row = Self::join(&post, &users);
        self.posts.write().await.push(post);
        row.ok_or_else(|| anyhow::anyhow!("post owner vanished"))
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<PostRow>> {
        let users = self.users.read().await;
        let posts = self.posts.read().await;
        Ok(posts.iter().find(|p| p.id == id).and_then(|p| Self::join(p, &users)))
    }

    async fn update(&self, id: Uuid, patch: PostPatch) -> anyhow::Result<Option<PostRow>> {
        let users = self.users.read().await;
        let mut posts = self.posts.write().await;
        let Some(post) = posts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(title) = patch.title {
            post.title = title;
        }
        if let Some(content) = patch.content {
            post.content = content;
        }
        if let Some(category) = patch.category {
            post.category = category;
        }
        if let Some(image) = patch.image {
            post.image = image;
        }
        post.updated_at = OffsetDateTime::now_utc();
        Ok(Self::join(post, &users))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut posts = self.posts.write().await;
        let before = posts.len();
        posts.retain(|p| p.id != id);
        Ok(posts.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Alice".into(),
            email: email.into(),
            photo: String::new(),
            password_hash: "hash".into(),
        }
    }

    fn new_post(title: &str) -> NewPost {
        NewPost {
            title: title.into(),
            content: "body".into(),
            category: "misc".into(),
            image: String::new(),
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_a_unique_violation() {
        let store = MemoryStore::new();
        UserStore::create(&store, new_user("alice@example.com")).await.unwrap();
        let err = UserStore::create(&store, new_user("alice@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation));
    }

    #[tokio::test]
    async fn verification_code_is_consumed_once() {
        let store = MemoryStore::new();
        let user = UserStore::create(&store, new_user("a@example.com")).await.unwrap();
        store.set_verification_code(user.id, Some("digest")).await.unwrap();

        assert!(store.consume_verification_code("digest").await.unwrap());
        assert!(!store.consume_verification_code("digest").await.unwrap());

        let user = store.find_by_id(user.id).await.unwrap().unwrap();
        assert!(user.verified);
        assert_eq!(user.verification_code, None);
    }

    #[tokio::test]
    async fn list_filters_case_insensitively_and_pages() {
        let store = MemoryStore::new();
        let owner = UserStore::create(&store, new_user("a@example.com")).await.unwrap();
        for title in ["Rust ownership", "Go channels", "rusty nails", "RUST async"] {
            PostStore::create(&store, owner.id, new_post(title)).await.unwrap();
        }

        let hits = store.list("rust", 10, 0).await.unwrap();
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].title, "RUST async");
        assert_eq!(hits[0].owner_email, "a@example.com");

        let page_two = store.list("rust", 2, 2).await.unwrap();
        assert_eq!(page_two.len(), 1);
        assert_eq!(page_two[0].title, "Rust ownership");
    }

    #[tokio::test]
    async fn update_merges_only_supplied_fields() {
        let store = MemoryStore::new();
        let owner = UserStore::create(&store, new_user("a@example.com")).await.unwrap();
        let post = PostStore::create(&store, owner.id, new_post("Draft")).await.unwrap();

        let patch = PostPatch { title: Some("Final".into()), ..Default::default() };
        let updated = store.update(post.id, patch).await.unwrap().unwrap();
        assert_eq!(updated.title, "Final");
        assert_eq!(updated.content, "body");
        assert_eq!(updated.user_id, owner.id);

        assert!(store.update(Uuid::new_v4(), PostPatch::default()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_was_removed() {
        let store = MemoryStore::new();
        let owner = UserStore::create(&store, new_user("a@example.com")).await.unwrap();
        let post = PostStore::create(&store, owner.id, new_post("Gone soon")).await.unwrap();
        assert!(store.delete(post.id).await.unwrap());
        assert!(!store.delete(post.id).await.unwrap());
        assert!(PostStore::find(&store, post.id).await.unwrap().is_none());
    }
}
