use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError, UserPatch};
use crate::domain::{Admin, Review, User};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    admins: HashMap<Uuid, Admin>,
    reviews: HashMap<Uuid, Review>,
}

/// In-memory store shared across requests. Writers serialize on one lock.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of admin records linked to `user_id`, soft-deleted users included.
    pub async fn admin_count_for(&self, user_id: Uuid) -> usize {
        let tables = self.tables.read().await;
        tables.admins.values().filter(|a| a.user_id == user_id).count()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).filter(|u| !u.is_deleted()).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| !u.is_deleted() && u.email == email)
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables
            .users
            .values()
            .filter(|u| !u.is_deleted())
            .cloned()
            .collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn save_user(&self, user: User) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        // Soft-deleted rows keep their email reserved.
        if tables.users.contains_key(&user.id)
            || tables.users.values().any(|u| u.email == user.email)
        {
            return Err(StoreError::Conflict("user"));
        }
        tables.users.insert(user.id, user);
        Ok(())
    }

    async fn update_user(&self, id: Uuid, patch: UserPatch) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        match tables.users.get_mut(&id) {
            Some(existing) if !existing.is_deleted() => {
                patch.apply(existing, Utc::now());
                Ok(existing.clone())
            }
            _ => Err(StoreError::NotFound("user")),
        }
    }

    async fn find_admin_by_user(&self, user_id: Uuid) -> Result<Option<Admin>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.admins.values().find(|a| a.user_id == user_id).cloned())
    }

    async fn save_admin(&self, admin: Admin) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if tables.admins.contains_key(&admin.id)
            || tables.admins.values().any(|a| a.user_id == admin.user_id)
        {
            return Err(StoreError::Conflict("admin"));
        }
        tables.admins.insert(admin.id, admin);
        Ok(())
    }

    async fn find_review(&self, id: Uuid) -> Result<Option<Review>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.reviews.get(&id).filter(|r| !r.is_deleted()).cloned())
    }

    async fn list_reviews(&self) -> Result<Vec<Review>, StoreError> {
        let tables = self.tables.read().await;
        let mut reviews: Vec<Review> = tables
            .reviews
            .values()
            .filter(|r| !r.is_deleted())
            .cloned()
            .collect();
        reviews.sort_by_key(|r| r.published_at);
        Ok(reviews)
    }

    async fn list_reviews_by_user(&self, user_id: Uuid) -> Result<Vec<Review>, StoreError> {
        let mut reviews = self.list_reviews().await?;
        reviews.retain(|r| r.user_id == user_id);
        Ok(reviews)
    }

    async fn save_review(&self, review: Review) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if tables.reviews.contains_key(&review.id) {
            return Err(StoreError::Conflict("review"));
        }
        tables.reviews.insert(review.id, review);
        Ok(())
    }

    async fn update_review(&self, review: Review) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        match tables.reviews.get_mut(&review.id) {
            Some(existing) if !existing.is_deleted() => {
                *existing = review;
                Ok(())
            }
            _ => Err(StoreError::NotFound("review")),
        }
    }

    async fn remove_review(&self, id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        match tables.reviews.get_mut(&id) {
            Some(existing) if !existing.is_deleted() => {
                existing.deleted_at = Some(Utc::now());
                Ok(())
            }
            _ => Err(StoreError::NotFound("review")),
        }
    }
}
