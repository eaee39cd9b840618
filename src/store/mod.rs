//! Persistence boundary.
//!
//! Every operation is atomic for a single entity; finds never return
//! soft-deleted rows.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{Admin, Review, User};
use crate::security::roles::Role;

pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0} violates a unique constraint")]
    Conflict(&'static str),
    #[error("store backend failure: {0}")]
    Backend(String),
}

/// Field-level changes to one user. Unset fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub password_hash: Option<String>,
    /// Unioned into the stored role set; roles are never removed by a patch.
    pub grant_role: Option<Role>,
    pub admin_id: Option<Uuid>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl UserPatch {
    pub fn grant(role: Role) -> Self {
        Self {
            grant_role: Some(role),
            ..Self::default()
        }
    }

    pub fn link_admin(admin_id: Uuid) -> Self {
        Self {
            admin_id: Some(admin_id),
            ..Self::default()
        }
    }

    pub fn soft_delete(at: DateTime<Utc>) -> Self {
        Self {
            deleted_at: Some(at),
            ..Self::default()
        }
    }

    /// Apply onto the current row and bump `updated_at`.
    pub fn apply(self, user: &mut User, now: DateTime<Utc>) {
        if let Some(username) = self.username {
            user.username = username;
        }
        if let Some(display_name) = self.display_name {
            user.display_name = display_name;
        }
        if let Some(hash) = self.password_hash {
            user.password_hash = hash;
        }
        if let Some(role) = self.grant_role {
            user.roles.insert(role);
        }
        if let Some(admin_id) = self.admin_id {
            user.admin_id = Some(admin_id);
        }
        if let Some(at) = self.deleted_at {
            user.deleted_at = Some(at);
        }
        user.updated_at = now;
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;
    /// Insert a new user. Duplicate id or email is a conflict.
    async fn save_user(&self, user: User) -> Result<(), StoreError>;
    /// Patch a live user in place and return the result. Absent or
    /// soft-deleted users are `NotFound`.
    async fn update_user(&self, id: Uuid, patch: UserPatch) -> Result<User, StoreError>;

    async fn find_admin_by_user(&self, user_id: Uuid) -> Result<Option<Admin>, StoreError>;
    /// Insert an admin record. A second record for the same user is a conflict.
    async fn save_admin(&self, admin: Admin) -> Result<(), StoreError>;

    async fn find_review(&self, id: Uuid) -> Result<Option<Review>, StoreError>;
    async fn list_reviews(&self) -> Result<Vec<Review>, StoreError>;
    async fn list_reviews_by_user(&self, user_id: Uuid) -> Result<Vec<Review>, StoreError>;
    async fn save_review(&self, review: Review) -> Result<(), StoreError>;
    async fn update_review(&self, review: Review) -> Result<(), StoreError>;
    /// Soft delete: the row is marked and disappears from finds.
    async fn remove_review(&self, id: Uuid) -> Result<(), StoreError>;
}
