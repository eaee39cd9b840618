use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::User;
use crate::errors::AppError;
use crate::messages::MessageKey;
use crate::security::audit_log::AuditLogger;
use crate::security::guard::Caller;
use crate::security::password;
use crate::store::{Store, StoreError, UserPatch};

const INTERNAL: MessageKey = MessageKey::UserInternal;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub display_name: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserChanges {
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub password: Option<String>,
}

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn Store>,
    password_cost: u32,
    audit: AuditLogger,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>, password_cost: u32) -> Self {
        Self {
            store,
            password_cost,
            audit: AuditLogger::new(),
        }
    }

    pub async fn create(&self, data: NewUser) -> Result<User, AppError> {
        let existing = self
            .store
            .find_user_by_email(&data.email)
            .await
            .map_err(|e| AppError::internal(INTERNAL, e))?;
        if existing.is_some() {
            return Err(AppError::Conflict(MessageKey::UserExists));
        }

        let hash = password::hash_blocking(data.password, self.password_cost)
            .await
            .map_err(|e| AppError::internal(INTERNAL, e))?;
        let user = User::new(data.email, data.username, data.display_name, hash);

        match self.store.save_user(user.clone()).await {
            Ok(()) => Ok(user),
            // Lost a race against a concurrent registration.
            Err(StoreError::Conflict(_)) => Err(AppError::Conflict(MessageKey::UserExists)),
            Err(e) => Err(AppError::internal(INTERNAL, e)),
        }
    }

    /// Insert a fully formed user, e.g. the configured bootstrap admin.
    pub async fn insert(&self, user: User) -> Result<User, AppError> {
        match self.store.save_user(user.clone()).await {
            Ok(()) => Ok(user),
            Err(StoreError::Conflict(_)) => Err(AppError::Conflict(MessageKey::UserExists)),
            Err(e) => Err(AppError::internal(INTERNAL, e)),
        }
    }

    pub async fn list(&self) -> Result<Vec<User>, AppError> {
        self.store.list_users().await.map_err(|e| AppError::internal(INTERNAL, e))
    }

    pub async fn get(&self, id: Uuid) -> Result<User, AppError> {
        self.store
            .find_user(id)
            .await
            .map_err(|e| AppError::internal(INTERNAL, e))?
            .ok_or(AppError::NotFound(MessageKey::UserNotFound))
    }

    /// Only the named profile fields are written; roles and admin links
    /// changed concurrently are preserved.
    pub async fn update(&self, id: Uuid, changes: UserChanges) -> Result<User, AppError> {
        let password_hash = match changes.password {
            Some(plain) => Some(
                password::hash_blocking(plain, self.password_cost)
                    .await
                    .map_err(|e| AppError::internal(INTERNAL, e))?,
            ),
            None => None,
        };
        let patch = UserPatch {
            username: changes.username,
            display_name: changes.display_name,
            password_hash,
            ..UserPatch::default()
        };
        self.patch(id, patch).await
    }

    /// Self-service deletion. Callers without the elevated role confirm
    /// with their password.
    pub async fn delete_self(
        &self,
        caller: &Caller,
        confirmation: Option<String>,
    ) -> Result<(), AppError> {
        let user = self.get(caller.id).await?;

        if !user.roles.is_elevated() {
            let plain = confirmation.ok_or(AppError::Invalid(MessageKey::UserMissingData))?;
            let matches = password::verify_blocking(plain, user.password_hash)
                .await
                .map_err(|e| AppError::internal(INTERNAL, e))?;
            if !matches {
                return Err(AppError::Unauthenticated(MessageKey::PasswordNotMatch));
            }
        }

        self.soft_delete(user.id, caller.id).await
    }

    /// Deletion on behalf of an admin; no password confirmation.
    pub async fn delete_by_id(&self, caller: &Caller, id: Uuid) -> Result<(), AppError> {
        self.soft_delete(id, caller.id).await
    }

    async fn soft_delete(&self, id: Uuid, by: Uuid) -> Result<(), AppError> {
        self.patch(id, UserPatch::soft_delete(Utc::now())).await?;
        self.audit.user_deleted(id, by);
        Ok(())
    }

    async fn patch(&self, id: Uuid, patch: UserPatch) -> Result<User, AppError> {
        match self.store.update_user(id, patch).await {
            Ok(user) => Ok(user),
            Err(StoreError::NotFound(_)) => Err(AppError::NotFound(MessageKey::UserNotFound)),
            Err(e) => Err(AppError::internal(INTERNAL, e)),
        }
    }
}
