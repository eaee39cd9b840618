//! Role promotion.
//!
//! Promotion touches two entities (the user's role set and the Admin record)
//! without a transaction. Each step checks current state first, so running it
//! again completes whatever a failed run left behind.

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Admin, User};
use crate::errors::AppError;
use crate::messages::MessageKey;
use crate::security::audit_log::AuditLogger;
use crate::security::roles::Role;
use crate::store::{Store, StoreError, UserPatch};

const FAILED: MessageKey = MessageKey::PromotedToAdminFailed;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromotionOutcome {
    pub admin_id: Uuid,
    pub role_added: bool,
    pub admin_created: bool,
}

#[derive(Clone)]
pub struct RoleService {
    store: Arc<dyn Store>,
    audit: AuditLogger,
}

impl RoleService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            audit: AuditLogger::new(),
        }
    }

    pub async fn promote_to_admin(&self, user_id: Uuid) -> Result<PromotionOutcome, AppError> {
        let mut user = self
            .store
            .find_user(user_id)
            .await
            .map_err(|e| AppError::internal(FAILED, e))?
            .ok_or(AppError::NotFound(MessageKey::UserNotFound))?;

        let role_added = !user.roles.contains(Role::ELEVATED);
        if role_added {
            // Unioned under the store lock, never written back from this copy.
            user = self.patch(user_id, UserPatch::grant(Role::ELEVATED)).await?;
        }

        let (admin, admin_created) = self.ensure_admin_record(user_id).await?;

        if user.admin_id != Some(admin.id) {
            self.patch(user_id, UserPatch::link_admin(admin.id)).await?;
        }

        self.audit.user_promoted(user_id, role_added, admin_created);
        Ok(PromotionOutcome {
            admin_id: admin.id,
            role_added,
            admin_created,
        })
    }

    async fn patch(&self, user_id: Uuid, patch: UserPatch) -> Result<User, AppError> {
        match self.store.update_user(user_id, patch).await {
            Ok(user) => Ok(user),
            Err(StoreError::NotFound(_)) => Err(AppError::NotFound(MessageKey::UserNotFound)),
            Err(e) => Err(AppError::internal(FAILED, e)),
        }
    }

    async fn ensure_admin_record(&self, user_id: Uuid) -> Result<(Admin, bool), AppError> {
        let existing = self
            .store
            .find_admin_by_user(user_id)
            .await
            .map_err(|e| AppError::internal(FAILED, e))?;
        if let Some(admin) = existing {
            return Ok((admin, false));
        }

        let admin = Admin::for_user(user_id);
        match self.store.save_admin(admin.clone()).await {
            Ok(()) => Ok((admin, true)),
            // A concurrent promotion of the same user got there first.
            Err(StoreError::Conflict(_)) => {
                let winner = self
                    .store
                    .find_admin_by_user(user_id)
                    .await
                    .map_err(|e| AppError::internal(FAILED, e))?
                    .ok_or_else(|| {
                        AppError::internal(FAILED, "admin record vanished after conflict")
                    })?;
                Ok((winner, false))
            }
            Err(e) => Err(AppError::internal(FAILED, e)),
        }
    }
}
