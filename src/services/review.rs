use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::Review;
use crate::errors::AppError;
use crate::messages::MessageKey;
use crate::security::audit_log::AuditLogger;
use crate::security::guard::Caller;
use crate::security::ownership::authorize_mutation;
use crate::store::{Store, StoreError};

const INTERNAL: MessageKey = MessageKey::ReviewInternal;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub book_reference: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub authors: Option<Vec<String>>,
    pub rating: u8,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewChanges {
    pub book_reference: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub authors: Option<Vec<String>>,
    pub rating: Option<u8>,
}

/// Reviews of one user, with just enough of the user to label them.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserReviews {
    pub user_id: Uuid,
    pub username: String,
    pub reviews: Vec<Review>,
}

#[derive(Clone)]
pub struct ReviewService {
    store: Arc<dyn Store>,
    audit: AuditLogger,
}

impl ReviewService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            audit: AuditLogger::new(),
        }
    }

    pub async fn create(&self, caller: &Caller, data: NewReview) -> Result<Review, AppError> {
        let review = Review::new(
            caller.id,
            data.book_reference,
            data.title,
            data.content,
            data.authors,
            data.rating,
        );
        self.store
            .save_review(review.clone())
            .await
            .map_err(|e| AppError::internal(INTERNAL, e))?;
        Ok(review)
    }

    pub async fn list(&self) -> Result<Vec<Review>, AppError> {
        self.store.list_reviews().await.map_err(|e| AppError::internal(INTERNAL, e))
    }

    pub async fn get(&self, id: Uuid) -> Result<Review, AppError> {
        self.store
            .find_review(id)
            .await
            .map_err(|e| AppError::internal(INTERNAL, e))?
            .ok_or(AppError::NotFound(MessageKey::ReviewNotFound))
    }

    pub async fn list_by_user(&self, user_id: Uuid) -> Result<UserReviews, AppError> {
        let user = self
            .store
            .find_user(user_id)
            .await
            .map_err(|e| AppError::internal(INTERNAL, e))?
            .ok_or(AppError::NotFound(MessageKey::UserNotFound))?;
        let reviews = self
            .store
            .list_reviews_by_user(user.id)
            .await
            .map_err(|e| AppError::internal(INTERNAL, e))?;
        Ok(UserReviews {
            user_id: user.id,
            username: user.username,
            reviews,
        })
    }

    pub async fn update(
        &self,
        caller: &Caller,
        id: Uuid,
        changes: ReviewChanges,
    ) -> Result<Review, AppError> {
        let mut review = self.load_for_mutation(caller, id).await?;

        if let Some(book_reference) = changes.book_reference {
            review.book_reference = book_reference;
        }
        if let Some(title) = changes.title {
            review.title = title;
        }
        if let Some(content) = changes.content {
            review.content = content;
        }
        if let Some(authors) = changes.authors {
            review.authors = Some(authors);
        }
        if let Some(rating) = changes.rating {
            review.rating = rating;
        }
        review.updated_at = Utc::now();

        match self.store.update_review(review.clone()).await {
            Ok(()) => Ok(review),
            Err(StoreError::NotFound(_)) => Err(AppError::NotFound(MessageKey::ReviewNotFound)),
            Err(e) => Err(AppError::internal(INTERNAL, e)),
        }
    }

    pub async fn delete(&self, caller: &Caller, id: Uuid) -> Result<(), AppError> {
        let review = self.load_for_mutation(caller, id).await?;
        match self.store.remove_review(review.id).await {
            Ok(()) => Ok(()),
            Err(StoreError::NotFound(_)) => Err(AppError::NotFound(MessageKey::ReviewNotFound)),
            Err(e) => Err(AppError::internal(INTERNAL, e)),
        }
    }

    async fn load_for_mutation(&self, caller: &Caller, id: Uuid) -> Result<Review, AppError> {
        let found = self
            .store
            .find_review(id)
            .await
            .map_err(|e| AppError::internal(INTERNAL, e))?;
        authorize_mutation(caller, found, MessageKey::ReviewNotFound, |r| r.user_id)
            .inspect_err(|err| {
                if matches!(err, AppError::Forbidden(_)) {
                    self.audit.ownership_denied(caller.id, "review", id);
                }
            })
    }
}
