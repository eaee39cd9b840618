use std::sync::Arc;

use crate::domain::User;
use crate::errors::AppError;
use crate::messages::MessageKey;
use crate::security::audit_log::AuditLogger;
use crate::security::password;
use crate::security::token::TokenService;
use crate::store::Store;

#[derive(Debug, Clone)]
pub struct SignIn {
    pub user: User,
    pub access_token: String,
}

/// Credential check and token issuance.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn Store>,
    tokens: TokenService,
    audit: AuditLogger,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, tokens: TokenService) -> Self {
        Self {
            store,
            tokens,
            audit: AuditLogger::new(),
        }
    }

    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn sign_in(&self, email: &str, plain_password: &str) -> Result<SignIn, AppError> {
        let user = self
            .store
            .find_user_by_email(email)
            .await
            .map_err(|e| AppError::internal(MessageKey::LoginFailed, e))?;

        let Some(user) = user else {
            self.audit.sign_in_failure("unknown email");
            return Err(AppError::Unauthenticated(MessageKey::InvalidCredentials));
        };

        let stored_hash = user.password_hash.clone();
        let matches = password::verify_blocking(plain_password.to_string(), stored_hash)
            .await
            .map_err(|e| AppError::internal(MessageKey::LoginFailed, e))?;
        if !matches {
            self.audit.sign_in_failure("password mismatch");
            return Err(AppError::Unauthenticated(MessageKey::InvalidCredentials));
        }

        let access_token = self
            .tokens
            .issue(&user)
            .map_err(|e| AppError::internal(MessageKey::LoginFailed, e))?;

        self.audit.sign_in_success(user.id);
        Ok(SignIn { user, access_token })
    }
}
