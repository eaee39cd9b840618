use axum::extract::FromRequestParts;
use axum::http::{request::Parts, Method};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::AppError;
use crate::messages::MessageKey;
use crate::security::audit_log::AuditLogger;
use crate::security::roles::{Role, RoleSet};
use crate::security::token::TokenService;
use crate::store::Store;

const BEARER_PREFIX: &str = "Bearer ";

/// A routed operation: HTTP method plus route template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub method: Method,
    pub path: String,
}

impl Endpoint {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

#[derive(Debug, Clone, Default)]
struct EndpointPolicy {
    anonymous: bool,
    roles: Vec<Role>,
}

/// Per-endpoint access metadata, consulted by [`AccessGuard`] at dispatch time.
///
/// Endpoints absent from the table require authentication and no role.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    endpoints: HashMap<Endpoint, EndpointPolicy>,
}

impl AccessPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip identity resolution entirely.
    pub fn anonymous(mut self, method: Method, path: &str) -> Self {
        self.endpoints.insert(
            Endpoint::new(method, path),
            EndpointPolicy {
                anonymous: true,
                roles: Vec::new(),
            },
        );
        self
    }

    pub fn authenticated(self, method: Method, path: &str) -> Self {
        self.require(method, path, &[])
    }

    /// Caller must hold at least one of `roles`.
    pub fn require(mut self, method: Method, path: &str, roles: &[Role]) -> Self {
        self.endpoints.insert(
            Endpoint::new(method, path),
            EndpointPolicy {
                anonymous: false,
                roles: roles.to_vec(),
            },
        );
        self
    }

    pub fn is_anonymous(&self, endpoint: &Endpoint) -> bool {
        self.endpoints.get(endpoint).is_some_and(|p| p.anonymous)
    }

    pub fn required_roles(&self, endpoint: &Endpoint) -> &[Role] {
        self.endpoints
            .get(endpoint)
            .map(|p| p.roles.as_slice())
            .unwrap_or(&[])
    }
}

/// Authenticated identity attached to a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Caller {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub display_name: String,
    pub roles: RoleSet,
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Caller>()
            .cloned()
            .ok_or(AppError::Unauthenticated(MessageKey::TokenNotProvided))
    }
}

/// Verified token timestamps, attached next to the [`Caller`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenWindow {
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Exempt,
    Authenticated(Caller, TokenWindow),
}

/// Extract the token from an `authorization` header value.
///
/// Only the literal `Bearer ` scheme is accepted; anything else is treated as
/// no credential at all.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let token = header?.strip_prefix(BEARER_PREFIX)?;
    if token.is_empty() || token.contains(char::is_whitespace) {
        return None;
    }
    Some(token)
}

/// Per-request gate: exemption, then identity, then role requirements.
#[derive(Clone)]
pub struct AccessGuard {
    policy: Arc<AccessPolicy>,
    tokens: TokenService,
    store: Arc<dyn Store>,
    audit: AuditLogger,
}

impl AccessGuard {
    pub fn new(policy: AccessPolicy, tokens: TokenService, store: Arc<dyn Store>) -> Self {
        Self {
            policy: Arc::new(policy),
            tokens,
            store,
            audit: AuditLogger::new(),
        }
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    pub async fn check(
        &self,
        endpoint: &Endpoint,
        authorization: Option<&str>,
    ) -> Result<Access, AppError> {
        if self.policy.is_anonymous(endpoint) {
            return Ok(Access::Exempt);
        }
        let route = endpoint.to_string();

        let Some(token) = bearer_token(authorization) else {
            self.audit.auth_failure(&route, "missing bearer token");
            return Err(AppError::Unauthenticated(MessageKey::TokenNotProvided));
        };

        let claims = self.tokens.verify(token).map_err(|_| {
            self.audit.auth_failure(&route, "token rejected");
            AppError::Unauthenticated(MessageKey::TokenNotValid)
        })?;

        let user = self
            .store
            .find_user(claims.sub)
            .await
            .map_err(|e| AppError::internal(MessageKey::UserInternal, e))?
            .ok_or_else(|| {
                self.audit.auth_failure(&route, "subject no longer exists");
                AppError::Unauthenticated(MessageKey::TokenNotValid)
            })?;

        // Roles come from the stored user, not the token, so promotions and
        // demotions apply before the token expires.
        let required = self.policy.required_roles(endpoint);
        if !required.is_empty() && !user.roles.intersects(required) {
            self.audit.role_denied(user.id, &route, required);
            return Err(AppError::Forbidden(MessageKey::RoleForbidden));
        }

        self.audit.auth_success(user.id, &route);
        Ok(Access::Authenticated(
            Caller {
                id: user.id,
                email: user.email,
                username: user.username,
                display_name: user.display_name,
                roles: user.roles,
            },
            TokenWindow {
                iat: claims.iat,
                exp: claims.exp,
            },
        ))
    }
}
