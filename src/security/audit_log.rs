use tracing::{info, warn};
use uuid::Uuid;

use crate::security::roles::Role;

/// Security decisions written to the `audit` tracing target.
///
/// Never receives tokens or passwords.
#[derive(Debug, Clone, Default)]
pub struct AuditLogger;

impl AuditLogger {
    pub fn new() -> Self {
        Self
    }

    pub fn auth_success(&self, user_id: Uuid, endpoint: &str) {
        info!(target: "audit", event = "auth_success", user_id = %user_id, endpoint);
    }

    pub fn auth_failure(&self, endpoint: &str, reason: &str) {
        warn!(target: "audit", event = "auth_failure", endpoint, reason);
    }

    pub fn role_denied(&self, user_id: Uuid, endpoint: &str, required: &[Role]) {
        let required = required.iter().map(Role::as_str).collect::<Vec<_>>().join(",");
        warn!(target: "audit", event = "role_denied", user_id = %user_id, endpoint, required);
    }

    pub fn ownership_denied(&self, user_id: Uuid, resource: &str, resource_id: Uuid) {
        warn!(
            target: "audit",
            event = "ownership_denied",
            user_id = %user_id,
            resource,
            resource_id = %resource_id
        );
    }

    pub fn sign_in_success(&self, user_id: Uuid) {
        info!(target: "audit", event = "sign_in_success", user_id = %user_id);
    }

    pub fn sign_in_failure(&self, reason: &str) {
        warn!(target: "audit", event = "sign_in_failure", reason);
    }

    pub fn user_promoted(&self, user_id: Uuid, role_added: bool, admin_created: bool) {
        info!(
            target: "audit",
            event = "user_promoted",
            user_id = %user_id,
            role_added,
            admin_created
        );
    }

    pub fn user_deleted(&self, user_id: Uuid, by: Uuid) {
        info!(target: "audit", event = "user_deleted", user_id = %user_id, by = %by);
    }
}
