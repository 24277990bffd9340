use serde::Serialize;
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};

use crate::audit::AuditLogger;
use crate::types::internal::audit::{AuditAction, AuditEntry};
use crate::types::internal::context::RequestContext;
use crate::types::internal::AdminUser;

/// Fluent builder for audit entries
///
/// # Example
/// ```ignore
/// app_data.audit_logger
///     .builder(AuditAction::PasswordReset)
///     .with_context(ctx)
///     .resource("admin_user", target.id)
///     .add_field("generated", true)
///     .emit()
///     .await;
/// ```
pub struct AuditBuilder {
    logger: AuditLogger,
    entry: AuditEntry,
    details: Map<String, Value>,
}

impl AuditBuilder {
    pub fn new(logger: AuditLogger, action: AuditAction) -> Self {
        Self {
            logger,
            entry: AuditEntry::new(action, "session"),
            details: Map::new(),
        }
    }

    /// Populate actor and client fields from the request context
    ///
    /// - caller id/username -> `user_id` / `username`
    /// - `ip_address`, `user_agent` copied as-is
    /// - `request_id` and `source` go into the details JSON
    pub fn with_context(mut self, ctx: &RequestContext) -> Self {
        if let Some(caller) = ctx.caller() {
            self.entry.user_id = Some(caller.id());
            self.entry.username = Some(caller.username().to_string());
        }
        self.entry.ip_address = ctx.ip_address.map(|ip| ip.to_string());
        self.entry.user_agent = ctx.user_agent.clone();

        self.details.insert("request_id".to_string(), json!(ctx.request_id.to_string()));
        self.details.insert("source".to_string(), json!(ctx.source.to_string()));
        self
    }

    /// Set the acting user explicitly (login, where the context has no caller yet)
    pub fn actor(mut self, user: &AdminUser) -> Self {
        self.entry.user_id = Some(user.id);
        self.entry.username = Some(user.username.clone());
        self
    }

    pub fn resource(mut self, resource_type: impl Into<String>, resource_id: impl ToString) -> Self {
        self.entry.resource_type = resource_type.into();
        self.entry.resource_id = Some(resource_id.to_string());
        self
    }

    /// Add an arbitrary field to the details JSON
    pub fn add_field(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.details.insert(key.into(), json_value);
        }
        self
    }

    /// Add a field as its SHA-256 hash
    ///
    /// Same input always yields the same hash, so entries can be correlated
    /// without storing the value (e.g. usernames typed at a failed login).
    pub fn add_sensitive(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(json_value) = serde_json::to_value(&value) {
            let hash = Sha256::digest(json_value.to_string().as_bytes());
            self.details.insert(key.into(), json!(format!("sha256:{:x}", hash)));
        }
        self
    }

    pub fn build(self) -> AuditEntry {
        let mut entry = self.entry;
        if !self.details.is_empty() {
            entry.details = Some(Value::Object(self.details));
        }
        entry
    }

    /// Build and hand the entry to the logger; never fails
    pub async fn emit(self) {
        let logger = self.logger.clone();
        logger.log_action(self.build()).await;
    }
}
