use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, QuerySelect, Set};

use crate::errors::internal::AuditError;
use crate::errors::InternalError;
use crate::types::db::audit_log;
use crate::types::internal::audit::AuditEntry;

/// Repository for audit log storage (separate audit database)
#[derive(Clone)]
pub struct AuditStore {
    db: DatabaseConnection,
}

impl AuditStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Insert one audit entry
    ///
    /// # Errors
    ///
    /// Returns `InternalError` if serialization or the insert fails. Callers on
    /// request paths go through `AuditLogger`, which swallows these.
    pub async fn write_entry(&self, entry: AuditEntry) -> Result<(), InternalError> {
        let details = entry
            .details
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| AuditError::DetailsSerialization(e.to_string()))?;

        let model = audit_log::ActiveModel {
            user_id: Set(entry.user_id),
            username: Set(entry.username),
            action: Set(entry.action.to_string()),
            resource_type: Set(entry.resource_type),
            resource_id: Set(entry.resource_id),
            details: Set(details),
            ip_address: Set(entry.ip_address),
            user_agent: Set(entry.user_agent),
            created_at: Set(Utc::now().to_rfc3339()),
            ..Default::default()
        };

        model
            .insert(&self.db)
            .await
            .map_err(|e| AuditError::WriteFailed(e.to_string()))?;

        Ok(())
    }

    /// Most recent entries first
    pub async fn recent_entries(&self, limit: u64) -> Result<Vec<audit_log::Model>, InternalError> {
        audit_log::Entity::find()
            .order_by_desc(audit_log::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("recent_audit_entries", e))
    }
}

impl std::fmt::Debug for AuditStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditStore").field("db", &"<connection>").finish()
    }
}
