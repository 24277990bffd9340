use std::sync::Arc;
use std::time::Duration;

use crate::audit::AuditBuilder;
use crate::stores::AuditStore;
use crate::types::internal::audit::{AuditAction, AuditEntry};

/// Upper bound on a single audit write
pub const AUDIT_WRITE_TIMEOUT: Duration = Duration::from_secs(2);

/// Audit logging entry point
///
/// Writes never fail the caller: store errors and writes exceeding the
/// write timeout are reported through `tracing` and dropped, so a broken or
/// hung audit database cannot block logins or admin work.
#[derive(Debug, Clone)]
pub struct AuditLogger {
    pub audit_store: Arc<AuditStore>,
    write_timeout: Duration,
}

impl AuditLogger {
    pub fn new(audit_store: Arc<AuditStore>) -> Self {
        Self {
            audit_store,
            write_timeout: AUDIT_WRITE_TIMEOUT,
        }
    }

    pub fn with_write_timeout(mut self, write_timeout: Duration) -> Self {
        self.write_timeout = write_timeout;
        self
    }

    /// Start an entry for `action`
    pub fn builder(&self, action: AuditAction) -> AuditBuilder {
        AuditBuilder::new(self.clone(), action)
    }

    /// Record `entry`, swallowing any store failure or timeout
    pub async fn log_action(&self, entry: AuditEntry) {
        let action = entry.action.to_string();

        match tokio::time::timeout(self.write_timeout, self.audit_store.write_entry(entry)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!("Failed to write audit entry {}: {}", action, e),
            Err(_) => tracing::error!(
                "Audit entry {} dropped: write exceeded {:?}",
                action,
                self.write_timeout
            ),
        }
    }
}
