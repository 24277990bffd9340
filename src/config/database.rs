use migration::{AuditMigrator, AuthMigrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};

use crate::config::AuthSettings;
use crate::errors::internal::{DatabaseError, InternalError};

/// Connections to the auth database (users, roles) and the separate audit database
#[derive(Debug, Clone)]
pub struct DatabaseConnections {
    pub auth: DatabaseConnection,
    pub audit: DatabaseConnection,
}

impl DatabaseConnections {
    /// Connect both databases. Does NOT run migrations - call `migrate()` separately.
    pub async fn connect(settings: &AuthSettings) -> Result<Self, InternalError> {
        let auth = connect_database("auth", &settings.database_url).await?;
        let audit = connect_database("audit", &settings.audit_database_url).await?;

        Ok(Self { auth, audit })
    }

    pub async fn migrate(&self) -> Result<(), InternalError> {
        migrate_auth_database(&self.auth).await?;
        migrate_audit_database(&self.audit).await?;

        Ok(())
    }

    /// True when both databases answer a ping
    pub async fn ping(&self) -> bool {
        self.auth.ping().await.is_ok() && self.audit.ping().await.is_ok()
    }
}

async fn connect_database(name: &str, url: &str) -> Result<DatabaseConnection, InternalError> {
    let db = Database::connect(url).await.map_err(|e| {
        InternalError::Database(DatabaseError::Connection {
            database: name.to_string(),
            message: e.to_string(),
        })
    })?;

    tracing::debug!("Connected to {} database", name);

    Ok(db)
}

/// Run pending migrations on the auth database
pub async fn migrate_auth_database(db: &DatabaseConnection) -> Result<(), InternalError> {
    AuthMigrator::up(db, None)
        .await
        .map_err(|e| InternalError::database("run_migrations", e))?;

    tracing::debug!("Auth database migrations completed");

    Ok(())
}

/// Run pending migrations on the audit database
pub async fn migrate_audit_database(audit_db: &DatabaseConnection) -> Result<(), InternalError> {
    AuditMigrator::up(audit_db, None)
        .await
        .map_err(|e| InternalError::database("run_audit_migrations", e))?;

    tracing::debug!("Audit database migrations completed");

    Ok(())
}
