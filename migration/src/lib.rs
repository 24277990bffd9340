pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_roles;
mod m20250301_000002_create_admin_users;
mod m20250301_000003_create_audit_logs;

/// Migrations for the auth database (roles, admin users)
pub struct AuthMigrator;

#[async_trait::async_trait]
impl MigratorTrait for AuthMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_roles::Migration),
            Box::new(m20250301_000002_create_admin_users::Migration),
        ]
    }
}

/// Migrations for the audit database
pub struct AuditMigrator;

#[async_trait::async_trait]
impl MigratorTrait for AuditMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20250301_000003_create_audit_logs::Migration)]
    }
}
