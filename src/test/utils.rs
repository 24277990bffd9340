// Test utilities shared across unit tests
// Only compiled when running tests

use std::sync::Arc;
use std::time::Duration;

use migration::{AuditMigrator, AuthMigrator, MigratorTrait};
use sea_orm::Database;

use crate::app_data::AppData;
use crate::config::database::DatabaseConnections;
use crate::config::{AppEnvironment, AuthSettings, HashingParams, PasswordPolicy, SecretManager};
use crate::types::internal::context::RequestContext;
use crate::types::internal::{AdminUser, CurrentUser, NewAdminUser, PermissionKey, Session};

pub const TEST_SESSION_SECRET: &str = "test-session-secret-at-least-32-characters";
pub const TEST_PASSWORD_PEPPER: &str = "test-pepper-for-unit-tests";

/// Creates both in-memory databases with migrations applied
pub async fn setup_test_databases() -> DatabaseConnections {
    let auth = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    AuthMigrator::up(&auth, None)
        .await
        .expect("Failed to run auth migrations");

    let audit = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create audit database");

    AuditMigrator::up(&audit, None)
        .await
        .expect("Failed to run audit migrations");

    DatabaseConnections { auth, audit }
}

/// Settings with cheap hashing and no failed-login delay
pub fn test_settings() -> AuthSettings {
    AuthSettings {
        database_url: "sqlite::memory:".to_string(),
        audit_database_url: "sqlite::memory:".to_string(),
        bind_address: "127.0.0.1:0".to_string(),
        environment: AppEnvironment::Development,
        session_max_age: Duration::from_secs(7 * 24 * 60 * 60),
        password_policy: PasswordPolicy::default(),
        hashing: HashingParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        },
        login_failure_delay: Duration::ZERO,
    }
}

/// Full AppData over fresh in-memory databases
pub async fn setup_test_app() -> Arc<AppData> {
    let connections = setup_test_databases().await;
    let secrets = SecretManager::from_values(TEST_SESSION_SECRET, TEST_PASSWORD_PEPPER);

    Arc::new(AppData::init(connections, test_settings(), secrets).expect("Failed to initialize AppData"))
}

/// Inserts a user directly through the credential store
///
/// `role` is a role name from the seed data; `custom` entries must be valid keys.
pub async fn create_test_user(
    app: &AppData,
    username: &str,
    password: &str,
    role: Option<&str>,
    custom: &[&str],
    must_change_password: bool,
) -> AdminUser {
    let role_id = match role {
        Some(name) => Some(
            app.credential_store
                .find_role_by_name(name)
                .await
                .expect("Failed to look up role")
                .expect("Role not seeded")
                .id,
        ),
        None => None,
    };

    let password_hash = app
        .providers
        .crypto_provider
        .hash_password(password)
        .expect("Failed to hash password");

    app.credential_store
        .create_user(NewAdminUser {
            username: username.to_string(),
            password_hash,
            role_id,
            custom_permissions: custom
                .iter()
                .map(|key| PermissionKey::parse(key).expect("Invalid permission key"))
                .collect(),
            verein_id: None,
            must_change_password,
        })
        .await
        .expect("Failed to create test user")
}

/// API-style context whose caller is `user`, as resolved from a fresh session
pub async fn context_for(app: &AppData, user: &AdminUser) -> RequestContext {
    let live = app
        .credential_store
        .find_user_by_id(user.id)
        .await
        .expect("Failed to load user")
        .expect("User not found");
    let session = Session::for_user(&live, chrono::Utc::now().timestamp_millis());

    RequestContext::for_system("test").with_caller(CurrentUser::new(live, session))
}
