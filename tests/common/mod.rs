// Common test utilities for integration tests
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use migration::{AuditMigrator, AuthMigrator, MigratorTrait};
use poem::test::{TestClient, TestResponse};
use poem::Endpoint;
use sea_orm::{Database, DatabaseConnection};
use serde::de::DeserializeOwned;
use serde_json::json;

use wendessen_admin::api::build_app;
use wendessen_admin::config::database::DatabaseConnections;
use wendessen_admin::config::{AppEnvironment, AuthSettings, HashingParams, PasswordPolicy, SecretManager};
use wendessen_admin::types::internal::{AdminUser, NewAdminUser, PermissionKey, SESSION_COOKIE_NAME};
use wendessen_admin::AppData;

pub const TEST_SESSION_SECRET: &str = "integration-session-secret-of-32-chars";
pub const TEST_PASSWORD_PEPPER: &str = "integration-pepper";

/// Creates a test auth database with migrations applied
pub async fn setup_test_auth_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    AuthMigrator::up(&db, None)
        .await
        .expect("Failed to run auth migrations");

    db
}

/// Creates a test audit database with migrations applied
pub async fn setup_test_audit_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create audit database");

    AuditMigrator::up(&db, None)
        .await
        .expect("Failed to run audit migrations");

    db
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

/// AppData over the given connections
pub fn app_with(connections: DatabaseConnections) -> Arc<AppData> {
    let secrets = SecretManager::from_values(TEST_SESSION_SECRET, TEST_PASSWORD_PEPPER);
    Arc::new(AppData::init(connections, test_settings(), secrets).expect("Failed to initialize AppData"))
}

/// AppData over fresh, migrated in-memory databases
pub async fn setup_test_app() -> Arc<AppData> {
    app_with(DatabaseConnections {
        auth: setup_test_auth_db().await,
        audit: setup_test_audit_db().await,
    })
}

/// Inserts a user straight into the store, bypassing the password policy
pub async fn seed_user(
    app: &AppData,
    username: &str,
    password: &str,
    role: Option<&str>,
    custom: &[&str],
    verein_id: Option<i32>,
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
            verein_id,
            must_change_password,
        })
        .await
        .expect("Failed to create test user")
}

/// Test client over the full HTTP application
pub fn client(app: Arc<AppData>) -> TestClient<impl Endpoint> {
    TestClient::new(build_app(app, "http://localhost/api"))
}

/// Value of the `admin-session` Set-Cookie header, if the response carries one
pub fn session_cookie(resp: &TestResponse) -> Option<String> {
    let prefix = format!("{}=", SESSION_COOKIE_NAME);

    resp.0
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with(&prefix))
        .map(|value| value.to_string())
}

/// Token part of a Set-Cookie header value
pub fn token_of(set_cookie: &str) -> String {
    set_cookie
        .split(';')
        .next()
        .and_then(|pair| pair.split_once('='))
        .map(|(_, value)| value.to_string())
        .unwrap_or_default()
}

/// `Cookie` request header for a session token
pub fn cookie_header(token: &str) -> String {
    format!("{}={}", SESSION_COOKIE_NAME, token)
}

/// Deserializes the response body
pub async fn read_json<T: DeserializeOwned>(resp: TestResponse) -> T {
    resp.0
        .into_body()
        .into_json()
        .await
        .expect("Response body is not the expected JSON")
}

/// Machine-readable `error` code of an error response
pub async fn error_code(resp: TestResponse) -> String {
    let body: serde_json::Value = read_json(resp).await;
    body["error"].as_str().unwrap_or_default().to_string()
}

/// Logs in through the API and returns the session token
pub async fn login<E: Endpoint>(cli: &TestClient<E>, username: &str, password: &str) -> String {
    let resp = cli
        .post("/api/auth/login")
        .body_json(&json!({ "username": username, "password": password }))
        .send()
        .await;
    resp.assert_status_is_ok();

    let set_cookie = session_cookie(&resp).expect("login must set the session cookie");
    token_of(&set_cookie)
}

/// Helper to manage environment variables in tests
///
/// Cleans up specified environment variables on creation and drop,
/// ensuring test isolation when dealing with global environment state.
pub struct EnvGuard {
    vars: Vec<String>,
}

impl EnvGuard {
    pub fn new(vars: Vec<&str>) -> Self {
        // Clean up before setting new values
        for var in &vars {
            unsafe {
                std::env::remove_var(var);
            }
        }
        Self {
            vars: vars.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for var in &self.vars {
            unsafe {
                std::env::remove_var(var);
            }
        }
    }
}

/// Global mutex for tests that modify environment variables
///
/// Environment variables are process-global, so tests that modify them
/// must run serially to avoid race conditions.
pub static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());
