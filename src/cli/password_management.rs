use std::sync::Arc;

use crate::app_data::AppData;
use crate::coordinators::AdminCoordinator;
use crate::types::internal::context::RequestContext;

/// Operator password reset for a locked-out admin
///
/// Sets a generated password and the must-change flag, then prints the
/// password once.
pub async fn reset_password(app_data: Arc<AppData>, username: &str) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = RequestContext::for_cli("reset-password");
    let coordinator = AdminCoordinator::new(app_data.clone());

    let result: Result<(), Box<dyn std::error::Error>> =
        match coordinator.reset_password_by_username(&ctx, username).await {
            Ok(password) => {
                println!("✓ Password reset for '{}'", username);
                println!("\nNew password (shown once): {}\n", password);
                Ok(())
            }
            Err(e) => Err(Box::new(e)),
        };

    crate::cli::log_cli_session(&app_data, &ctx, "reset-password", &result).await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::{create_test_user, setup_test_app};

    #[tokio::test]
    async fn test_reset_password_sets_must_change_and_audits() {
        let app = setup_test_app().await;
        create_test_user(&app, "anna", "Secret123", Some("redakteur"), &[], false).await;

        reset_password(app.clone(), "anna").await.unwrap();

        let user = app.credential_store.find_user_by_username("anna").await.unwrap().unwrap();
        assert!(user.must_change_password);

        let entries = app.audit_store.recent_entries(5).await.unwrap();
        assert_eq!(entries[0].action, "cli_session");
        assert_eq!(entries[1].action, "password_reset");
    }

    #[tokio::test]
    async fn test_reset_password_unknown_user_fails() {
        let app = setup_test_app().await;

        assert!(reset_password(app.clone(), "ghost").await.is_err());
    }
}
