// Bootstrap command implementation
// Creates the first super admin during system setup

use std::sync::Arc;

use crate::app_data::AppData;
use crate::coordinators::AdminCoordinator;
use crate::types::internal::context::RequestContext;

/// Create the initial super admin account
///
/// Prints the generated password once; it must be changed at first login.
///
/// # Returns
/// * `Ok(())` - Account created
/// * `Err(...)` - Admin accounts already exist, or a store failure
pub async fn bootstrap_system(app_data: Arc<AppData>, username: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("\n=== Wendessen Admin Bootstrap ===\n");

    let ctx = RequestContext::for_cli("bootstrap");
    let coordinator = AdminCoordinator::new(app_data.clone());

    let result: Result<(), Box<dyn std::error::Error>> = match coordinator.bootstrap(&ctx, username).await {
        Ok((user, password)) => {
            println!("✓ Created super admin '{}' (id {})", user.username, user.id);
            println!("\nInitial password (shown once): {}\n", password);
            println!("The password must be changed at first login.");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    };

    crate::cli::log_cli_session(&app_data, &ctx, "bootstrap", &result).await;
    result
}
