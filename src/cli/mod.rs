// CLI module for administrative operations requiring server access

pub mod bootstrap;
pub mod password_management;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::app_data::AppData;
use crate::types::internal::audit::AuditAction;
use crate::types::internal::context::RequestContext;

/// Wendessen admin back-office server and operator CLI
#[derive(Parser)]
#[command(name = "wendessen-admin")]
#[command(about = "Wendessen admin authentication backend", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run migrations and start the HTTP server (default)
    Serve,

    /// Create the initial super admin with a generated password
    Bootstrap {
        #[arg(long)]
        username: String,
    },

    /// Set a generated password and force a change on next login
    ResetPassword {
        #[arg(long)]
        username: String,
    },
}

impl Cli {
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve)
    }
}

/// Execute an operator command
///
/// `Serve` is handled by main; everything else lands here.
pub async fn execute_command(
    command: Commands,
    app_data: Arc<AppData>,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Serve => Ok(()),
        Commands::Bootstrap { username } => bootstrap::bootstrap_system(app_data, &username).await,
        Commands::ResetPassword { username } => {
            password_management::reset_password(app_data, &username).await
        }
    }
}

/// Audit the start and outcome of a CLI command
pub(crate) async fn log_cli_session(
    app_data: &AppData,
    ctx: &RequestContext,
    command_name: &str,
    result: &Result<(), Box<dyn std::error::Error>>,
) {
    app_data
        .audit_logger
        .builder(AuditAction::Custom("cli_session".to_string()))
        .with_context(ctx)
        .resource("cli", command_name)
        .add_field("success", result.is_ok())
        .add_field("error", result.as_ref().err().map(|e| e.to_string()))
        .emit()
        .await;
}
