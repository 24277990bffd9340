use std::sync::Arc;

use clap::Parser;
use poem::listener::TcpListener;
use poem::Server;

use wendessen_admin::api;
use wendessen_admin::cli::{self, Cli, Commands};
use wendessen_admin::config::database::DatabaseConnections;
use wendessen_admin::config::{init_logging, AuthSettings, LoggingConfig, SecretManager, SystemEnvironment};
use wendessen_admin::providers::PermissionCatalog;
use wendessen_admin::AppData;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let env = SystemEnvironment;
    init_logging(&LoggingConfig::from_env(&env))?;

    let cli = Cli::parse();

    let settings = AuthSettings::from_env(&env)?;
    let secret_manager = SecretManager::init(&env)?;
    tracing::debug!("Loaded secrets: {}", secret_manager);

    let catalog = PermissionCatalog::new();
    catalog.validate()?;
    tracing::info!("Permission catalog: {:?}", catalog.summary());

    let connections = DatabaseConnections::connect(&settings).await?;
    connections.migrate().await?;
    tracing::info!("Database migrations completed");

    let bind_address = settings.bind_address.clone();
    let app_data = Arc::new(AppData::init(connections, settings, secret_manager)?);

    match cli.command() {
        Commands::Serve => {
            let app = api::build_app(app_data, &format!("http://{}/api", bind_address));

            tracing::info!("Starting server on http://{}", bind_address);
            tracing::info!("Swagger UI available at http://{}/swagger", bind_address);

            Server::new(TcpListener::bind(bind_address)).run(app).await?;
        }
        command => cli::execute_command(command, app_data).await?,
    }

    Ok(())
}
