use crm_backend::{
    api,
    config::{self, database},
    core::seed,
    errors::Result,
    jobs,
};
use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars may also be set externally
    dotenv().ok();

    // 3. Load the application configuration
    let app_config = config::load_app_configuration()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    // 4. Connect and make sure the schema exists
    let database_url = database::get_database_url(&app_config);
    let db = database::create_connection(&database_url)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Demo data, only when asked for
    if app_config.database.seed_demo_data {
        seed::seed_demo_data(&db)
            .await
            .inspect_err(|e| error!("Failed to seed demo data: {}", e))?;
    }

    // 6. Background jobs
    let handles = jobs::spawn_scheduled(&db, &app_config.jobs);
    info!("Started {} scheduled jobs", handles.len());

    // 7. Serve until Ctrl-C
    api::server::serve(&app_config.server.bind_address, db).await?;

    for handle in handles {
        handle.abort();
    }
    Ok(())
}
