use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use nomina_engine::api::{AppState, create_router};
use nomina_engine::config::{ConfigLoader, ServerSettings};
use nomina_engine::payroll::{PayrollEngine, Repositories};
use nomina_engine::storage::InMemoryStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let settings = ServerSettings::from_env();
    let loader = ConfigLoader::load(&settings.config_dir)?;
    let jurisdiction = loader.metadata().code.clone();
    let utc_offset = loader
        .metadata()
        .utc_offset()
        .ok_or("jurisdiction utc_offset_hours out of range")?;
    info!(
        jurisdiction = %jurisdiction,
        rule_sets = loader.rule_sets().len(),
        utc_offset = %utc_offset,
        config_dir = %settings.config_dir.display(),
        "Loaded jurisdiction configuration"
    );

    let store = match &settings.roster_path {
        Some(path) => {
            let roster = ConfigLoader::load_roster(path)?;
            info!(
                employees = roster.employees.len(),
                roster = %path.display(),
                "Seeded store from roster"
            );
            InMemoryStore::from_roster(roster)
        }
        None => {
            warn!("NOMINA_ROSTER not set, starting with an empty store");
            InMemoryStore::new()
        }
    };

    let repos = Repositories::in_memory(loader, Arc::new(store));
    let engine = PayrollEngine::new(repos, jurisdiction).with_utc_offset(utc_offset);
    let app = create_router(AppState::new(engine));

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    info!(addr = %settings.bind_addr, "Server starting...");
    axum::serve(listener, app).await?;

    Ok(())
}
