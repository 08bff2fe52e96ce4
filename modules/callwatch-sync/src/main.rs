use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use callwatch_core::{Config, MemoryCallStore};
use callwatch_sync::elevenlabs::ElevenLabsFeed;
use callwatch_sync::service::SyncService;
use callwatch_sync::voximplant::VoximplantFeed;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("callwatch=info".parse()?))
        .init();

    info!("Callwatch sync service starting...");

    // Load config
    let config = Config::from_env();
    config.log_redacted();

    let store = Arc::new(MemoryCallStore::new());
    let elevenlabs = Arc::new(ElevenLabsFeed::new(config.eleven_labs_api_key.clone()));
    let voximplant = Arc::new(VoximplantFeed::new(
        config.voximplant_account_id.clone(),
        config.voximplant_api_key.clone(),
    ));
    let service = SyncService::new(store, elevenlabs, voximplant, config.match_window_seconds);

    let interval = Duration::from_secs(config.sync_interval_minutes * 60);
    info!(
        interval_minutes = config.sync_interval_minutes,
        "Starting sync interval loop"
    );

    loop {
        service.sync_all().await;
        tokio::time::sleep(interval).await;
    }
}
