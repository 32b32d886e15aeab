use mimalloc::MiMalloc;
use mockdb::Database;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = &mockdb::config::CONFIG;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    let plugin = mockdb::Mockdb::sanitized();
    info!(
        plugin_type = plugin.type_name(),
        verify_connection = cfg.verify_connection,
        keys = cfg.connection.len(),
        "starting plugin self-check"
    );

    let result = plugin
        .initialize(cfg.connection.clone(), cfg.verify_connection)
        .await;
    let lifecycle = plugin.inner().lifecycle().await;
    plugin.close().await?;

    match result {
        Ok(saved) => {
            info!(?lifecycle, persisted_keys = saved.len(), "plugin initialized");
            Ok(())
        }
        Err(e) => {
            warn!(kind = ?e.kind(), error = %e, "plugin initialization failed");
            Err(e.into())
        }
    }
}
