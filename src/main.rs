use std::path::Path;

use dotenv::dotenv;
use poise::serenity_prelude as serenity;
use tracing::{error, info};

use gachapon::store::Store;
use gachapon::{build_data, framework_initialize, gateway_intents, Error};

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let token = std::env::var("DISCORD_TOKEN").map_err(|_| "DISCORD_TOKEN is not set")?;
    let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string());

    let store = Store::open(Path::new(&data_dir))?;
    info!("store opened at {data_dir}");
    let data = build_data(store);
    let store_handle = data.store.clone();

    let framework = framework_initialize(data);
    let mut client = serenity::ClientBuilder::new(&token, gateway_intents())
        .framework(framework)
        .await?;

    // Flush the action log and snapshot the store on ctrl-c, then take the
    // gateway down.
    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        info!("shutting down");
        {
            let store = store_handle.lock().await;
            if let Err(e) = store.save_snapshot() {
                error!("snapshot on shutdown failed: {e}");
            }
            store.shutdown();
        }
        shard_manager.shutdown_all().await;
    });

    client.start().await?;
    Ok(())
}
