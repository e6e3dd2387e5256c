use env_logger::Env;
use log::{error, info, warn};
use platitude_relay::client::ResourceClient;
use platitude_relay::config::Config;
use platitude_relay::webhook;
use std::sync::Arc;

#[macro_use]
extern crate failure;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    info!("Starting platitude-relay");

    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
    info!("Exiting main");
}

async fn run() -> Result<(), failure::Error> {
    let config = Config::from_env()?;
    info!("Using Platitude at {}", config.platitude_url);
    let client = ResourceClient::new(&config)
        .map(Arc::new)
        .map_err(|e| format_err!("Unable to build HTTP client: {}", e))?;

    match client.health().await {
        Ok(()) => info!("Platitude is healthy"),
        Err(e) => warn!("Platitude health check failed: {}", e),
    }

    let server_task = tokio::spawn(webhook::run(config.listen_addr, client));
    tokio::select! {
        result = server_task => {
            result.map_err(|e| format_err!("Webhook task failed: {}", e))?;
        }
        _ = tokio::signal::ctrl_c() => info!("Interrupted"),
    }
    Ok(())
}
