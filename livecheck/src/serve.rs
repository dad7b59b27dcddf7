use std::sync::Arc;

use tokio::signal::unix::SignalKind;
use tokio::signal::unix::signal;

use livecheck_core::config::Config;
use livecheck_core::error::Error;
use livecheck_core::listings;
use livecheck_core::web;

pub async fn main(config: Arc<Config>) {
    let mut sigint = signal(SignalKind::interrupt()).unwrap();
    let mut sigterm = signal(SignalKind::terminate()).unwrap();

    tokio::select! {
        result = serve(config) => {
            match result {
                Ok(_) => (),
                Err(err) => tracing::error!(%err),
            }
        }
        _ = sigint.recv() => {
            tracing::info!("SIGINT received");
        }
        _ = sigterm.recv() => {
            tracing::info!("SIGTERM received");
        }
    }

    tracing::info!("Stopping...");
}

async fn serve(config: Arc<Config>) -> Result<(), Error> {
    let scheduler = config.scheduler()?;

    let status = listings::start(config.clone(), scheduler.clone());

    web::serve(config, scheduler, status).await
}
