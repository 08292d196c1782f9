//! Galaxy Gripper - GRIPSource server for a Galaxy instance.
//!
//! Serves Galaxy histories, datasets and history/dataset associations to
//! GRIP over gRPC.

use anyhow::{Context, Result};
use clap::Parser;
use galaxy_connect::GalaxyClient;
use galaxy_gripper::logging::init_logging;
use galaxy_gripper::{Catalog, Cli, GripperConfig, GripperService, RowResolver};
use gripper_proto::grip_source_server::GripSourceServer;
use std::sync::Arc;
use tonic::transport::Server;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = GripperConfig::from_cli(Cli::parse())?;
    init_logging(&config)?;

    info!("Galaxy Gripper v{}", galaxy_gripper::VERSION);

    let galaxy = GalaxyClient::builder(config.galaxy_url.as_str(), config.galaxy_key.as_str())
        .page_size(config.page_size)
        .timeout(config.timeout())
        .build()
        .context("Failed to create Galaxy client")?;
    info!("Galaxy: {}", galaxy.base_url());

    let addr = config.listen_addr()?;

    let catalog = Arc::new(Catalog::galaxy());
    for name in catalog.names() {
        info!("  collection {}", name);
    }

    let resolver = RowResolver::new(catalog, Arc::new(galaxy));
    let service = GripperService::new(resolver, config.max_workers);

    info!("Serving GRIPSource on {} ({} workers)", addr, config.max_workers);

    Server::builder()
        .add_service(GripSourceServer::new(service))
        .serve_with_shutdown(addr, async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await
        .context("gRPC server failed")?;

    Ok(())
}
