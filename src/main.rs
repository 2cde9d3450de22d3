// src/main.rs
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use smooth_wrr_balancer::{
    config::{self, ReportFormat},
    metrics::MetricsRegistry,
    report,
    simulation::{build_balancer, Simulation},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("smooth_wrr_balancer=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.yaml".to_string());

    info!("Loading configuration from: {}", config_path);
    let config = config::load_config(&config_path).await?;

    // Initialize metrics
    let metrics_registry = if config.metrics.enabled {
        Some(MetricsRegistry::new()?)
    } else {
        None
    };
    let metrics = metrics_registry.as_ref().map(MetricsRegistry::collector);

    let (endpoints, balancer) = build_balancer(&config.backends);
    info!(
        "Registered {} invokers: {}",
        endpoints.len(),
        endpoints
            .iter()
            .map(|e| e.id.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let simulation = Arc::new(Simulation::new(Arc::new(balancer), &config, metrics));
    let result = simulation.run().await;

    match config.report.format {
        ReportFormat::Table => print!("{}", report::render_table(&result)),
        ReportFormat::Json => println!("{}", report::render_json(&result)?),
    }

    if let Some(registry) = metrics_registry {
        print!("\n{}", registry.gather()?);
    }

    Ok(())
}
