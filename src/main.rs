use clap::Parser;

use adforge::core::config::AppConfig;
use adforge::core::logging;
use adforge::metrics::{self, DummyAnalytics};
use adforge::state::AppState;

/// Generate a review-grounded advertisement for a product.
#[derive(Parser)]
#[command(name = "adforge", version)]
struct Cli {
    /// Product to advertise.
    product: String,

    /// Regenerate even if a valid cached ad exists.
    #[arg(long)]
    force: bool,

    /// Skip search-and-scrape ingestion and generate from already stored
    /// documents.
    #[arg(long)]
    skip_ingest: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::from_env();
    logging::init(&config.log_dir);

    let state = AppState::initialize(config);

    if !cli.skip_ingest {
        let report = state.ingestor.ingest(&cli.product).await;
        if report.documents_stored == 0 {
            tracing::warn!("nothing ingested, ad will rely on previously stored reviews");
        }
    }

    let ad = state.generator.generate(&cli.product, cli.force).await?;
    tracing::info!(provenance = ?ad.provenance, "ad ready");

    println!("{}", ad.text);

    metrics::report(&DummyAnalytics, &cli.product);

    Ok(())
}
