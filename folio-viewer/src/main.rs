use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use folio_core::AssetLoader;
use tracing_subscriber::EnvFilter;

mod app;
mod cli;
mod download;
mod renderer;
mod snapshot;

use cli::Args;
use renderer::PdfiumDecoder;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("folio_viewer=debug,folio_core=debug,info")),
        )
        .init();

    let args = Args::parse();
    let config = args.load_config()?;
    let decoder = PdfiumDecoder::new()?;

    if let Some(options) = args.snapshot_options(&config) {
        let runtime = tokio::runtime::Runtime::new()?;
        return runtime.block_on(snapshot::run(config, &decoder, options));
    }

    let loader = AssetLoader::new(config.fetch_timeout())?;
    let initial = args.open_request(&config);
    app::run(config, loader, Arc::new(decoder), initial)
}
