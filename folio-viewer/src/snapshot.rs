//! Headless rendering: open a document, move to a page, write it as PNG.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use folio_core::{
    AssetLoader, DocumentDecoder, DocumentLoader, OpenRequest, PixelSurface, StatusMessage,
    ViewerConfig, ViewerSession,
};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotOptions {
    pub request: OpenRequest,
    pub page: u32,
    pub zoom_steps: i32,
    pub output: PathBuf,
}

pub async fn run(config: ViewerConfig, decoder: &dyn DocumentDecoder, options: SnapshotOptions) -> Result<()> {
    let loader = AssetLoader::new(config.fetch_timeout())?;
    render_to_png(config, &loader, decoder, options).await
}

pub async fn render_to_png(
    config: ViewerConfig,
    loader: &dyn DocumentLoader,
    decoder: &dyn DocumentDecoder,
    options: SnapshotOptions,
) -> Result<()> {
    let mut session = ViewerSession::new(config, PixelSurface::new());
    let job = session.open(loader, decoder, options.request).await?;
    session.settle(job).await;

    if options.page != session.current_page() {
        let total = session.page_count().unwrap_or(0);
        let job = session
            .go_to_page(options.page)
            .with_context(|| format!("page {} is outside 1..={total}", options.page))?;
        session.settle(job).await;
    }

    for _ in 0..options.zoom_steps.unsigned_abs() {
        let job = if options.zoom_steps > 0 {
            session.zoom_in()
        } else {
            session.zoom_out()
        };
        match job {
            Some(job) => session.settle(job).await,
            None => break,
        }
    }

    if let StatusMessage::Error(message) = session.message() {
        bail!("{message}");
    }
    let (width, height, pixels) = session.surface().frame().context("nothing was drawn")?;
    image::save_buffer(&options.output, pixels, width, height, image::ColorType::Rgba8)
        .with_context(|| format!("Failed to write {}", options.output.display()))?;

    let status = session.status();
    info!(
        output = %options.output.display(),
        page = session.current_page(),
        total = status.total_pages.unwrap_or(0),
        zoom = %status.zoom_label(),
        "snapshot written"
    );
    Ok(())
}
