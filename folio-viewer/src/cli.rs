use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use folio_core::{OpenRequest, ViewerConfig};

use crate::snapshot::SnapshotOptions;

#[derive(Debug, Parser)]
#[command(name = "folio-viewer", version, about = "View portfolio project PDFs")]
pub struct Args {
    /// Document to open on startup: a URL, a path, or with --asset a file
    /// name under the configured asset prefix
    pub locator: Option<String>,

    /// Title shown above the document
    #[arg(long)]
    pub title: Option<String>,

    /// Resolve LOCATOR under the asset prefix (assets/pdf by default)
    #[arg(long)]
    pub asset: bool,

    /// JSON viewer configuration
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Render headless and write the page to this PNG instead of opening a window
    #[arg(long, value_name = "PNG", requires = "locator")]
    pub snapshot: Option<PathBuf>,

    /// Page to snapshot
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Zoom steps to apply before the snapshot; negative zooms out
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub zoom_steps: i32,
}

impl Args {
    pub fn load_config(&self) -> Result<ViewerConfig> {
        match &self.config {
            Some(path) => ViewerConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display())),
            None => Ok(ViewerConfig::default()),
        }
    }

    pub fn open_request(&self, config: &ViewerConfig) -> Option<OpenRequest> {
        let raw = self.locator.as_deref()?;
        let locator = if self.asset {
            config.asset_locator(raw)
        } else {
            raw.to_string()
        };
        let title = self
            .title
            .clone()
            .unwrap_or_else(|| title_from_locator(&locator));
        Some(OpenRequest::new(locator, title))
    }

    pub fn snapshot_options(&self, config: &ViewerConfig) -> Option<SnapshotOptions> {
        Some(SnapshotOptions {
            output: self.snapshot.clone()?,
            request: self.open_request(config)?,
            page: self.page,
            zoom_steps: self.zoom_steps,
        })
    }
}

/// `assets/pdf/final-report.pdf` becomes `final-report`.
pub fn title_from_locator(locator: &str) -> String {
    let name = locator
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(locator);
    let stem = name.strip_suffix(".pdf").unwrap_or(name);
    if stem.is_empty() {
        "Document".to_string()
    } else {
        stem.to_string()
    }
}
