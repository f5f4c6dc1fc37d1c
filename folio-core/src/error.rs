//! Error types for the viewer.
//!
//! Fetch and decode failures abort an open; render and surface failures are
//! scoped to a single page.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to obtain the raw bytes of a document.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid document locator: {0}")]
    InvalidLocator(String),

    #[error("HTTP error! status: {status}")]
    Status { status: u16 },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure to turn fetched bytes into a document handle.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("document has no pages")]
    NoPages,

    #[error("malformed document: {0}")]
    Malformed(String),

    #[error("decoder unavailable: {0}")]
    Backend(String),
}

/// Failure while producing the pixels of one page.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("page {page} is outside 1..={total}")]
    PageOutOfRange { page: u32, total: u32 },

    #[error("raster for page {page} has {actual} bytes, expected {expected}")]
    InvalidRaster {
        page: u32,
        expected: usize,
        actual: usize,
    },

    #[error("render failed: {0}")]
    Backend(String),
}

/// Failure while writing a raster onto the drawing surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("surface is {surface_width}x{surface_height}, raster is {raster_width}x{raster_height}")]
    SizeMismatch {
        surface_width: u32,
        surface_height: u32,
        raster_width: u32,
        raster_height: u32,
    },

    #[error("surface has been released")]
    Released,
}

/// Invalid or unreadable viewer configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors that abort opening a document.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("could not fetch {locator}: {source}")]
    Fetch {
        locator: String,
        #[source]
        source: FetchError,
    },

    #[error("could not decode {locator}: {source}")]
    Decode {
        locator: String,
        #[source]
        source: DecodeError,
    },
}

impl ViewerError {
    /// Human-readable text for the status slot.
    pub fn user_message(&self) -> String {
        match self {
            Self::Fetch { source, .. } => format!("Could not load the PDF: {source}"),
            Self::Decode { source, .. } => format!("Could not open the PDF: {source}"),
        }
    }
}
