//! Decoded documents and the decoder seam.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{DecodeError, RenderError, ViewerError};
use crate::loader::{DocumentLoader, Locator};

/// RGBA8 pixels of one rendered page.
#[derive(Clone, PartialEq, Eq)]
pub struct PageRaster {
    page: u32,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl PageRaster {
    pub fn new(page: u32, width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, RenderError> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(RenderError::InvalidRaster {
                page,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            page,
            width,
            height,
            pixels,
        })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

// Pixel buffers are far too large to print.
impl fmt::Debug for PageRaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageRaster")
            .field("page", &self.page)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// A decoded multi-page document.
#[async_trait]
pub trait DocumentHandle: Send + Sync + fmt::Debug {
    fn page_count(&self) -> u32;

    /// Render 1-based `page` at `scale`.
    async fn render_page(&self, page: u32, scale: f32) -> Result<PageRaster, RenderError>;
}

/// Turns fetched bytes into a [`DocumentHandle`].
#[async_trait]
pub trait DocumentDecoder: Send + Sync {
    async fn decode(&self, bytes: Vec<u8>) -> Result<Arc<dyn DocumentHandle>, DecodeError>;
}

/// What the host asks to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRequest {
    pub locator: String,
    pub display_title: String,
}

impl OpenRequest {
    pub fn new(locator: impl Into<String>, display_title: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            display_title: display_title.into(),
        }
    }
}

/// A fetched and decoded document, ready to be installed into a session.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub locator: Locator,
    pub title: String,
    pub document: Arc<dyn DocumentHandle>,
}

/// Fetch then decode. Never touches session state.
pub async fn load_document(
    loader: &dyn DocumentLoader,
    decoder: &dyn DocumentDecoder,
    locator: Locator,
    title: String,
) -> Result<LoadedDocument, ViewerError> {
    let bytes = loader
        .fetch(&locator)
        .await
        .map_err(|source| ViewerError::Fetch {
            locator: locator.to_string(),
            source,
        })?;
    debug!(%locator, bytes = bytes.len(), "fetched document");

    let document = decoder
        .decode(bytes)
        .await
        .map_err(|source| ViewerError::Decode {
            locator: locator.to_string(),
            source,
        })?;
    if document.page_count() == 0 {
        return Err(ViewerError::Decode {
            locator: locator.to_string(),
            source: DecodeError::NoPages,
        });
    }
    info!(%locator, pages = document.page_count(), "decoded document");

    Ok(LoadedDocument {
        locator,
        title,
        document,
    })
}
