use std::fmt;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use folio_core::{DecodeError, DocumentDecoder, DocumentHandle, PageRaster, RenderError};
use parking_lot::Mutex;
use pdfium_render::prelude::*;

/// Decodes PDFs with PDFium.
pub struct PdfiumDecoder {
    pdfium: &'static Pdfium,
}

impl PdfiumDecoder {
    /// Bind PDFium from the executable's directory, then the working
    /// directory, then the system library path.
    pub fn new() -> Result<Self> {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(Path::to_path_buf));

        let bindings = match exe_dir
            .and_then(|dir| Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&dir)).ok())
        {
            Some(bindings) => bindings,
            None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| Pdfium::bind_to_system_library())
                .context("Failed to bind to PDFium library. Please install PDFium or download the library from https://github.com/bblanchon/pdfium-binaries")?,
        };

        // Documents borrow the library, so it lives as long as the process.
        let pdfium: &'static Pdfium = Box::leak(Box::new(Pdfium::new(bindings)));
        Ok(Self { pdfium })
    }
}

#[async_trait]
impl DocumentDecoder for PdfiumDecoder {
    async fn decode(&self, bytes: Vec<u8>) -> Result<Arc<dyn DocumentHandle>, DecodeError> {
        let pdfium = self.pdfium;
        let document = tokio::task::spawn_blocking(move || decode_blocking(pdfium, bytes))
            .await
            .map_err(|e| DecodeError::Backend(format!("decode task failed: {e}")))??;
        Ok(Arc::new(document))
    }
}

fn decode_blocking(pdfium: &'static Pdfium, bytes: Vec<u8>) -> Result<PdfiumDocument, DecodeError> {
    let document = pdfium
        .load_pdf_from_byte_vec(bytes, None)
        .map_err(|e| DecodeError::Malformed(e.to_string()))?;
    let page_count = u32::from(document.pages().len());

    Ok(PdfiumDocument {
        inner: Arc::new(Mutex::new(document)),
        page_count,
    })
}

pub struct PdfiumDocument {
    inner: Arc<Mutex<PdfDocument<'static>>>,
    page_count: u32,
}

// Manual Debug impl since the inner document contains pdfium types
impl fmt::Debug for PdfiumDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PdfiumDocument")
            .field("page_count", &self.page_count)
            .finish()
    }
}

#[async_trait]
impl DocumentHandle for PdfiumDocument {
    fn page_count(&self) -> u32 {
        self.page_count
    }

    async fn render_page(&self, page: u32, scale: f32) -> Result<PageRaster, RenderError> {
        if page == 0 || page > self.page_count {
            return Err(RenderError::PageOutOfRange {
                page,
                total: self.page_count,
            });
        }

        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || render_blocking(&inner.lock(), page, scale))
            .await
            .map_err(|e| RenderError::Backend(format!("render task failed: {e}")))?
    }
}

fn render_blocking(document: &PdfDocument<'static>, page: u32, scale: f32) -> Result<PageRaster, RenderError> {
    let index = u16::try_from(page - 1).map_err(|_| RenderError::Backend(format!("page {page} exceeds PDFium's index range")))?;
    let pdf_page = document
        .pages()
        .get(index)
        .map_err(|e| RenderError::Backend(e.to_string()))?;

    let (render_width, render_height) = target_size(pdf_page.width().value, pdf_page.height().value, scale);
    let render_config = PdfRenderConfig::new()
        .set_target_width(render_width)
        .set_maximum_height(render_height);

    let bitmap = pdf_page
        .render_with_config(&render_config)
        .map_err(|e| RenderError::Backend(e.to_string()))?;

    PageRaster::new(
        page,
        bitmap.width() as u32,
        bitmap.height() as u32,
        bitmap.as_rgba_bytes().to_vec(),
    )
}

/// Pixel size of a page of `width` x `height` points drawn at `scale`.
fn target_size(width: f32, height: f32, scale: f32) -> (i32, i32) {
    let px = |points: f32| ((points * scale).round() as i32).max(1);
    (px(width), px(height))
}
