#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use folio_core::{
    DecodeError, DocumentDecoder, DocumentHandle, DocumentLoader, FetchError, Locator, PageRaster,
    PixelSurface, RenderError, RenderOutcome, RenderJob, ViewerConfig, ViewerSession,
};
use tokio::sync::Semaphore;

/// Shared record of every render a fake document performed.
#[derive(Debug, Default)]
pub struct RenderLog {
    rendered: Mutex<Vec<(u32, u32)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl RenderLog {
    /// Rendered page numbers, in completion order.
    pub fn pages(&self) -> Vec<u32> {
        self.rendered.lock().unwrap().iter().map(|(page, _)| *page).collect()
    }

    /// `(page, zoom percent)` pairs, in completion order.
    pub fn renders(&self) -> Vec<(u32, u32)> {
        self.rendered.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

/// Page `n` renders as a `10s x 14s` raster filled with byte `n`.
pub fn raster_for(page: u32, scale: f32) -> PageRaster {
    let width = (10.0 * scale).round() as u32;
    let height = (14.0 * scale).round() as u32;
    PageRaster::new(page, width, height, vec![page as u8; (width * height * 4) as usize]).unwrap()
}

#[derive(Debug)]
pub struct FakeDocument {
    pages: u32,
    fail_on: Option<u32>,
    gate: Option<Arc<Semaphore>>,
    log: Arc<RenderLog>,
}

impl FakeDocument {
    pub fn new(pages: u32) -> Self {
        Self {
            pages,
            fail_on: None,
            gate: None,
            log: Arc::default(),
        }
    }
}

#[async_trait]
impl DocumentHandle for FakeDocument {
    fn page_count(&self) -> u32 {
        self.pages
    }

    async fn render_page(&self, page: u32, scale: f32) -> Result<PageRaster, RenderError> {
        let now = self.log.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.log.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| RenderError::Backend(e.to_string()))?
                .forget();
        }

        self.log.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.log
            .rendered
            .lock()
            .unwrap()
            .push((page, (scale * 100.0).round() as u32));

        if self.fail_on == Some(page) {
            return Err(RenderError::Backend(format!("page {page} is corrupt")));
        }
        Ok(raster_for(page, scale))
    }
}

/// Decodes `pages:N` or `pages:N;fail:M` into a [`FakeDocument`].
#[derive(Debug, Default)]
pub struct FakeDecoder {
    gate: Option<Arc<Semaphore>>,
    log: Arc<RenderLog>,
}

impl FakeDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every render waits for one permit from `gate`.
    pub fn gated(gate: Arc<Semaphore>) -> Self {
        Self {
            gate: Some(gate),
            log: Arc::default(),
        }
    }

    pub fn log(&self) -> Arc<RenderLog> {
        Arc::clone(&self.log)
    }
}

#[async_trait]
impl DocumentDecoder for FakeDecoder {
    async fn decode(&self, bytes: Vec<u8>) -> Result<Arc<dyn DocumentHandle>, DecodeError> {
        let text = String::from_utf8(bytes).map_err(|e| DecodeError::Malformed(e.to_string()))?;
        let mut pages = None;
        let mut fail_on = None;
        for part in text.split(';') {
            match part.split_once(':') {
                Some(("pages", n)) => pages = n.parse().ok(),
                Some(("fail", n)) => fail_on = n.parse().ok(),
                _ => return Err(DecodeError::Malformed(format!("unexpected {part:?}"))),
            }
        }
        let pages = pages.ok_or_else(|| DecodeError::Malformed("no page count".to_string()))?;

        Ok(Arc::new(FakeDocument {
            pages,
            fail_on,
            gate: self.gate.clone(),
            log: Arc::clone(&self.log),
        }))
    }
}

/// Serves fixed bytes or HTTP statuses by locator string.
#[derive(Debug, Default)]
pub struct MapLoader {
    entries: HashMap<String, Result<Vec<u8>, u16>>,
}

impl MapLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, locator: &str, bytes: &[u8]) -> Self {
        self.entries.insert(locator.to_string(), Ok(bytes.to_vec()));
        self
    }

    pub fn with_status(mut self, locator: &str, status: u16) -> Self {
        self.entries.insert(locator.to_string(), Err(status));
        self
    }
}

#[async_trait]
impl DocumentLoader for MapLoader {
    async fn fetch(&self, locator: &Locator) -> Result<Vec<u8>, FetchError> {
        match self.entries.get(&locator.to_string()) {
            Some(Ok(bytes)) => Ok(bytes.clone()),
            Some(Err(status)) => Err(FetchError::Status { status: *status }),
            None => Err(FetchError::Status { status: 404 }),
        }
    }
}

/// The documents every flow test can open.
pub fn portfolio_loader() -> MapLoader {
    MapLoader::new()
        .with("assets/pdf/thesis.pdf", b"pages:3")
        .with("assets/pdf/cv.pdf", b"pages:2")
        .with("assets/pdf/flaky.pdf", b"pages:3;fail:2")
        .with("assets/pdf/empty.pdf", b"pages:0")
        .with("assets/pdf/broken.pdf", b"%PDF-garbage")
        .with_status("assets/pdf/offline.pdf", 500)
}

pub fn session_with(config: ViewerConfig) -> ViewerSession<PixelSurface> {
    ViewerSession::new(config, PixelSurface::new())
}

pub fn session() -> ViewerSession<PixelSurface> {
    session_with(ViewerConfig::default())
}

/// Completes `job` synchronously with the raster the fake document would draw.
pub fn completed(job: &RenderJob) -> RenderOutcome {
    let ticket = job.ticket();
    RenderOutcome {
        ticket,
        result: Ok(raster_for(ticket.request.page, ticket.request.scale)),
    }
}
