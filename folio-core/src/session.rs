//! The viewer session: one open document, its page cursor and zoom, and the
//! render pipeline that draws it.
//!
//! The session never runs renders itself. Operations that need a page drawn
//! hand back a [`RenderJob`]; the host runs it and feeds the
//! [`RenderOutcome`] into [`ViewerSession::finish_render`], which may hand
//! back the coalesced follow-up job. Only one job is ever outstanding.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::config::{LabelPolicy, ViewerConfig};
use crate::controls::Control;
use crate::document::{load_document, DocumentDecoder, DocumentHandle, LoadedDocument, OpenRequest, PageRaster};
use crate::error::{RenderError, SurfaceError, ViewerError};
use crate::loader::{DocumentLoader, Locator};
use crate::pipeline::{Admission, RenderPipeline, RenderRequest};
use crate::surface::{DrawContext, DrawingSurface};
use crate::viewport::Viewport;

/// A render request stamped with the session generation that issued it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderTicket {
    pub generation: u64,
    pub request: RenderRequest,
}

/// An admitted render, ready to run.
#[derive(Debug, Clone)]
pub struct RenderJob {
    ticket: RenderTicket,
    document: Arc<dyn DocumentHandle>,
}

impl RenderJob {
    pub fn ticket(&self) -> RenderTicket {
        self.ticket
    }

    pub fn page(&self) -> u32 {
        self.ticket.request.page
    }

    pub async fn run(self) -> RenderOutcome {
        let RenderRequest { page, scale } = self.ticket.request;
        let result = self.document.render_page(page, scale).await;
        RenderOutcome {
            ticket: self.ticket,
            result,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderOutcome {
    pub ticket: RenderTicket,
    pub result: Result<PageRaster, RenderError>,
}

/// The loading/error slot shown next to the controls.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatusMessage {
    #[default]
    None,
    Loading {
        title: String,
    },
    Error(String),
}

/// Snapshot of everything the toolbar displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerStatus {
    pub page: Option<u32>,
    pub total_pages: Option<u32>,
    pub zoom_percent: u32,
    pub rendering: bool,
    pub message: StatusMessage,
}

impl ViewerStatus {
    pub fn zoom_label(&self) -> String {
        format!("{}%", self.zoom_percent)
    }
}

/// What the host needs to save the open document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub locator: Locator,
    pub file_name: String,
}

#[derive(Debug)]
struct ActiveDocument {
    locator: Locator,
    title: String,
    document: Arc<dyn DocumentHandle>,
}

pub struct ViewerSession<S: DrawingSurface> {
    config: ViewerConfig,
    surface: S,
    active: Option<ActiveDocument>,
    viewport: Viewport,
    pipeline: RenderPipeline,
    generation: u64,
    displayed_page: Option<u32>,
    drawn_page: Option<u32>,
    status: StatusMessage,
}

impl<S: DrawingSurface> ViewerSession<S> {
    pub fn new(config: ViewerConfig, surface: S) -> Self {
        let viewport = Viewport::new(1, config.zoom);
        Self {
            config,
            surface,
            active: None,
            viewport,
            pipeline: RenderPipeline::new(),
            generation: 0,
            displayed_page: None,
            drawn_page: None,
            status: StatusMessage::None,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn pipeline(&self) -> &RenderPipeline {
        &self.pipeline
    }

    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }

    pub fn title(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.title.as_str())
    }

    pub fn locator(&self) -> Option<&Locator> {
        self.active.as_ref().map(|a| &a.locator)
    }

    pub fn current_page(&self) -> u32 {
        self.viewport.current_page()
    }

    pub fn page_count(&self) -> Option<u32> {
        self.active.as_ref().map(|a| a.document.page_count())
    }

    pub fn scale(&self) -> f32 {
        self.viewport.scale()
    }

    /// Page number shown in the toolbar.
    pub fn displayed_page(&self) -> Option<u32> {
        self.displayed_page
    }

    /// Page whose pixels are currently on the surface.
    pub fn drawn_page(&self) -> Option<u32> {
        self.drawn_page
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn message(&self) -> &StatusMessage {
        &self.status
    }

    pub fn status(&self) -> ViewerStatus {
        ViewerStatus {
            page: self.active.as_ref().and(self.displayed_page),
            total_pages: self.page_count(),
            zoom_percent: self.viewport.zoom().percent(),
            rendering: !self.pipeline.is_idle(),
            message: self.status.clone(),
        }
    }

    pub fn resolve(&self, raw: &str) -> Result<Locator, ViewerError> {
        let base = self.config.base_url();
        Locator::resolve(raw, base.as_ref()).map_err(|source| ViewerError::Fetch {
            locator: raw.to_string(),
            source,
        })
    }

    /// Fetch, decode and install a document.
    ///
    /// On failure the status slot carries the error and the previously open
    /// document, if any, stays untouched.
    pub async fn open(
        &mut self,
        loader: &dyn DocumentLoader,
        decoder: &dyn DocumentDecoder,
        request: OpenRequest,
    ) -> Result<RenderJob, ViewerError> {
        self.begin_open(&request);
        let loaded = match self.resolve(&request.locator) {
            Ok(locator) => load_document(loader, decoder, locator, request.display_title).await,
            Err(err) => Err(err),
        };
        match loaded {
            Ok(loaded) => Ok(self.install(loaded)),
            Err(err) => {
                self.open_failed(&err);
                Err(err)
            }
        }
    }

    pub fn begin_open(&mut self, request: &OpenRequest) {
        info!(locator = %request.locator, title = %request.display_title, "opening document");
        self.status = StatusMessage::Loading {
            title: request.display_title.clone(),
        };
    }

    pub fn open_failed(&mut self, err: &ViewerError) {
        error!("Failed to open PDF: {}", err);
        self.status = StatusMessage::Error(err.user_message());
    }

    /// Abandon an open in progress. Only a loading message is cleared.
    pub fn cancel_open(&mut self) {
        if let StatusMessage::Loading { title } = &self.status {
            info!(%title, "open cancelled");
            self.status = StatusMessage::None;
        }
    }

    /// Replace whatever is open with `loaded`, on page 1 at the default zoom.
    pub fn install(&mut self, loaded: LoadedDocument) -> RenderJob {
        if self.is_open() {
            self.close();
        }
        let LoadedDocument {
            locator,
            title,
            document,
        } = loaded;
        info!(%locator, pages = document.page_count(), "document ready");

        self.viewport = Viewport::new(document.page_count(), self.config.zoom);
        self.status = StatusMessage::None;
        self.active = Some(ActiveDocument {
            locator,
            title,
            document: Arc::clone(&document),
        });

        let request = self.pipeline.restart(self.request_for_current());
        self.start(document, request)
    }

    /// Drop the document and return every field to its default.
    pub fn close(&mut self) {
        if let Some(active) = self.active.take() {
            info!(locator = %active.locator, "closing document");
        }
        self.viewport = Viewport::new(1, self.config.zoom);
        self.pipeline.reset();
        self.generation = self.generation.wrapping_add(1);
        self.displayed_page = None;
        self.drawn_page = None;
        self.status = StatusMessage::None;
        self.surface.release();
    }

    pub fn go_to_page(&mut self, page: u32) -> Option<RenderJob> {
        if !self.is_open() {
            return None;
        }
        if !self.viewport.set_page(page) {
            debug!(page, count = self.viewport.page_count(), "ignoring out-of-range page");
            return None;
        }
        self.submit()
    }

    pub fn next_page(&mut self) -> Option<RenderJob> {
        if !self.is_open() || !self.viewport.next_page() {
            return None;
        }
        self.submit()
    }

    pub fn previous_page(&mut self) -> Option<RenderJob> {
        if !self.is_open() || !self.viewport.previous_page() {
            return None;
        }
        self.submit()
    }

    pub fn zoom_in(&mut self) -> Option<RenderJob> {
        if !self.is_open() || !self.viewport.zoom_in() {
            return None;
        }
        self.submit()
    }

    pub fn zoom_out(&mut self) -> Option<RenderJob> {
        if !self.is_open() || !self.viewport.zoom_out() {
            return None;
        }
        self.submit()
    }

    /// Controls are ignored while nothing is open.
    pub fn apply(&mut self, control: Control) -> Option<RenderJob> {
        if !self.is_open() {
            return None;
        }
        match control {
            Control::PreviousPage => self.previous_page(),
            Control::NextPage => self.next_page(),
            Control::ZoomIn => self.zoom_in(),
            Control::ZoomOut => self.zoom_out(),
            Control::Close => {
                self.close();
                None
            }
        }
    }

    pub fn handle_key(&mut self, key: &str) -> Option<RenderJob> {
        Control::from_key(key).and_then(|control| self.apply(control))
    }

    pub fn download(&self) -> Option<DownloadTarget> {
        self.active.as_ref().map(|active| DownloadTarget {
            file_name: active.locator.file_name(),
            locator: active.locator.clone(),
        })
    }

    /// Apply a finished render and return the coalesced follow-up, if any.
    ///
    /// The pipeline leaves the rendering state whether the page succeeded or
    /// not. Outcomes from a closed or replaced document are dropped.
    pub fn finish_render(&mut self, outcome: RenderOutcome) -> Option<RenderJob> {
        let RenderOutcome { ticket, result } = outcome;
        if ticket.generation != self.generation {
            debug!(
                page = ticket.request.page,
                stale = ticket.generation,
                live = self.generation,
                "dropping render from a closed document"
            );
            return None;
        }
        let document = Arc::clone(&self.active.as_ref()?.document);
        let page = ticket.request.page;

        match result {
            Ok(raster) => match self.draw(&raster) {
                Ok(()) => {
                    debug!(page, width = raster.width(), height = raster.height(), "page drawn");
                    self.drawn_page = Some(page);
                    if self.config.label_policy == LabelPolicy::OnDraw {
                        self.displayed_page = Some(page);
                    }
                    if matches!(self.status, StatusMessage::Error(_)) {
                        self.status = StatusMessage::None;
                    }
                }
                Err(e) => {
                    warn!(page, error = %e, "could not draw page");
                    self.status = StatusMessage::Error(format!("Could not draw page {page}: {e}"));
                }
            },
            Err(e) => {
                warn!(page, error = %e, "render failed");
                self.status = StatusMessage::Error(format!("Could not render page {page}: {e}"));
            }
        }

        let next = self.pipeline.complete()?;
        Some(self.start(document, next))
    }

    /// Run `job` and every coalesced follow-up until the pipeline is idle.
    pub async fn settle(&mut self, job: RenderJob) {
        let mut next = Some(job);
        while let Some(job) = next {
            let outcome = job.run().await;
            next = self.finish_render(outcome);
        }
    }

    fn request_for_current(&self) -> RenderRequest {
        RenderRequest {
            page: self.viewport.current_page(),
            scale: self.viewport.scale(),
        }
    }

    fn submit(&mut self) -> Option<RenderJob> {
        let document = Arc::clone(&self.active.as_ref()?.document);
        match self.pipeline.submit(self.request_for_current()) {
            Admission::Start(request) => Some(self.start(document, request)),
            Admission::Coalesced => None,
        }
    }

    fn start(&mut self, document: Arc<dyn DocumentHandle>, request: RenderRequest) -> RenderJob {
        if self.config.label_policy == LabelPolicy::OnStart {
            self.displayed_page = Some(request.page);
        }
        debug!(page = request.page, scale = request.scale, "starting render");
        RenderJob {
            ticket: RenderTicket {
                generation: self.generation,
                request,
            },
            document,
        }
    }

    fn draw(&mut self, raster: &PageRaster) -> Result<(), SurfaceError> {
        self.surface.set_size(raster.width(), raster.height());
        self.surface.context().draw_raster(raster)
    }
}
