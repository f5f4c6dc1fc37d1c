//! Paginated document viewer core.
//!
//! A [`ViewerSession`] owns one open document, its page cursor and zoom, and
//! a single-flight render pipeline drawing into a [`DrawingSurface`].
//! Fetching goes through a [`DocumentLoader`] and decoding through a
//! [`DocumentDecoder`], so the session runs without any real UI or PDF
//! library behind it.

pub mod config;
pub mod controls;
pub mod document;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod session;
pub mod surface;
pub mod viewport;

pub use config::{LabelPolicy, ViewerConfig, ZoomConfig};
pub use controls::Control;
pub use document::{load_document, DocumentDecoder, DocumentHandle, LoadedDocument, OpenRequest, PageRaster};
pub use error::{ConfigError, DecodeError, FetchError, RenderError, SurfaceError, ViewerError};
pub use loader::{AssetLoader, DocumentLoader, Locator};
pub use pipeline::{Admission, RenderPipeline, RenderRequest, RenderState};
pub use session::{
    DownloadTarget, RenderJob, RenderOutcome, RenderTicket, StatusMessage, ViewerSession, ViewerStatus,
};
pub use surface::{DrawContext, DrawingSurface, PixelBuffer, PixelSurface};
pub use viewport::{Viewport, Zoom};
