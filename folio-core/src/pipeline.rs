//! Single-flight render admission.
//!
//! At most one render is in flight. Requests arriving while busy overwrite a
//! single pending slot, so the surface converges on the last page asked for.

use tracing::debug;

/// A page to draw at a given scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRequest {
    pub page: u32,
    pub scale: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum RenderState {
    #[default]
    Idle,
    Rendering(RenderRequest),
}

/// Outcome of submitting a request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Admission {
    /// The pipeline was idle; the caller must run this render now.
    Start(RenderRequest),
    /// A render is in flight; the request now occupies the pending slot.
    Coalesced,
}

#[derive(Debug, Clone, Default)]
pub struct RenderPipeline {
    state: RenderState,
    pending: Option<RenderRequest>,
}

impl RenderPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<RenderRequest> {
        self.pending
    }

    pub fn in_flight(&self) -> Option<RenderRequest> {
        match self.state {
            RenderState::Idle => None,
            RenderState::Rendering(request) => Some(request),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, RenderState::Idle)
    }

    pub fn submit(&mut self, request: RenderRequest) -> Admission {
        match self.state {
            RenderState::Idle => {
                self.state = RenderState::Rendering(request);
                Admission::Start(request)
            }
            RenderState::Rendering(current) => {
                if let Some(dropped) = self.pending.replace(request) {
                    debug!(dropped = dropped.page, page = request.page, "replacing pending render");
                } else {
                    debug!(busy = current.page, page = request.page, "render busy, coalescing");
                }
                Admission::Coalesced
            }
        }
    }

    /// Marks the in-flight render finished. Returns the pending request, now
    /// in flight, if one was waiting.
    pub fn complete(&mut self) -> Option<RenderRequest> {
        if self.is_idle() {
            return None;
        }
        match self.pending.take() {
            Some(next) => {
                self.state = RenderState::Rendering(next);
                Some(next)
            }
            None => {
                self.state = RenderState::Idle;
                None
            }
        }
    }

    /// Drops any pending request and starts `request` regardless of state.
    pub fn restart(&mut self, request: RenderRequest) -> RenderRequest {
        self.pending = None;
        self.state = RenderState::Rendering(request);
        request
    }

    pub fn reset(&mut self) {
        self.state = RenderState::Idle;
        self.pending = None;
    }
}
