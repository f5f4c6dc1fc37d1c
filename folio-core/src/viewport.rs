use crate::config::ZoomConfig;

/// Zoom level held in integer percent so repeated steps never drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zoom {
    percent: u32,
    limits: ZoomConfig,
}

impl Zoom {
    pub fn new(limits: ZoomConfig) -> Self {
        Self {
            percent: limits
                .default_percent
                .clamp(limits.min_percent, limits.max_percent),
            limits,
        }
    }

    pub fn percent(&self) -> u32 {
        self.percent
    }

    pub fn scale(&self) -> f32 {
        self.percent as f32 / 100.0
    }

    /// Returns false when already at the upper bound.
    pub fn zoom_in(&mut self) -> bool {
        if self.percent >= self.limits.max_percent {
            return false;
        }
        self.percent = (self.percent + self.limits.step_percent).min(self.limits.max_percent);
        true
    }

    /// Returns false when already at the lower bound.
    pub fn zoom_out(&mut self) -> bool {
        if self.percent <= self.limits.min_percent {
            return false;
        }
        self.percent = self
            .percent
            .saturating_sub(self.limits.step_percent)
            .max(self.limits.min_percent);
        true
    }
}

/// Viewport manages the current page and zoom of an open document.
///
/// Pages are 1-based; `current_page` always lies in `1..=page_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    current_page: u32,
    page_count: u32,
    zoom: Zoom,
}

impl Viewport {
    pub fn new(page_count: u32, limits: ZoomConfig) -> Self {
        Self {
            current_page: 1,
            page_count: page_count.max(1),
            zoom: Zoom::new(limits),
        }
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn contains(&self, page: u32) -> bool {
        (1..=self.page_count).contains(&page)
    }

    /// Returns false and leaves the page unchanged when `page` is out of range.
    pub fn set_page(&mut self, page: u32) -> bool {
        if !self.contains(page) {
            return false;
        }
        self.current_page = page;
        true
    }

    pub fn next_page(&mut self) -> bool {
        if self.current_page < self.page_count {
            self.current_page += 1;
            true
        } else {
            false
        }
    }

    pub fn previous_page(&mut self) -> bool {
        if self.current_page > 1 {
            self.current_page -= 1;
            true
        } else {
            false
        }
    }

    pub fn zoom(&self) -> Zoom {
        self.zoom
    }

    pub fn scale(&self) -> f32 {
        self.zoom.scale()
    }

    pub fn zoom_in(&mut self) -> bool {
        self.zoom.zoom_in()
    }

    pub fn zoom_out(&mut self) -> bool {
        self.zoom.zoom_out()
    }
}
