//! Drawing surface capability.

use crate::document::PageRaster;
use crate::error::SurfaceError;

/// Something pixels can be written into.
pub trait DrawContext {
    fn draw_raster(&mut self, raster: &PageRaster) -> Result<(), SurfaceError>;
}

/// The target a session renders pages onto.
pub trait DrawingSurface: Send {
    type Context: DrawContext;

    fn set_size(&mut self, width: u32, height: u32);

    fn context(&mut self) -> &mut Self::Context;

    /// Drop the backing storage. The next `set_size` makes it usable again.
    fn release(&mut self);
}

/// An RGBA8 framebuffer kept in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    released: bool,
    frames: u64,
}

impl PixelBuffer {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Number of rasters drawn since creation.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl DrawContext for PixelBuffer {
    fn draw_raster(&mut self, raster: &PageRaster) -> Result<(), SurfaceError> {
        if self.released {
            return Err(SurfaceError::Released);
        }
        if raster.width() != self.width || raster.height() != self.height {
            return Err(SurfaceError::SizeMismatch {
                surface_width: self.width,
                surface_height: self.height,
                raster_width: raster.width(),
                raster_height: raster.height(),
            });
        }
        self.pixels.copy_from_slice(raster.pixels());
        self.frames += 1;
        Ok(())
    }
}

/// [`DrawingSurface`] over a [`PixelBuffer`].
#[derive(Debug, Clone, Default)]
pub struct PixelSurface {
    buffer: PixelBuffer,
}

impl PixelSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn is_released(&self) -> bool {
        self.buffer.released
    }

    /// Current frame as `(width, height, rgba)`, if anything has been drawn.
    pub fn frame(&self) -> Option<(u32, u32, &[u8])> {
        if self.buffer.released || self.buffer.frames == 0 || self.buffer.pixels.is_empty() {
            return None;
        }
        Some((self.buffer.width, self.buffer.height, &self.buffer.pixels))
    }
}

impl DrawingSurface for PixelSurface {
    type Context = PixelBuffer;

    fn set_size(&mut self, width: u32, height: u32) {
        let buffer = &mut self.buffer;
        buffer.released = false;
        if buffer.width == width && buffer.height == height {
            return;
        }
        buffer.width = width;
        buffer.height = height;
        buffer.pixels = vec![0; width as usize * height as usize * 4];
    }

    fn context(&mut self) -> &mut PixelBuffer {
        &mut self.buffer
    }

    fn release(&mut self) {
        self.buffer.width = 0;
        self.buffer.height = 0;
        self.buffer.pixels = Vec::new();
        self.buffer.released = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raster(width: u32, height: u32, fill: u8) -> PageRaster {
        PageRaster::new(1, width, height, vec![fill; (width * height * 4) as usize]).unwrap()
    }

    #[test]
    fn draws_after_sizing() {
        let mut surface = PixelSurface::new();
        surface.set_size(2, 1);
        surface.context().draw_raster(&raster(2, 1, 7)).unwrap();

        let (w, h, pixels) = surface.frame().unwrap();
        assert_eq!((w, h), (2, 1));
        assert!(pixels.iter().all(|&b| b == 7));
        assert_eq!(surface.buffer().frames(), 1);
    }

    #[test]
    fn size_mismatch_is_rejected() {
        let mut surface = PixelSurface::new();
        surface.set_size(4, 4);
        let err = surface.context().draw_raster(&raster(2, 2, 0)).unwrap_err();
        assert!(matches!(err, SurfaceError::SizeMismatch { .. }));
        assert!(surface.frame().is_none());
    }

    #[test]
    fn released_surface_refuses_draws_until_resized() {
        let mut surface = PixelSurface::new();
        surface.set_size(1, 1);
        surface.context().draw_raster(&raster(1, 1, 1)).unwrap();
        surface.release();

        assert!(surface.is_released());
        assert!(surface.frame().is_none());
        assert_eq!(
            surface.context().draw_raster(&raster(0, 0, 0)),
            Err(SurfaceError::Released)
        );

        surface.set_size(1, 1);
        surface.context().draw_raster(&raster(1, 1, 9)).unwrap();
        assert!(surface.frame().is_some());
    }
}
