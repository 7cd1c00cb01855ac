//! Pixel surfaces the renderer draws into.
//!
//! The renderer only needs a BGRA byte buffer with a known stride, wrapped in
//! `begin_draw`/`end_draw`. [`FrameBuffer`] is the owned in-memory version;
//! front ends either render into one and present it, or implement
//! [`PixelSurface`] over their own backing store.

use std::ops::{Deref, DerefMut};

use crate::error::{RenderError, RenderResult};
use crate::projection::Viewport;

pub const BYTES_PER_PIXEL: usize = 4;

/// Opaque black, `0xAARRGGBB`.
pub const BLACK: u32 = 0xFF00_0000;
/// Opaque white, `0xAARRGGBB`.
pub const WHITE: u32 = 0xFFFF_FFFF;

/// Opaque gray with all three channels set to `level`.
#[inline]
pub fn gray(level: u8) -> u32 {
    let l = level as u32;
    0xFF00_0000 | (l << 16) | (l << 8) | l
}

/// A lockable BGRA pixel buffer.
///
/// Colors are `0xAARRGGBB` words stored little-endian, so the bytes of a
/// pixel read B, G, R, A.
pub trait PixelSurface {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    /// Bytes from one row to the next.
    fn stride(&self) -> usize;
    fn pixels(&self) -> &[u8];
    fn pixels_mut(&mut self) -> &mut [u8];

    /// Acquire the backing store for a frame.
    fn begin_draw(&mut self) -> RenderResult<()> {
        Ok(())
    }

    /// Release the backing store; the frame is complete.
    fn end_draw(&mut self) {}

    fn clear(&mut self, color: u32) {
        let (width, height, stride) = (self.width(), self.height(), self.stride());
        if width == 0 || height == 0 || stride == 0 {
            return;
        }
        let bytes = color.to_le_bytes();
        for row in self.pixels_mut().chunks_mut(stride).take(height) {
            if let Some(row) = row.get_mut(..width * BYTES_PER_PIXEL) {
                for pixel in row.chunks_exact_mut(BYTES_PER_PIXEL) {
                    pixel.copy_from_slice(&bytes);
                }
            }
        }
    }

    /// Write one pixel; coordinates outside the surface are ignored.
    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x >= self.width() || y >= self.height() {
            return;
        }
        let offset = y * self.stride() + x * BYTES_PER_PIXEL;
        if let Some(pixel) = self.pixels_mut().get_mut(offset..offset + BYTES_PER_PIXEL) {
            pixel.copy_from_slice(&color.to_le_bytes());
        }
    }

    /// Read one pixel back as `0xAARRGGBB`.
    fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let offset = y * self.stride() + x * BYTES_PER_PIXEL;
        let bytes = self.pixels().get(offset..offset + BYTES_PER_PIXEL)?;
        Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

/// Check that a surface's declared geometry matches its buffer.
pub fn validate_surface<S: PixelSurface + ?Sized>(surface: &S) -> RenderResult<Viewport> {
    let (width, height, stride) = (surface.width(), surface.height(), surface.stride());

    if width == 0 || height == 0 {
        return Err(RenderError::InvalidViewport { width, height });
    }
    let row_bytes = width * BYTES_PER_PIXEL;
    if stride < row_bytes {
        return Err(RenderError::StrideTooSmall {
            stride,
            required: row_bytes,
        });
    }
    let required = height * stride;
    let actual = surface.pixels().len();
    if actual < required {
        return Err(RenderError::BufferTooSmall { actual, required });
    }

    Ok(Viewport::new(width, height))
}

/// Owned BGRA frame.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    stride: usize,
    pixels: Vec<u8>,
    drawing: bool,
    frames: u64,
}

impl FrameBuffer {
    /// Tightly packed frame (`stride == width * 4`), cleared to black.
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_stride(width, height, width * BYTES_PER_PIXEL)
    }

    /// Frame whose rows are padded to `stride` bytes.
    pub fn with_stride(width: usize, height: usize, stride: usize) -> Self {
        let stride = stride.max(width * BYTES_PER_PIXEL);
        let mut frame = Self {
            width,
            height,
            stride,
            pixels: vec![0; height * stride],
            drawing: false,
            frames: 0,
        };
        frame.clear(BLACK);
        frame
    }

    /// Reallocate for new dimensions; contents are reset to black.
    pub fn resize(&mut self, width: usize, height: usize) {
        if width != self.width || height != self.height {
            *self = Self::new(width, height);
        }
    }

    /// Completed `begin_draw`/`end_draw` pairs.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }
}

impl PixelSurface for FrameBuffer {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn stride(&self) -> usize {
        self.stride
    }

    fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    fn begin_draw(&mut self) -> RenderResult<()> {
        if self.drawing {
            return Err(RenderError::Surface("frame buffer is already locked".to_string()));
        }
        self.drawing = true;
        Ok(())
    }

    fn end_draw(&mut self) {
        if self.drawing {
            self.drawing = false;
            self.frames += 1;
        }
    }
}

/// `begin_draw` on creation, `end_draw` on drop, on every exit path.
pub struct DrawScope<'a, S: PixelSurface + ?Sized> {
    surface: &'a mut S,
}

impl<'a, S: PixelSurface + ?Sized> DrawScope<'a, S> {
    pub fn begin(surface: &'a mut S) -> RenderResult<Self> {
        surface.begin_draw()?;
        Ok(Self { surface })
    }
}

impl<S: PixelSurface + ?Sized> Deref for DrawScope<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.surface
    }
}

impl<S: PixelSurface + ?Sized> DerefMut for DrawScope<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.surface
    }
}

impl<S: PixelSurface + ?Sized> Drop for DrawScope<'_, S> {
    fn drop(&mut self) {
        self.surface.end_draw();
    }
}
