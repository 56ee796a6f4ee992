use std::cell::RefCell;

use serde::{Deserialize, Serialize};

/// Straight 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    pub const YELLOW: Self = Self::new(255, 255, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// 2D drawing operations recorded by overlay renderers
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Filled rectangle with top-left corner at (x, y)
    Rect { x: u32, y: u32, width: u32, height: u32, color: Rgba },

    /// Text anchored at its top-left corner. Glyphs are left to the host's font renderer.
    Text { x: u32, y: u32, text: String, color: Rgba },
}

/// Drawing surface shared by every renderer during one paint cycle.
///
/// Renderers only record operations; the owning window rasterizes the
/// finished list once all overlays have painted. Later operations paint
/// over earlier ones.
#[derive(Debug)]
pub struct Graphics {
    width: u32,
    height: u32,
    ops: RefCell<Vec<DrawOp>>,
}

impl Graphics {
    /// Create an empty surface with the canvas dimensions
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ops: RefCell::new(Vec::new()),
        }
    }

    /// Record a draw operation
    pub fn draw(&self, op: DrawOp) {
        self.ops.borrow_mut().push(op);
    }

    /// Snapshot of the recorded operations in paint order
    pub fn ops(&self) -> Vec<DrawOp> {
        self.ops.borrow().clone()
    }

    pub fn op_count(&self) -> usize {
        self.ops.borrow().len()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Execute every recorded operation into a fresh transparent raster
    pub fn rasterize(&self) -> Raster {
        let mut raster = Raster::new(self.width, self.height);
        for op in self.ops.borrow().iter() {
            raster.execute(op);
        }
        raster
    }
}

/// RGBA pixel buffer produced from a recorded surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Raster {
    /// Fully transparent raster
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; buffer_len(width, height)],
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Color at (x, y), None when out of bounds
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = self.offset(x, y);
        Some(Rgba::new(
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ))
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL
    }

    fn execute(&mut self, op: &DrawOp) {
        match op {
            DrawOp::Rect { x, y, width, height, color } => {
                self.fill_rect(*x, *y, *width, *height, *color)
            }
            DrawOp::Text { .. } => {}
        }
    }

    fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: Rgba) {
        let x_end = x.saturating_add(width).min(self.width);
        let y_end = y.saturating_add(height).min(self.height);
        let rgba = [color.r, color.g, color.b, color.a];
        for py in y..y_end {
            for px in x..x_end {
                let idx = self.offset(px, py);
                self.pixels[idx..idx + BYTES_PER_PIXEL].copy_from_slice(&rgba);
            }
        }
    }
}

const BYTES_PER_PIXEL: usize = 4;

/// Byte length of an RGBA buffer, computed in `usize`
fn buffer_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * BYTES_PER_PIXEL
}
