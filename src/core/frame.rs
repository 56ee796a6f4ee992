use crate::data::Coords;

use super::graphics::{DrawOp, Raster};

/// Overlay layer produced by one paint cycle
#[derive(Debug, Clone)]
pub struct Frame {
    pub number: u64,
    /// Plane the overlays were painted for
    pub coords: Coords,
    pub ops: Vec<DrawOp>,
    pub raster: Raster,
}

impl Frame {
    pub fn new(number: u64, coords: Coords, ops: Vec<DrawOp>, raster: Raster) -> Self {
        Self { number, coords, ops, raster }
    }

    pub fn op_count(&self) -> usize {
        self.ops.len()
    }

    /// True when no overlay painted anything
    pub fn is_blank(&self) -> bool {
        self.ops.is_empty()
    }
}
