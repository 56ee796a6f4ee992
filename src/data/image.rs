use chrono::{DateTime, Local};

use super::coords::Coords;

/// Acquisition metadata attached to an image plane
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageMetadata {
    /// Milliseconds since the start of the acquisition
    pub elapsed_ms: Option<f64>,
    /// Physical size of one pixel in micrometers
    pub pixel_size_um: Option<f64>,
    /// Wall-clock time the plane was received
    pub received: Option<DateTime<Local>>,
}

/// A single image plane
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub coords: Coords,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u16>,
    pub metadata: ImageMetadata,
}

impl Image {
    /// Create a blank plane at the given coordinates
    pub fn blank(coords: Coords, width: u32, height: u32) -> Self {
        Self {
            coords,
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
            metadata: ImageMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: ImageMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}
