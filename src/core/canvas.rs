use std::cell::Cell;

use crate::config::CanvasSettings;
use crate::data::Coords;

/// On-screen canvas showing one plane of the image stack
#[derive(Debug)]
pub struct ImageCanvas {
    width: u32,
    height: u32,
    /// Screen pixels per image pixel
    magnification: f64,
    coords: Cell<Coords>,
}

impl ImageCanvas {
    /// Create a canvas at 1:1 zoom showing the stack origin
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            magnification: 1.0,
            coords: Cell::new(Coords::default()),
        }
    }

    pub fn from_settings(settings: &CanvasSettings) -> Self {
        Self::new(settings.width, settings.height).with_magnification(settings.magnification)
    }

    pub fn with_magnification(mut self, magnification: f64) -> Self {
        self.magnification = magnification;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn magnification(&self) -> f64 {
        self.magnification
    }

    /// Coordinates of the plane currently shown
    pub fn current_image_coords(&self) -> Coords {
        self.coords.get()
    }

    pub fn set_current_image_coords(&self, coords: Coords) {
        self.coords.set(coords);
    }

    /// Convert a length in image pixels to screen pixels
    pub fn to_screen_length(&self, image_pixels: f64) -> f64 {
        image_pixels * self.magnification
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_canvas_shows_origin() {
        let canvas = ImageCanvas::new(640, 480);
        assert_eq!(canvas.dimensions(), (640, 480));
        assert_eq!(canvas.current_image_coords(), Coords::default());
    }

    #[test]
    fn test_coords_move_through_shared_reference() {
        let canvas = ImageCanvas::new(10, 10);
        canvas.set_current_image_coords(Coords::new().with_time(4));
        assert_eq!(canvas.current_image_coords().time, 4);
    }

    #[test]
    fn test_screen_length_scales_with_magnification() {
        let canvas = ImageCanvas::new(10, 10).with_magnification(2.5);
        assert_eq!(canvas.to_screen_length(10.0), 25.0);
    }

    #[test]
    fn test_from_settings() {
        let settings = CanvasSettings {
            width: 1024,
            height: 768,
            magnification: 0.5,
        };
        let canvas = ImageCanvas::from_settings(&settings);
        assert_eq!(canvas.dimensions(), (1024, 768));
        assert_eq!(canvas.magnification(), 0.5);
    }
}
