use std::rc::Rc;

use crate::core::{DisplayEventChannel, DisplayInfo, Graphics, ImageCanvas};
use crate::data::Image;

/// Overlay plugin painting annotations over the image canvas
pub trait OverlayRenderer {
    /// Shown in the overlay panel layout
    fn name(&self) -> &str;

    /// Paint annotations for `image` onto the shared surface
    fn draw_overlay(
        &self,
        graphics: &Graphics,
        display: &DisplayInfo,
        image: &Image,
        canvas: &ImageCanvas,
    ) -> anyhow::Result<()>;

    /// Called when the renderer joins a panel, so it can post its own
    /// notifications (e.g. redraw requests after a settings change)
    fn attach(&self, _channel: &Rc<DisplayEventChannel>) {}

    /// Called once when the owning panel is cleaned up
    fn detach(&self) {}
}
