use std::cell::RefCell;
use std::rc::Rc;

use anyhow::bail;
use log::debug;

use super::{text_extent, ChannelLink, MARGIN};
use crate::config::ScaleBarSettings;
use crate::core::{DisplayEventChannel, DisplayInfo, DrawOp, Graphics, ImageCanvas};
use crate::data::Image;
use crate::traits::OverlayRenderer;

/// Gap between the label and the bar
const LABEL_GAP: u32 = 4;

/// Calibrated bar of fixed physical length
pub struct ScaleBarRenderer {
    settings: RefCell<ScaleBarSettings>,
    link: ChannelLink,
}

impl ScaleBarRenderer {
    pub fn new(settings: ScaleBarSettings) -> Self {
        Self {
            settings: RefCell::new(settings),
            link: ChannelLink::default(),
        }
    }

    pub fn settings(&self) -> ScaleBarSettings {
        self.settings.borrow().clone()
    }

    /// Replace the settings and ask the display to repaint
    pub fn set_settings(&self, settings: ScaleBarSettings) {
        *self.settings.borrow_mut() = settings;
        self.link.request_redraw("scale bar settings changed");
    }

    /// Bar length in screen pixels, at least one
    pub fn bar_length(length_um: f64, pixel_size_um: f64, canvas: &ImageCanvas) -> u32 {
        let image_pixels = length_um / pixel_size_um;
        canvas.to_screen_length(image_pixels).round().max(1.0) as u32
    }
}

impl OverlayRenderer for ScaleBarRenderer {
    fn name(&self) -> &str {
        "Scale Bar"
    }

    fn draw_overlay(
        &self,
        graphics: &Graphics,
        _display: &DisplayInfo,
        image: &Image,
        canvas: &ImageCanvas,
    ) -> anyhow::Result<()> {
        let settings = self.settings();
        if !settings.enabled {
            return Ok(());
        }

        let Some(pixel_size) = image.metadata.pixel_size_um else {
            debug!("no pixel size at {}, scale bar hidden", image.coords);
            return Ok(());
        };
        if !pixel_size.is_finite() || pixel_size <= 0.0 {
            bail!("invalid pixel size {} at {}", pixel_size, image.coords);
        }

        let length = Self::bar_length(settings.length_um, pixel_size, canvas);
        let label = format!("{} µm", settings.length_um);
        let label_height = if settings.show_label {
            text_extent(&label).1 + LABEL_GAP
        } else {
            0
        };

        let (x, y) = settings.corner.anchor(
            canvas.dimensions(),
            (length, settings.thickness + label_height),
            MARGIN,
        );

        if settings.show_label {
            graphics.draw(DrawOp::Text {
                x,
                y,
                text: label,
                color: settings.color,
            });
        }
        graphics.draw(DrawOp::Rect {
            x,
            y: y + label_height,
            width: length,
            height: settings.thickness,
            color: settings.color,
        });

        Ok(())
    }

    fn attach(&self, channel: &Rc<DisplayEventChannel>) {
        self.link.attach(channel);
    }

    fn detach(&self) {
        self.link.detach();
    }
}
