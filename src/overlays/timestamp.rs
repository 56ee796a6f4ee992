use std::cell::RefCell;
use std::rc::Rc;

use chrono::TimeDelta;
use log::debug;

use super::{text_extent, ChannelLink, MARGIN};
use crate::config::{TimestampFormat, TimestampSettings};
use crate::core::{DisplayEventChannel, DisplayInfo, DrawOp, Graphics, ImageCanvas};
use crate::data::Image;
use crate::traits::OverlayRenderer;

/// Acquisition time of the visible plane
pub struct TimestampRenderer {
    settings: RefCell<TimestampSettings>,
    link: ChannelLink,
}

impl TimestampRenderer {
    pub fn new(settings: TimestampSettings) -> Self {
        Self {
            settings: RefCell::new(settings),
            link: ChannelLink::default(),
        }
    }

    pub fn settings(&self) -> TimestampSettings {
        self.settings.borrow().clone()
    }

    /// Replace the settings and ask the display to repaint
    pub fn set_settings(&self, settings: TimestampSettings) {
        *self.settings.borrow_mut() = settings;
        self.link.request_redraw("timestamp settings changed");
    }

    /// Text for `image`, None when the metadata lacks the needed time
    pub fn label(format: TimestampFormat, image: &Image) -> Option<String> {
        match format {
            TimestampFormat::Relative => image.metadata.elapsed_ms.map(format_elapsed),
            TimestampFormat::Absolute => image
                .metadata
                .received
                .map(|t| t.format("%Y-%m-%d %H:%M:%S%.3f").to_string()),
        }
    }
}

/// `HH:MM:SS.mmm`; negative input clamps to zero
pub fn format_elapsed(elapsed_ms: f64) -> String {
    let total = elapsed_ms.max(0.0).round() as i64;
    let delta = TimeDelta::milliseconds(total);
    format!(
        "{:02}:{:02}:{:02}.{:03}",
        delta.num_hours(),
        delta.num_minutes() % 60,
        delta.num_seconds() % 60,
        total % 1000
    )
}

impl OverlayRenderer for TimestampRenderer {
    fn name(&self) -> &str {
        "Timestamp"
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

        let Some(text) = Self::label(settings.format, image) else {
            debug!("no {:?} time at {}, timestamp hidden", settings.format, image.coords);
            return Ok(());
        };

        let (x, y) = settings
            .corner
            .anchor(canvas.dimensions(), text_extent(&text), MARGIN);
        graphics.draw(DrawOp::Text {
            x,
            y,
            text,
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
