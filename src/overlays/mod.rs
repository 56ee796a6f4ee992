//! Built-in overlay renderers.

pub mod scale_bar;
pub mod timestamp;

pub use scale_bar::ScaleBarRenderer;
pub use timestamp::TimestampRenderer;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::core::{DisplayEventChannel, RedrawRequestedEvent};

/// Distance between an overlay and the canvas edge
pub const MARGIN: u32 = 10;

/// Nominal glyph cell used to place text before the host renders it
const GLYPH_WIDTH: u32 = 7;
const LINE_HEIGHT: u32 = 12;

/// Approximate screen size of a single line of text
pub fn text_extent(text: &str) -> (u32, u32) {
    (text.chars().count() as u32 * GLYPH_WIDTH, LINE_HEIGHT)
}

/// A renderer's link back to its display channel
#[derive(Default)]
struct ChannelLink {
    channel: RefCell<Weak<DisplayEventChannel>>,
}

impl ChannelLink {
    fn attach(&self, channel: &Rc<DisplayEventChannel>) {
        *self.channel.borrow_mut() = Rc::downgrade(channel);
    }

    fn detach(&self) {
        *self.channel.borrow_mut() = Weak::new();
    }

    fn is_attached(&self) -> bool {
        self.channel.borrow().strong_count() > 0
    }

    /// Ask the display to repaint. False when not attached.
    fn request_redraw(&self, reason: &str) -> bool {
        let channel = self.channel.borrow().upgrade();
        match channel {
            Some(channel) => {
                channel.post(RedrawRequestedEvent::new(reason).into());
                true
            }
            None => false,
        }
    }
}
