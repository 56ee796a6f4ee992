//! Notifications carried by a display event channel.
//!
//! Every payload is immutable once built and cheap to clone, so an event can
//! sit in the channel's re-entrancy queue without borrowing from the poster.

use std::fmt;
use std::rc::Rc;

use super::canvas::ImageCanvas;
use super::display_info::DisplayHandle;
use super::graphics::Graphics;

/// Discriminant subscribers declare interest in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    CanvasDraw,
    LayoutChanged,
    DisplayAboutToShow,
    RedrawRequested,
    DisplayDestroyed,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::CanvasDraw => "canvas-draw",
            EventKind::LayoutChanged => "layout-changed",
            EventKind::DisplayAboutToShow => "display-about-to-show",
            EventKind::RedrawRequested => "redraw-requested",
            EventKind::DisplayDestroyed => "display-destroyed",
        };
        f.write_str(name)
    }
}

/// The canvas is about to composite; overlays paint onto `graphics`
#[derive(Debug, Clone)]
pub struct CanvasDrawEvent {
    graphics: Rc<Graphics>,
    canvas: Rc<ImageCanvas>,
}

impl CanvasDrawEvent {
    pub fn new(graphics: Rc<Graphics>, canvas: Rc<ImageCanvas>) -> Self {
        Self { graphics, canvas }
    }

    pub fn graphics(&self) -> &Graphics {
        &self.graphics
    }

    pub fn canvas(&self) -> &ImageCanvas {
        &self.canvas
    }
}

/// The overlay list changed its footprint; dependent layout must recompute
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutChangedEvent;

/// Posted once before a display window first appears
#[derive(Debug, Clone)]
pub struct DisplayAboutToShowEvent {
    display: DisplayHandle,
}

impl DisplayAboutToShowEvent {
    pub fn new(display: DisplayHandle) -> Self {
        Self { display }
    }

    pub fn display(&self) -> &DisplayHandle {
        &self.display
    }
}

/// Something on the display changed and the canvas should repaint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedrawRequestedEvent {
    reason: String,
}

impl RedrawRequestedEvent {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Posted once when the display window closes
#[derive(Debug, Clone)]
pub struct DisplayDestroyedEvent {
    display: DisplayHandle,
}

impl DisplayDestroyedEvent {
    pub fn new(display: DisplayHandle) -> Self {
        Self { display }
    }

    pub fn display(&self) -> &DisplayHandle {
        &self.display
    }
}

/// Any notification a display channel can carry
#[derive(Debug, Clone)]
pub enum DisplayEvent {
    CanvasDraw(CanvasDrawEvent),
    LayoutChanged(LayoutChangedEvent),
    DisplayAboutToShow(DisplayAboutToShowEvent),
    RedrawRequested(RedrawRequestedEvent),
    DisplayDestroyed(DisplayDestroyedEvent),
}

impl DisplayEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            DisplayEvent::CanvasDraw(_) => EventKind::CanvasDraw,
            DisplayEvent::LayoutChanged(_) => EventKind::LayoutChanged,
            DisplayEvent::DisplayAboutToShow(_) => EventKind::DisplayAboutToShow,
            DisplayEvent::RedrawRequested(_) => EventKind::RedrawRequested,
            DisplayEvent::DisplayDestroyed(_) => EventKind::DisplayDestroyed,
        }
    }
}

impl From<CanvasDrawEvent> for DisplayEvent {
    fn from(event: CanvasDrawEvent) -> Self {
        DisplayEvent::CanvasDraw(event)
    }
}

impl From<LayoutChangedEvent> for DisplayEvent {
    fn from(event: LayoutChangedEvent) -> Self {
        DisplayEvent::LayoutChanged(event)
    }
}

impl From<DisplayAboutToShowEvent> for DisplayEvent {
    fn from(event: DisplayAboutToShowEvent) -> Self {
        DisplayEvent::DisplayAboutToShow(event)
    }
}

impl From<RedrawRequestedEvent> for DisplayEvent {
    fn from(event: RedrawRequestedEvent) -> Self {
        DisplayEvent::RedrawRequested(event)
    }
}

impl From<DisplayDestroyedEvent> for DisplayEvent {
    fn from(event: DisplayDestroyedEvent) -> Self {
        DisplayEvent::DisplayDestroyed(event)
    }
}
