//! Ordered overlay renderers for one display.
//!
//! The panel subscribes to canvas draw notifications and paints every
//! renderer, in list order, over the visible image. List order is paint
//! order: later renderers draw over earlier ones.

use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use log::{debug, warn};

use super::canvas::ImageCanvas;
use super::channel::{panic_message, DisplayEventChannel, SubscriberId, Subscription};
use super::display_info::DisplayHandle;
use super::events::{CanvasDrawEvent, DisplayEvent, EventKind, LayoutChangedEvent};
use crate::config::DisplaySettings;
use crate::error::{DataError, PanelError};
use crate::overlays::{ScaleBarRenderer, TimestampRenderer};
use crate::traits::{ImageSource, OverlayRenderer, Subscriber};

const INTEREST: &[EventKind] = &[EventKind::CanvasDraw];

/// Result of handling one canvas draw notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOutcome {
    /// Every renderer ran; `failed` of them returned an error or panicked
    Composed { painted: usize, failed: usize },
    /// No image at the canvas coordinates, no renderer was called
    Skipped(DataError),
    /// The panel was already cleaned up
    Inactive,
}

pub struct OverlaysPanel {
    label: String,
    display: DisplayHandle,
    canvas: Rc<ImageCanvas>,
    images: Rc<dyn ImageSource>,
    channel: Rc<DisplayEventChannel>,
    renderers: RefCell<Vec<Rc<dyn OverlayRenderer>>>,
    layout: RefCell<Vec<String>>,
    subscription: RefCell<Option<Subscription>>,
    cleaned_up: Cell<bool>,
}

impl OverlaysPanel {
    /// Start building a panel for `display`
    pub fn builder(
        display: DisplayHandle,
        canvas: Rc<ImageCanvas>,
        channel: Rc<DisplayEventChannel>,
    ) -> OverlaysPanelBuilder {
        OverlaysPanelBuilder {
            display,
            canvas,
            channel,
            images: None,
            renderers: Vec::new(),
        }
    }

    /// Panel with the standard overlays: scale bar, then timestamp
    pub fn with_default_overlays(
        display: DisplayHandle,
        canvas: Rc<ImageCanvas>,
        images: Rc<dyn ImageSource>,
        channel: Rc<DisplayEventChannel>,
        settings: &DisplaySettings,
    ) -> Result<Rc<Self>, PanelError> {
        Self::builder(display, canvas, channel)
            .image_source(images)
            .renderer(Rc::new(ScaleBarRenderer::new(settings.scale_bar.clone())))
            .renderer(Rc::new(TimestampRenderer::new(settings.timestamp.clone())))
            .build()
    }

    /// Paint every renderer for the current frame.
    ///
    /// Never fails: a missing image skips the frame and a failing renderer
    /// is logged while the rest still paint.
    pub fn on_canvas_draw(&self, event: &CanvasDrawEvent) -> DrawOutcome {
        if self.cleaned_up.get() {
            debug!("{}: draw after cleanup ignored", self.label);
            return DrawOutcome::Inactive;
        }

        let coords = self.canvas.current_image_coords();
        let image = match self.images.image(&coords) {
            Ok(image) => image,
            Err(err) => {
                warn!("{}: skipping overlays for this frame: {}", self.label, err);
                return DrawOutcome::Skipped(err);
            }
        };

        // Renderers may add renderers while painting
        let renderers = self.renderers.borrow().clone();
        let mut painted = 0;
        let mut failed = 0;

        for renderer in &renderers {
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                renderer.draw_overlay(event.graphics(), &self.display, &image, event.canvas())
            }));
            match result {
                Ok(Ok(())) => painted += 1,
                Ok(Err(err)) => {
                    failed += 1;
                    warn!("{}: `{}` failed: {:#}", self.label, renderer.name(), err);
                }
                Err(payload) => {
                    failed += 1;
                    warn!(
                        "{}: `{}` panicked: {}",
                        self.label,
                        renderer.name(),
                        panic_message(payload.as_ref())
                    );
                }
            }
        }

        DrawOutcome::Composed { painted, failed }
    }

    /// Append a renderer on top of the others
    pub fn add_renderer(&self, renderer: Rc<dyn OverlayRenderer>) -> Result<(), PanelError> {
        let index = self.renderers.borrow().len();
        self.insert_renderer(index, renderer)
    }

    /// Insert a renderer at `index` in paint order, clamped to the list length
    pub fn insert_renderer(
        &self,
        index: usize,
        renderer: Rc<dyn OverlayRenderer>,
    ) -> Result<(), PanelError> {
        if self.cleaned_up.get() {
            return Err(PanelError::RegisterAfterCleanup {
                display: self.display.to_string(),
            });
        }

        renderer.attach(&self.channel);
        {
            let mut renderers = self.renderers.borrow_mut();
            let index = index.min(renderers.len());
            renderers.insert(index, renderer);
        }
        self.redo_layout();
        Ok(())
    }

    /// Release the channel subscription and detach every renderer.
    /// Safe to call more than once.
    pub fn cleanup(&self) {
        if self.cleaned_up.replace(true) {
            return;
        }

        if let Some(mut subscription) = self.subscription.borrow_mut().take() {
            subscription.cancel();
        }
        for renderer in self.renderers.borrow().iter() {
            renderer.detach();
        }
        debug!("{}: cleaned up", self.label);
    }

    pub fn is_cleaned_up(&self) -> bool {
        self.cleaned_up.get()
    }

    /// Renderer names in paint order
    pub fn layout(&self) -> Vec<String> {
        self.layout.borrow().clone()
    }

    pub fn renderer_count(&self) -> usize {
        self.renderers.borrow().len()
    }

    pub fn display(&self) -> &DisplayHandle {
        &self.display
    }

    /// Registration id while subscribed
    pub fn subscriber_id(&self) -> Option<SubscriberId> {
        self.subscription.borrow().as_ref().map(Subscription::id)
    }

    fn redo_layout(&self) {
        let names: Vec<String> = self
            .renderers
            .borrow()
            .iter()
            .map(|r| r.name().to_string())
            .collect();
        debug!("{}: layout {:?}", self.label, names);
        *self.layout.borrow_mut() = names;

        self.channel.post(LayoutChangedEvent.into());
    }
}

impl Subscriber for OverlaysPanel {
    fn label(&self) -> &str {
        &self.label
    }

    fn interest(&self) -> &[EventKind] {
        INTEREST
    }

    fn handle(&self, event: &DisplayEvent) -> anyhow::Result<()> {
        if let DisplayEvent::CanvasDraw(draw) = event {
            self.on_canvas_draw(draw);
        }
        Ok(())
    }
}

/// Builder for an overlays panel
pub struct OverlaysPanelBuilder {
    display: DisplayHandle,
    canvas: Rc<ImageCanvas>,
    channel: Rc<DisplayEventChannel>,
    images: Option<Rc<dyn ImageSource>>,
    renderers: Vec<Rc<dyn OverlayRenderer>>,
}

impl OverlaysPanelBuilder {
    /// Where the visible image is looked up at draw time
    pub fn image_source(mut self, images: Rc<dyn ImageSource>) -> Self {
        self.images = Some(images);
        self
    }

    /// Append a renderer; call order is paint order
    pub fn renderer(mut self, renderer: Rc<dyn OverlayRenderer>) -> Self {
        self.renderers.push(renderer);
        self
    }

    /// Register with the channel, install renderers, then build the layout.
    ///
    /// The layout build posts exactly one `LayoutChangedEvent`.
    pub fn build(self) -> Result<Rc<OverlaysPanel>, PanelError> {
        let images = self.images.ok_or(PanelError::MissingImageSource)?;

        let panel = Rc::new(OverlaysPanel {
            label: format!("overlays {}", self.display),
            display: self.display,
            canvas: self.canvas,
            images,
            channel: self.channel,
            renderers: RefCell::new(Vec::new()),
            layout: RefCell::new(Vec::new()),
            subscription: RefCell::new(None),
            cleaned_up: Cell::new(false),
        });

        let weak: Weak<OverlaysPanel> = Rc::downgrade(&panel);
        let subscription = panel.channel.subscribe(weak)?;
        *panel.subscription.borrow_mut() = Some(subscription);

        for renderer in self.renderers {
            renderer.attach(&panel.channel);
            panel.renderers.borrow_mut().push(renderer);
        }

        panel.redo_layout();
        Ok(panel)
    }
}
