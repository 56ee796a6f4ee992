//! Headless display window tying the overlay pipeline together.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use crossbeam_channel::{Receiver, Sender};
use log::{debug, info, warn};

use crate::config::DisplaySettings;
use crate::core::{
    CanvasDrawEvent, DisplayAboutToShowEvent, DisplayDestroyedEvent, DisplayEvent,
    DisplayEventChannel, DisplayHandle, DisplayInfo, EventKind, Frame, Graphics, ImageCanvas,
    LayoutChangedEvent, OverlaysPanel, RedrawRequestedEvent, Subscription,
};
use crate::data::Coords;
use crate::error::PanelError;
use crate::save::SaveCommand;
use crate::traits::{Datastore, ImageSource, Subscriber};

/// Notification another thread can hand to the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteNotice {
    LayoutChanged,
    RedrawRequested,
}

/// `Send` handle for notifying a display from any thread.
///
/// Notices wait until the display's thread calls `DisplayWindow::pump_remote`.
#[derive(Debug, Clone)]
pub struct RemoteNotifier {
    tx: Sender<RemoteNotice>,
}

impl RemoteNotifier {
    /// Queue a notice. False once the window has been dropped.
    pub fn notify(&self, notice: RemoteNotice) -> bool {
        self.tx.send(notice).is_ok()
    }
}

const WATCHED: &[EventKind] = &[EventKind::LayoutChanged, EventKind::RedrawRequested];

/// The window's own subscriber: tracks layout revisions and repaint requests
struct LayoutWatcher {
    label: String,
    revision: Cell<u64>,
    dirty: Cell<bool>,
}

impl Subscriber for LayoutWatcher {
    fn label(&self) -> &str {
        &self.label
    }

    fn interest(&self) -> &[EventKind] {
        WATCHED
    }

    fn handle(&self, event: &DisplayEvent) -> anyhow::Result<()> {
        match event {
            DisplayEvent::LayoutChanged(_) => {
                self.revision.set(self.revision.get() + 1);
                self.dirty.set(true);
            }
            DisplayEvent::RedrawRequested(request) => {
                debug!("{}: redraw requested: {}", self.label, request.reason());
                self.dirty.set(true);
            }
            _ => {}
        }
        Ok(())
    }
}

/// One image display: channel, canvas, overlays and save button
pub struct DisplayWindow {
    info: DisplayHandle,
    channel: Rc<DisplayEventChannel>,
    canvas: Rc<ImageCanvas>,
    overlays: Rc<OverlaysPanel>,
    save: SaveCommand,
    watcher: Rc<LayoutWatcher>,
    watcher_subscription: Option<Subscription>,
    remote_tx: Sender<RemoteNotice>,
    remote_rx: Receiver<RemoteNotice>,
    frames: u64,
    shown: bool,
    closed: bool,
}

impl DisplayWindow {
    /// Build a window over `store` with the default overlays
    pub fn open<S>(
        title: impl Into<String>,
        store: Rc<S>,
        settings: &DisplaySettings,
    ) -> Result<Self, PanelError>
    where
        S: Datastore + 'static,
    {
        let info: DisplayHandle = Rc::new(DisplayInfo::new(title));
        let channel = DisplayEventChannel::new(info.to_string(), settings.channel.clone());
        let canvas = Rc::new(ImageCanvas::from_settings(&settings.canvas));

        // Registered before the panel so it sees the initial layout build
        let watcher = Rc::new(LayoutWatcher {
            label: format!("window {}", info),
            revision: Cell::new(0),
            dirty: Cell::new(true),
        });
        let weak: Weak<LayoutWatcher> = Rc::downgrade(&watcher);
        let watcher_subscription = channel.subscribe(weak)?;

        let images: Rc<dyn ImageSource> = store.clone();
        let overlays = OverlaysPanel::with_default_overlays(
            info.clone(),
            canvas.clone(),
            images,
            channel.clone(),
            settings,
        )?;
        let save = SaveCommand::new(store, info.window_handle());
        let (remote_tx, remote_rx) = crossbeam_channel::unbounded();

        info!("opened display {}", info);
        Ok(Self {
            info,
            channel,
            canvas,
            overlays,
            save,
            watcher,
            watcher_subscription: Some(watcher_subscription),
            remote_tx,
            remote_rx,
            frames: 0,
            shown: false,
            closed: false,
        })
    }

    /// Announce the window before it first appears. Only the first call posts.
    pub fn show(&mut self) -> bool {
        if self.shown || self.closed {
            return false;
        }
        self.shown = true;
        self.channel
            .post(DisplayAboutToShowEvent::new(self.info.clone()).into());
        true
    }

    /// Run one paint cycle and rasterize the overlay layer
    pub fn paint(&mut self) -> Option<Frame> {
        if self.closed {
            return None;
        }

        // Cleared first so redraw requests raised while painting survive the cycle
        self.watcher.dirty.set(false);
        let graphics = Rc::new(Graphics::new(self.canvas.width(), self.canvas.height()));
        let report = self
            .channel
            .post(CanvasDrawEvent::new(graphics.clone(), self.canvas.clone()).into());
        if !report.is_clean() {
            warn!(
                "{}: paint cycle had {} failure(s)",
                self.info,
                report.failures.len()
            );
        }

        self.frames += 1;
        Some(Frame::new(
            self.frames,
            self.canvas.current_image_coords(),
            graphics.ops(),
            graphics.rasterize(),
        ))
    }

    /// Show another plane; the next paint draws overlays for it
    pub fn set_coords(&mut self, coords: Coords) {
        self.canvas.set_current_image_coords(coords);
        self.watcher.dirty.set(true);
    }

    pub fn remote(&self) -> RemoteNotifier {
        RemoteNotifier {
            tx: self.remote_tx.clone(),
        }
    }

    /// Post every notice queued by other threads. Returns how many were posted.
    pub fn pump_remote(&mut self) -> usize {
        if self.closed {
            return 0;
        }

        let notices: Vec<RemoteNotice> = self.remote_rx.try_iter().collect();
        for notice in &notices {
            let event: DisplayEvent = match notice {
                RemoteNotice::LayoutChanged => LayoutChangedEvent.into(),
                RemoteNotice::RedrawRequested => RedrawRequestedEvent::new("remote").into(),
            };
            self.channel.post(event);
        }
        notices.len()
    }

    /// Tear down overlays and release subscriptions. Safe to call twice.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        self.overlays.cleanup();
        self.channel
            .post(DisplayDestroyedEvent::new(self.info.clone()).into());
        self.watcher_subscription.take();
        info!("closed display {}", self.info);
    }

    pub fn info(&self) -> &DisplayHandle {
        &self.info
    }

    pub fn channel(&self) -> &Rc<DisplayEventChannel> {
        &self.channel
    }

    pub fn canvas(&self) -> &Rc<ImageCanvas> {
        &self.canvas
    }

    pub fn overlays(&self) -> &Rc<OverlaysPanel> {
        &self.overlays
    }

    pub fn save_command(&self) -> &SaveCommand {
        &self.save
    }

    /// Number of layout changes seen since opening
    pub fn layout_revision(&self) -> u64 {
        self.watcher.revision.get()
    }

    pub fn needs_redraw(&self) -> bool {
        self.watcher.dirty.get()
    }

    pub fn frames_painted(&self) -> u64 {
        self.frames
    }

    pub fn is_shown(&self) -> bool {
        self.shown
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for DisplayWindow {
    fn drop(&mut self) {
        self.close();
    }
}
