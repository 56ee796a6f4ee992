use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use display_overlays::config::{ChannelSettings, DisplaySettings, ScaleBarSettings};
use display_overlays::core::{
    CanvasDrawEvent, DisplayEvent, DisplayEventChannel, DisplayInfo, DrawOp, DrawOutcome,
    EventKind, Graphics, ImageCanvas, OverlaysPanel,
};
use display_overlays::data::{Coords, Image, ImageMetadata, MemoryDatastore};
use display_overlays::overlays::{ScaleBarRenderer, TimestampRenderer};
use display_overlays::traits::{OverlayRenderer, Subscriber};
use display_overlays::{DataError, PanelError};

type Log = Rc<RefCell<Vec<String>>>;

/// Renderer that records its name when asked to paint
struct Recorder {
    name: String,
    log: Log,
    fail: bool,
    panic: bool,
    attached: Cell<usize>,
    detached: Cell<usize>,
}

impl Recorder {
    fn build(name: &str, log: &Log, fail: bool, panic: bool) -> Rc<Self> {
        Rc::new(Self {
            name: name.to_string(),
            log: log.clone(),
            fail,
            panic,
            attached: Cell::new(0),
            detached: Cell::new(0),
        })
    }

    fn new(name: &str, log: &Log) -> Rc<Self> {
        Self::build(name, log, false, false)
    }

    fn failing(name: &str, log: &Log) -> Rc<Self> {
        Self::build(name, log, true, false)
    }

    fn panicking(name: &str, log: &Log) -> Rc<Self> {
        Self::build(name, log, false, true)
    }
}

impl OverlayRenderer for Recorder {
    fn name(&self) -> &str {
        &self.name
    }

    fn draw_overlay(
        &self,
        _graphics: &Graphics,
        _display: &DisplayInfo,
        image: &Image,
        _canvas: &ImageCanvas,
    ) -> anyhow::Result<()> {
        self.log
            .borrow_mut()
            .push(format!("{}@t{}", self.name, image.coords.time));
        if self.panic {
            panic!("{} panicked", self.name);
        }
        if self.fail {
            anyhow::bail!("{} failed", self.name);
        }
        Ok(())
    }

    fn attach(&self, _channel: &Rc<DisplayEventChannel>) {
        self.attached.set(self.attached.get() + 1);
    }

    fn detach(&self) {
        self.detached.set(self.detached.get() + 1);
    }
}

/// Counts events of each kind it is registered for
struct Counter {
    interest: Vec<EventKind>,
    seen: RefCell<Vec<EventKind>>,
}

impl Counter {
    fn new(interest: &[EventKind]) -> Rc<Self> {
        Rc::new(Self {
            interest: interest.to_vec(),
            seen: RefCell::new(Vec::new()),
        })
    }

    fn count(&self, kind: EventKind) -> usize {
        self.seen.borrow().iter().filter(|k| **k == kind).count()
    }
}

impl Subscriber for Counter {
    fn label(&self) -> &str {
        "counter"
    }

    fn interest(&self) -> &[EventKind] {
        &self.interest
    }

    fn handle(&self, event: &DisplayEvent) -> anyhow::Result<()> {
        self.seen.borrow_mut().push(event.kind());
        Ok(())
    }
}

struct Fixture {
    display: Rc<DisplayInfo>,
    canvas: Rc<ImageCanvas>,
    store: Rc<MemoryDatastore>,
    channel: Rc<DisplayEventChannel>,
}

impl Fixture {
    fn new() -> Self {
        let store = Rc::new(MemoryDatastore::new());
        store.put_image(
            Image::blank(Coords::new(), 64, 64).with_metadata(ImageMetadata {
                elapsed_ms: Some(1_000.0),
                pixel_size_um: Some(0.5),
                received: None,
            }),
        );
        Self {
            display: Rc::new(DisplayInfo::new("fixture")),
            canvas: Rc::new(ImageCanvas::new(200, 200)),
            store,
            channel: DisplayEventChannel::new("fixture", ChannelSettings::default()),
        }
    }

    fn panel(&self, renderers: Vec<Rc<dyn OverlayRenderer>>) -> Rc<OverlaysPanel> {
        let mut builder =
            OverlaysPanel::builder(self.display.clone(), self.canvas.clone(), self.channel.clone())
                .image_source(self.store.clone());
        for renderer in renderers {
            builder = builder.renderer(renderer);
        }
        builder.build().unwrap()
    }

    fn draw_event(&self) -> (Rc<Graphics>, CanvasDrawEvent) {
        let graphics = Rc::new(Graphics::new(self.canvas.width(), self.canvas.height()));
        let event = CanvasDrawEvent::new(graphics.clone(), self.canvas.clone());
        (graphics, event)
    }

    fn post_draw(&self) -> Rc<Graphics> {
        let (graphics, event) = self.draw_event();
        self.channel.post(event.into());
        graphics
    }
}

fn weak<S: Subscriber + 'static>(subscriber: &Rc<S>) -> Weak<dyn Subscriber> {
    let weak: Weak<S> = Rc::downgrade(subscriber);
    weak
}

fn entries(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_construction_posts_layout_changed_exactly_once() {
    let fixture = Fixture::new();
    let counter = Counter::new(&[EventKind::LayoutChanged]);
    let _sub = fixture.channel.subscribe(weak(&counter)).unwrap();
    let log = Log::default();

    let _panel = fixture.panel(vec![Recorder::new("a", &log), Recorder::new("b", &log)]);

    assert_eq!(counter.count(EventKind::LayoutChanged), 1);
}

#[test]
fn test_construction_registers_panel_and_attaches_renderers() {
    let fixture = Fixture::new();
    let log = Log::default();
    let a = Recorder::new("a", &log);

    let panel = fixture.panel(vec![a.clone()]);

    assert_eq!(fixture.channel.subscriber_count(), 1);
    let id = panel.subscriber_id().unwrap();
    assert!(fixture.channel.is_registered(id));
    assert_eq!(a.attached.get(), 1);
    assert_eq!(panel.layout(), vec!["a"]);
}

#[test]
fn test_missing_image_source_is_rejected() {
    let fixture = Fixture::new();
    let result =
        OverlaysPanel::builder(fixture.display.clone(), fixture.canvas.clone(), fixture.channel.clone())
            .build();

    assert_eq!(result.err(), Some(PanelError::MissingImageSource));
    assert_eq!(fixture.channel.subscriber_count(), 0);
}

#[test]
fn test_default_overlays_are_scale_bar_then_timestamp() {
    let fixture = Fixture::new();
    let panel = OverlaysPanel::with_default_overlays(
        fixture.display.clone(),
        fixture.canvas.clone(),
        fixture.store.clone(),
        fixture.channel.clone(),
        &DisplaySettings::default(),
    )
    .unwrap();

    assert_eq!(panel.layout(), vec!["Scale Bar", "Timestamp"]);
}

// ============================================================================
// Drawing
// ============================================================================

#[test]
fn test_renderers_paint_in_list_order() {
    let fixture = Fixture::new();
    let log = Log::default();
    let _panel = fixture.panel(vec![
        Recorder::new("ScaleBar", &log),
        Recorder::new("Timestamp", &log),
    ]);

    fixture.post_draw();

    assert_eq!(entries(&log), vec!["ScaleBar@t0", "Timestamp@t0"]);
}

#[test]
fn test_default_overlays_compose_scale_bar_below_timestamp() {
    let fixture = Fixture::new();
    let _panel = OverlaysPanel::with_default_overlays(
        fixture.display.clone(),
        fixture.canvas.clone(),
        fixture.store.clone(),
        fixture.channel.clone(),
        &DisplaySettings::default(),
    )
    .unwrap();

    let ops = fixture.post_draw().ops();

    assert_eq!(ops.len(), 3);
    assert!(matches!(&ops[0], DrawOp::Text { text, .. } if text == "10 µm"));
    assert!(matches!(ops[1], DrawOp::Rect { width: 20, .. }));
    assert!(matches!(&ops[2], DrawOp::Text { text, .. } if text == "00:00:01.000"));
}

#[test]
fn test_missing_image_skips_frame_without_invoking_renderers() {
    let fixture = Fixture::new();
    let log = Log::default();
    let panel = fixture.panel(vec![Recorder::new("a", &log)]);
    let missing = Coords::new().with_time(9);
    fixture.canvas.set_current_image_coords(missing);

    let (graphics, event) = fixture.draw_event();
    let outcome = panel.on_canvas_draw(&event);

    assert_eq!(outcome, DrawOutcome::Skipped(DataError::NotFound(missing)));
    assert!(entries(&log).is_empty());
    assert_eq!(graphics.op_count(), 0);

    let report = fixture.channel.post(event.into());
    assert!(report.is_clean());
}

#[test]
fn test_failing_renderer_does_not_stop_later_renderers() {
    let fixture = Fixture::new();
    let log = Log::default();
    let panel = fixture.panel(vec![
        Recorder::failing("A", &log),
        Recorder::new("B", &log),
    ]);

    let (_, event) = fixture.draw_event();
    let outcome = panel.on_canvas_draw(&event);

    assert_eq!(entries(&log), vec!["A@t0", "B@t0"]);
    assert_eq!(outcome, DrawOutcome::Composed { painted: 1, failed: 1 });
}

#[test]
fn test_panicking_renderer_does_not_stop_later_renderers() {
    let fixture = Fixture::new();
    let log = Log::default();
    let _panel = fixture.panel(vec![
        Recorder::panicking("A", &log),
        Recorder::new("B", &log),
    ]);

    let report = fixture.channel.post(fixture.draw_event().1.into());

    assert_eq!(entries(&log), vec!["A@t0", "B@t0"]);
    // Renderer failures stay inside the panel
    assert!(report.is_clean());
    assert_eq!(report.delivered, 1);
}

#[test]
fn test_draw_follows_canvas_coordinates() {
    let fixture = Fixture::new();
    let later = Coords::new().with_time(3);
    fixture.store.put_image(Image::blank(later, 8, 8));
    let log = Log::default();
    let _panel = fixture.panel(vec![Recorder::new("a", &log)]);

    fixture.post_draw();
    fixture.canvas.set_current_image_coords(later);
    fixture.post_draw();

    assert_eq!(entries(&log), vec!["a@t0", "a@t3"]);
}

// ============================================================================
// Layout changes
// ============================================================================

#[test]
fn test_insert_renderer_reorders_and_relayouts() {
    let fixture = Fixture::new();
    let counter = Counter::new(&[EventKind::LayoutChanged]);
    let _sub = fixture.channel.subscribe(weak(&counter)).unwrap();
    let log = Log::default();
    let panel = fixture.panel(vec![Recorder::new("b", &log)]);

    panel.insert_renderer(0, Recorder::new("a", &log)).unwrap();
    panel.add_renderer(Recorder::new("c", &log)).unwrap();
    panel.insert_renderer(99, Recorder::new("d", &log)).unwrap();

    assert_eq!(panel.layout(), vec!["a", "b", "c", "d"]);
    assert_eq!(counter.count(EventKind::LayoutChanged), 4);

    fixture.post_draw();
    assert_eq!(entries(&log), vec!["a@t0", "b@t0", "c@t0", "d@t0"]);
}

#[test]
fn test_renderer_settings_change_requests_redraw() {
    let fixture = Fixture::new();
    let counter = Counter::new(&[EventKind::RedrawRequested]);
    let _sub = fixture.channel.subscribe(weak(&counter)).unwrap();
    let scale_bar = Rc::new(ScaleBarRenderer::new(ScaleBarSettings::default()));
    let timestamp = Rc::new(TimestampRenderer::new(Default::default()));
    let panel = fixture.panel(vec![scale_bar.clone(), timestamp.clone()]);

    scale_bar.set_settings(ScaleBarSettings {
        length_um: 25.0,
        ..ScaleBarSettings::default()
    });
    timestamp.set_settings(Default::default());
    assert_eq!(counter.count(EventKind::RedrawRequested), 2);

    panel.cleanup();
    scale_bar.set_settings(ScaleBarSettings::default());
    assert_eq!(counter.count(EventKind::RedrawRequested), 2);
}

// ============================================================================
// Cleanup
// ============================================================================

#[test]
fn test_cleanup_twice_unregisters_once() {
    let fixture = Fixture::new();
    let counter = Counter::new(&[EventKind::LayoutChanged]);
    let _sub = fixture.channel.subscribe(weak(&counter)).unwrap();
    let log = Log::default();
    let renderer = Recorder::new("a", &log);
    let panel = fixture.panel(vec![renderer.clone()]);
    assert_eq!(fixture.channel.subscriber_count(), 2);

    panel.cleanup();
    panel.cleanup();

    assert!(panel.is_cleaned_up());
    assert!(panel.subscriber_id().is_none());
    assert_eq!(fixture.channel.subscriber_count(), 1);
    assert_eq!(renderer.detached.get(), 1);
}

#[test]
fn test_no_draws_after_cleanup() {
    let fixture = Fixture::new();
    let log = Log::default();
    let panel = fixture.panel(vec![Recorder::new("a", &log)]);
    panel.cleanup();

    let report = fixture.channel.post(fixture.draw_event().1.into());
    let (_, event) = fixture.draw_event();

    assert_eq!(report.delivered, 0);
    assert_eq!(panel.on_canvas_draw(&event), DrawOutcome::Inactive);
    assert!(entries(&log).is_empty());
}

#[test]
fn test_adding_renderer_after_cleanup_is_an_error() {
    let fixture = Fixture::new();
    let log = Log::default();
    let panel = fixture.panel(vec![]);
    panel.cleanup();

    let late = Recorder::new("late", &log);
    let err = panel.add_renderer(late.clone()).unwrap_err();

    assert!(matches!(err, PanelError::RegisterAfterCleanup { .. }));
    assert_eq!(late.attached.get(), 0);
    assert_eq!(panel.renderer_count(), 0);
}

#[test]
fn test_dropping_panel_releases_subscription() {
    let fixture = Fixture::new();
    let panel = fixture.panel(vec![]);
    assert_eq!(fixture.channel.subscriber_count(), 1);

    drop(panel);

    assert_eq!(fixture.channel.subscriber_count(), 0);
    let report = fixture.channel.post(fixture.draw_event().1.into());
    assert_eq!(report.delivered, 0);
}
