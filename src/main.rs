use std::rc::Rc;

use anyhow::Result;
use chrono::{Local, TimeDelta};
use clap::Parser;
use log::info;

use display_overlays::cli::Cli;
use display_overlays::data::{Coords, Image, ImageMetadata, MemoryDatastore};
use display_overlays::{DisplaySettings, DisplayWindow};

// === Constants ===

const FRAME_INTERVAL_MS: i64 = 500;
const PIXEL_SIZE_UM: f64 = 0.325;

/// Synthetic time series with one gradient plane per timepoint
fn demo_store(cli: &Cli, settings: &DisplaySettings) -> MemoryDatastore {
    let store = MemoryDatastore::new();
    let (width, height) = (settings.canvas.width, settings.canvas.height);
    let start = Local::now();

    for t in 0..cli.frames {
        if cli.drop_frame == Some(t) {
            continue;
        }
        let elapsed = FRAME_INTERVAL_MS * t as i64;
        let mut image = Image::blank(Coords::new().with_time(t), width, height).with_metadata(
            ImageMetadata {
                elapsed_ms: Some(elapsed as f64),
                pixel_size_um: Some(PIXEL_SIZE_UM),
                received: Some(start + TimeDelta::milliseconds(elapsed)),
            },
        );
        for (i, px) in image.pixels.iter_mut().enumerate() {
            *px = ((i as u32 % width.max(1)) * 64 + t as u32) as u16;
        }
        store.put_image(image);
    }

    store
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => DisplaySettings::load(path)?,
        None => DisplaySettings::default(),
    };
    if let Some(width) = cli.width {
        settings.canvas.width = width;
    }
    if let Some(height) = cli.height {
        settings.canvas.height = height;
    }

    let store = Rc::new(demo_store(&cli, &settings));
    let mut window = DisplayWindow::open("demo stack", store.clone(), &settings)?;
    window.show();
    info!("overlay layout: {:?}", window.overlays().layout());

    for t in 0..cli.frames {
        window.set_coords(Coords::new().with_time(t));
        if let Some(frame) = window.paint() {
            info!(
                "frame {} at {}: {} draw op(s)",
                frame.number,
                frame.coords,
                frame.op_count()
            );
        }
    }

    if let Some(mode) = cli.save {
        window.save_command().activate(mode);
    }

    window.close();
    info!(
        "painted {} frame(s), {} save request(s)",
        window.frames_painted(),
        store.save_requests().len()
    );
    Ok(())
}
