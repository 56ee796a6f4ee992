// config.rs - Display settings loaded from JSON
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::Rgba;

/// All settings for one display window. Missing fields take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub canvas: CanvasSettings,
    pub channel: ChannelSettings,
    pub scale_bar: ScaleBarSettings,
    pub timestamp: TimestampSettings,
}

impl DisplaySettings {
    /// Parse settings from a JSON document
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("invalid display settings")
    }

    /// Read and parse a settings file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading display settings from {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("in {}", path.display()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasSettings {
    pub width: u32,
    pub height: u32,
    /// Screen pixels per image pixel
    pub magnification: f64,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            magnification: 1.0,
        }
    }
}

/// Limits on the event channel's re-entrancy queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelSettings {
    /// Events posted from inside a handler that may wait at once
    pub max_queued_events: usize,
    /// Queued events delivered per outer post before the rest are dropped
    pub max_drain_rounds: usize,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            max_queued_events: 64,
            max_drain_rounds: 256,
        }
    }
}

/// Canvas corner an overlay is anchored to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// Top-left position of an item of the given size placed in this corner
    pub fn anchor(self, canvas: (u32, u32), item: (u32, u32), margin: u32) -> (u32, u32) {
        let (cw, ch) = canvas;
        let (iw, ih) = item;
        let right = cw.saturating_sub(iw.saturating_add(margin));
        let bottom = ch.saturating_sub(ih.saturating_add(margin));
        match self {
            Corner::TopLeft => (margin, margin),
            Corner::TopRight => (right, margin),
            Corner::BottomLeft => (margin, bottom),
            Corner::BottomRight => (right, bottom),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleBarSettings {
    pub enabled: bool,
    /// Physical length of the bar
    pub length_um: f64,
    /// Bar thickness in screen pixels
    pub thickness: u32,
    pub color: Rgba,
    pub corner: Corner,
    pub show_label: bool,
}

impl Default for ScaleBarSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            length_um: 10.0,
            thickness: 4,
            color: Rgba::WHITE,
            corner: Corner::BottomRight,
            show_label: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimestampFormat {
    /// Time since acquisition start, `HH:MM:SS.mmm`
    Relative,
    /// Wall-clock receive time
    Absolute,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimestampSettings {
    pub enabled: bool,
    pub format: TimestampFormat,
    pub color: Rgba,
    pub corner: Corner,
}

impl Default for TimestampSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            format: TimestampFormat::Relative,
            color: Rgba::WHITE,
            corner: Corner::TopLeft,
        }
    }
}
