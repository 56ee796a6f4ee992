// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use clap::Parser;

use crate::save::SaveMode;

#[derive(Parser, Debug, Clone)]
#[command(name = "display-overlays")]
#[command(about = "Paint overlays for a synthetic image stack", long_about = None)]
pub struct Cli {
    /// Display settings JSON file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of timepoints to generate and paint
    #[arg(long, default_value_t = 5)]
    pub frames: usize,

    /// Canvas width, overrides the settings file
    #[arg(long)]
    pub width: Option<u32>,

    /// Canvas height, overrides the settings file
    #[arg(long)]
    pub height: Option<u32>,

    /// Leave this timepoint out of the stack
    #[arg(long = "drop-frame")]
    pub drop_frame: Option<usize>,

    /// Save mode to activate after painting
    #[arg(long, value_enum)]
    pub save: Option<SaveMode>,
}
