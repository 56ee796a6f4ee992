pub mod cli;
pub mod config;
pub mod core;
pub mod data;
pub mod display;
pub mod error;
pub mod overlays;
pub mod save;
pub mod traits;

pub use config::DisplaySettings;
pub use display::{DisplayWindow, RemoteNotice, RemoteNotifier};
pub use error::{ChannelError, DataError, PanelError};
pub use save::{SaveCommand, SaveMode};
