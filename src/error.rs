use thiserror::Error;

use crate::data::Coords;

/// Registration failures on a display event channel
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// The same subscriber identity is already in the registry
    #[error("subscriber `{label}` is already registered with this channel")]
    AlreadyRegistered { label: String },

    /// The subscriber was dropped before it could be registered
    #[error("subscriber was dropped before registration")]
    SubscriberGone,
}

/// Overlay panel lifecycle and construction failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PanelError {
    #[error(transparent)]
    Channel(#[from] ChannelError),

    /// Renderers cannot be added once the panel has released its subscription
    #[error("overlay panel for display {display} was already cleaned up")]
    RegisterAfterCleanup { display: String },

    /// Drawing needs an image source to resolve the visible image
    #[error("overlay panel has no image source configured")]
    MissingImageSource,
}

/// Image lookup failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    #[error("no image at {0}")]
    NotFound(Coords),
}
