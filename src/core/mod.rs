pub mod canvas;
pub mod channel;
pub mod display_info;
pub mod events;
pub mod frame;
pub mod graphics;
pub mod overlays_panel;

pub use canvas::*;
pub use channel::{DeliveryFailure, DeliveryReport, DisplayEventChannel, SubscriberId, Subscription};
pub use display_info::*;
pub use events::*;
pub use frame::*;
pub use graphics::*;
pub use overlays_panel::*;
