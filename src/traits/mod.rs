pub mod datastore;
pub mod renderer;
pub mod subscriber;

pub use datastore::*;
pub use renderer::*;
pub use subscriber::*;
