use std::rc::Rc;

use crate::core::WindowHandle;
use crate::data::{Coords, Image};
use crate::error::DataError;
use crate::save::SaveMode;

/// Source of the image planes a display shows
pub trait ImageSource {
    /// Plane at `coords`, or `DataError::NotFound`
    fn image(&self, coords: &Coords) -> Result<Rc<Image>, DataError>;
}

/// Image storage that can also persist its contents
pub trait Datastore: ImageSource {
    /// Start saving in the given mode. Reporting success or failure is up
    /// to the implementation; the caller does not wait.
    fn save(&self, mode: SaveMode, window: &WindowHandle);
}
