use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use log::info;

use super::coords::Coords;
use super::image::Image;
use crate::core::WindowHandle;
use crate::error::DataError;
use crate::save::SaveMode;
use crate::traits::{Datastore, ImageSource};

/// A save request the store received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub mode: SaveMode,
    pub window: WindowHandle,
}

/// Datastore keeping every plane in memory.
///
/// Saving only records the request.
#[derive(Debug, Default)]
pub struct MemoryDatastore {
    images: RefCell<BTreeMap<Coords, Rc<Image>>>,
    saves: RefCell<Vec<SaveRequest>>,
}

impl MemoryDatastore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a plane, replacing any plane at the same coordinates
    pub fn put_image(&self, image: Image) -> Option<Rc<Image>> {
        self.images.borrow_mut().insert(image.coords, Rc::new(image))
    }

    pub fn remove_image(&self, coords: &Coords) -> Option<Rc<Image>> {
        self.images.borrow_mut().remove(coords)
    }

    pub fn len(&self) -> usize {
        self.images.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.borrow().is_empty()
    }

    /// Coordinates of every stored plane in ascending order
    pub fn coords(&self) -> Vec<Coords> {
        self.images.borrow().keys().copied().collect()
    }

    pub fn save_requests(&self) -> Vec<SaveRequest> {
        self.saves.borrow().clone()
    }
}

impl ImageSource for MemoryDatastore {
    fn image(&self, coords: &Coords) -> Result<Rc<Image>, DataError> {
        self.images
            .borrow()
            .get(coords)
            .cloned()
            .ok_or(DataError::NotFound(*coords))
    }
}

impl Datastore for MemoryDatastore {
    fn save(&self, mode: SaveMode, window: &WindowHandle) {
        info!(
            "save requested for {} ({} planes): {}",
            window.title,
            self.len(),
            mode.label()
        );
        self.saves.borrow_mut().push(SaveRequest {
            mode,
            window: window.clone(),
        });
    }
}
