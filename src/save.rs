//! Save menu forwarding the user's choice to the datastore.

use std::fmt;
use std::rc::Rc;

use clap::ValueEnum;
use log::info;
use serde::{Deserialize, Serialize};

use crate::core::WindowHandle;
use crate::traits::Datastore;

/// How a datastore writes its planes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SaveMode {
    /// One file per image plane
    SeparateFiles,
    /// Every plane in one multi-page file
    #[serde(rename = "multipage-file")]
    #[value(name = "multipage-file")]
    SingleMultiPageFile,
}

impl SaveMode {
    /// Menu order
    pub const ALL: [SaveMode; 2] = [SaveMode::SeparateFiles, SaveMode::SingleMultiPageFile];

    pub fn label(self) -> &'static str {
        match self {
            SaveMode::SeparateFiles => "Save to separate image files",
            SaveMode::SingleMultiPageFile => "Save to single multistack image",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.label() == label)
    }
}

impl fmt::Display for SaveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Save button of a display window
pub struct SaveCommand {
    store: Rc<dyn Datastore>,
    window: WindowHandle,
}

impl SaveCommand {
    pub fn new(store: Rc<dyn Datastore>, window: WindowHandle) -> Self {
        Self { store, window }
    }

    /// Menu entries in display order
    pub fn menu(&self) -> Vec<(&'static str, SaveMode)> {
        SaveMode::ALL.iter().map(|mode| (mode.label(), *mode)).collect()
    }

    /// Forward a save request; returns as soon as the store has it
    pub fn activate(&self, mode: SaveMode) {
        info!("{}: {}", self.window.title, mode.label());
        self.store.save(mode, &self.window);
    }

    /// Activate the entry with this menu label. Unknown labels do nothing.
    pub fn activate_label(&self, label: &str) -> bool {
        match SaveMode::from_label(label) {
            Some(mode) => {
                self.activate(mode);
                true
            }
            None => false,
        }
    }

    pub fn window(&self) -> &WindowHandle {
        &self.window
    }
}
