use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_DISPLAY_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique display identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DisplayId(u64);

impl DisplayId {
    pub fn next() -> Self {
        Self(NEXT_DISPLAY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for DisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of one display window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayInfo {
    id: DisplayId,
    title: String,
}

/// Shared reference handed to renderers and carried by notifications
pub type DisplayHandle = Rc<DisplayInfo>;

impl DisplayInfo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: DisplayId::next(),
            title: title.into(),
        }
    }

    pub fn id(&self) -> DisplayId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Value handed to the persistence collaborator
    pub fn window_handle(&self) -> WindowHandle {
        WindowHandle {
            display: self.id,
            title: self.title.clone(),
        }
    }
}

impl fmt::Display for DisplayInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.title, self.id)
    }
}

/// Owned window reference for collaborators outside the display
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WindowHandle {
    pub display: DisplayId,
    pub title: String,
}
