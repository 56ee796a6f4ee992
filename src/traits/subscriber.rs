use crate::core::{DisplayEvent, EventKind};

/// Receiver of display channel notifications
pub trait Subscriber {
    /// Name used in log output and failure reports
    fn label(&self) -> &str;

    /// Event kinds this subscriber handles. Read once at registration.
    fn interest(&self) -> &[EventKind];

    /// Handle one notification. Errors are reported by the channel and do
    /// not stop delivery to other subscribers.
    fn handle(&self, event: &DisplayEvent) -> anyhow::Result<()>;
}
