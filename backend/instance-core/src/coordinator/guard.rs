use crate::registry::PortMarker;

use log::warn;

/// Removes the port marker when dropped.
///
/// Held for the whole `SERVING` state so the marker disappears on clean
/// stop, server failure, signal-driven shutdown and unwinding alike.
pub(crate) struct MarkerGuard<'a> {
    marker: &'a PortMarker,
}

impl<'a> MarkerGuard<'a> {
    pub(crate) fn new(marker: &'a PortMarker) -> Self {
        Self { marker }
    }
}

impl Drop for MarkerGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.marker.remove() {
            warn!("Failed to remove port marker on shutdown: {e}");
        }
    }
}
