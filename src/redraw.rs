//! Decides when a frame is worth drawing.
//!
//! The image only changes when the view or the viewport does, so instead of a
//! fixed frame rate there is a dirty flag. Any number of triggers between two
//! frames collapse into a single redraw.

use log::{debug, trace};

use crate::screen;

#[derive(Debug)]
pub struct RedrawCoordinator {
    dirty: bool,
    size: screen::Size,
    coalesced: u64,
}

impl RedrawCoordinator {
    /// Starts dirty so that the first frame gets drawn.
    pub fn new(size: screen::Size) -> Self {
        RedrawCoordinator {
            dirty: true,
            size,
            coalesced: 0,
        }
    }

    pub fn size(&self) -> screen::Size {
        self.size
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The view changed.
    pub fn invalidate(&mut self) {
        if self.dirty {
            self.coalesced += 1;
            trace!("redraw already pending, coalesced {}", self.coalesced);
        }
        self.dirty = true;
    }

    /// The viewport changed. Returns whether the size is actually new.
    pub fn resize(&mut self, size: screen::Size) -> bool {
        if size == self.size {
            return false;
        }
        debug!("viewport {}x{}", size.width, size.height);
        self.size = size;
        self.invalidate();
        true
    }

    /// Consumes the pending redraw, if any. An empty viewport keeps it
    /// pending until there is something to draw into.
    pub fn take(&mut self) -> bool {
        if !self.dirty || self.size.is_empty() {
            return false;
        }
        self.dirty = false;
        self.coalesced = 0;
        true
    }
}
