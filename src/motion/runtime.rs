use super::{Surface, Synchronizer};
use crate::log::{LogLevel, Logger};
use std::cell::{Ref, RefCell, RefMut};

/// A synchronizer and its surface behind one pair of cells, so that event
/// callbacks can share them.
pub struct Runtime<S> {
    sync: RefCell<Synchronizer>,
    surface: RefCell<S>,
    logger: Logger,
}

impl<S: Surface> Runtime<S> {
    pub fn new(sync: Synchronizer, surface: S, logger: Logger) -> Self {
        Self {
            sync: RefCell::new(sync),
            surface: RefCell::new(surface),
            logger,
        }
    }

    pub fn surface(&self) -> Ref<'_, S> {
        self.surface.borrow()
    }

    pub fn surface_mut(&self) -> RefMut<'_, S> {
        self.surface.borrow_mut()
    }

    /// Runs `handler` with both halves borrowed. When either is already
    /// borrowed the event is dropped, logged, and `false` returned.
    pub fn dispatch(&self, event: &str, handler: impl FnOnce(&mut Synchronizer, &mut S)) -> bool {
        let (Ok(mut sync), Ok(mut surface)) = (self.sync.try_borrow_mut(), self.surface.try_borrow_mut())
        else {
            self.logger.event(
                LogLevel::Warn,
                "motion_event_dropped",
                serde_json::json!({ "event_name": event }),
            );
            return false;
        };

        handler(&mut *sync, &mut *surface);
        true
    }
}
