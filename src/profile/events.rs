use std::cell::RefCell;
use std::rc::Rc;

/// Change notifications for overlay renderers. Renderers drop any cached
/// marker for the named profile on `Cleared`, `ProfileRemoved` and `SampleCleared`.
/// A rename arrives as `ProfileRemoved` for the old name then `ProfileAdded`.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileEvent {
    PointAdded {
        sample_id: String,
        profile: String,
        index: usize,
        x: f64,
        y: f64,
    },
    PointMoved {
        sample_id: String,
        profile: String,
        index: usize,
        x: f64,
        y: f64,
    },
    PointRemoved {
        sample_id: String,
        profile: String,
        index: usize,
    },
    Cleared {
        sample_id: String,
        profile: String,
    },
    Interpolated {
        sample_id: String,
        profile: String,
        points: usize,
    },
    /// Created, renamed into place or read back by `load_all`.
    ProfileAdded {
        sample_id: String,
        profile: String,
    },
    ProfileRemoved {
        sample_id: String,
        profile: String,
    },
    SampleCleared {
        sample_id: String,
    },
}

pub trait ProfileObserver {
    fn notify(&mut self, event: &ProfileEvent);
}

/// Records every event; clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<ProfileEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProfileEvent> {
        self.events.borrow().clone()
    }

    pub fn take(&self) -> Vec<ProfileEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }
}

impl ProfileObserver for EventLog {
    fn notify(&mut self, event: &ProfileEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

/// Forwards events to the tracing subscriber at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceObserver;

impl ProfileObserver for TraceObserver {
    fn notify(&mut self, event: &ProfileEvent) {
        crate::debug!("profile event: {:?}", event);
    }
}
