use crate::error::Result;
use crate::grid::FieldSource;
use crate::profile::aggregate::{FieldValues, aggregate_at};
use crate::profile::store::ProfileStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    Idle,
    Placing,
    Moving,
    /// A point was picked in `Moving`; the next primary click is its new position.
    AwaitingTarget { index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Click {
    Primary { x: f64, y: f64 },
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Ignored,
    Added(usize),
    Selected(usize),
    NoPointNearby,
    Moved(usize),
    Cancelled,
}

/// Click-driven editing of one profile. All mutation goes through the store.
#[derive(Debug, Clone)]
pub struct EditSession {
    sample_id: String,
    profile: String,
    snap_tolerance: f64,
    mode: EditMode,
}

impl EditSession {
    pub fn new(
        sample_id: impl Into<String>,
        profile: impl Into<String>,
        snap_tolerance: f64,
    ) -> Self {
        Self {
            sample_id: sample_id.into(),
            profile: profile.into(),
            snap_tolerance,
            mode: EditMode::Idle,
        }
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn start_placing(&mut self) {
        self.mode = EditMode::Placing;
    }

    pub fn start_moving(&mut self) {
        self.mode = EditMode::Moving;
    }

    pub fn cancel(&mut self) {
        self.mode = EditMode::Idle;
    }

    pub fn click(
        &mut self,
        store: &mut ProfileStore,
        source: &dyn FieldSource,
        click: Click,
    ) -> Result<EditOutcome> {
        let (x, y) = match click {
            Click::Secondary => {
                let was_idle = self.mode == EditMode::Idle;
                self.mode = EditMode::Idle;
                return Ok(if was_idle {
                    EditOutcome::Ignored
                } else {
                    EditOutcome::Cancelled
                });
            }
            Click::Primary { x, y } => (x, y),
        };

        match self.mode {
            EditMode::Idle => Ok(EditOutcome::Ignored),
            EditMode::Placing => {
                let values = self.collect(store, source, x, y)?;
                let index = store.add_point(&self.sample_id, &self.profile, x, y, values, None)?;
                Ok(EditOutcome::Added(index))
            }
            EditMode::Moving => {
                let profile = store.get(&self.sample_id, &self.profile)?;
                match profile.nearest_point(x, y, self.snap_tolerance) {
                    Some(index) => {
                        self.mode = EditMode::AwaitingTarget { index };
                        Ok(EditOutcome::Selected(index))
                    }
                    None => Ok(EditOutcome::NoPointNearby),
                }
            }
            EditMode::AwaitingTarget { index } => {
                // The selection is consumed even when the move fails.
                self.mode = EditMode::Idle;
                let values = self.collect(store, source, x, y)?;
                store.move_point(&self.sample_id, &self.profile, index, x, y, values)?;
                Ok(EditOutcome::Moved(index))
            }
        }
    }

    /// A profile without points adopts every field of the active sample.
    fn collect(
        &self,
        store: &ProfileStore,
        source: &dyn FieldSource,
        x: f64,
        y: f64,
    ) -> Result<FieldValues> {
        let profile = store.get(&self.sample_id, &self.profile)?;
        let mut fields = profile.field_names();
        if profile.is_empty() && fields.is_empty() {
            fields = source.field_names();
        }
        Ok(aggregate_at(source, x, y, profile.metadata().radius, &fields)?.values)
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/profile/session.rs"]
mod tests;
