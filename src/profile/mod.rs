pub mod aggregate;
pub mod coords;
pub mod events;
pub mod interpolate;
pub mod path;
pub mod session;
pub mod store;

pub use aggregate::{Aggregation, FieldValues, aggregate, aggregate_at};
pub use events::{EventLog, ProfileEvent, ProfileObserver};
pub use interpolate::{InterpolationSummary, interpolate};
pub use path::{ControlPoint, PointSeries, Profile};
pub use session::{Click, EditMode, EditOutcome, EditSession};
pub use store::{LoadFailure, LoadReport, ProfileStore};
