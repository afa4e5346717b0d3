pub mod error;
pub mod grid;
pub mod model;
pub mod profile;
pub mod report;
pub mod stats;
pub mod tracing;

pub use error::{ProfileError, Result};
