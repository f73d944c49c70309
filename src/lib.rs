//! Turn an OSE points-of-diversion export into maps, an animation, a
//! cumulative chart and a GeoJSON point layer.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod fetch;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod project;
pub mod render;
pub mod schema;

pub use config::Config;
pub use error::{DateError, ProjectionError, RecordError};
pub use pipeline::{run, RunSummary};
