pub mod config;
pub mod error;
pub mod loader;
pub mod output;
pub mod pipeline;

pub use config::{GradeBin, RosterConfig, TiePolicy};
pub use error::{Result, RosterError};
pub use pipeline::Pipeline;
pub use pipeline::types::{GroupStats, RawRecord, Record, SummaryStats};
