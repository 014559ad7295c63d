//! In-memory bench stage.

mod orchestrator;
mod stage;
mod stats;

pub use orchestrator::Bench;
pub use stats::BenchStats;
