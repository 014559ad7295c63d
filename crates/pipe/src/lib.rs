//! # Pipe
//!
//! Message routing and commit coordination for one processing stage.
//!
//! Responsibilities:
//! - Fan-out of a message to the children wired to the stage
//! - Forwarding to a single child by wiring position
//! - Commit fan-out to the sources in a message's lineage
//! - Metering of the time spent doing the above
//!
//! A `ProcessorPipe` is owned by exactly one worker; every operation takes
//! `&mut self` and nothing inside is synchronized.

mod processor_pipe;
mod stopwatch;

pub use contracts::{ContractError, Message, Pipe, Pump, Source, TimedPipe};
pub use processor_pipe::ProcessorPipe;
