//! Pipe traits - what a processing stage sees of its router

use std::time::Duration;

use crate::{ContractError, Message};

/// Moves messages to the children of a stage and acknowledges them upstream.
///
/// Every method fails fast: the first error stops the fan-out and is returned
/// unchanged.
pub trait Pipe {
    /// Forward `msg` to every child, in wiring order.
    fn forward_all(&mut self, msg: &Message) -> Result<(), ContractError>;

    /// Forward `msg` to the child wired at `index`.
    fn forward_to(&mut self, msg: &Message, index: usize) -> Result<(), ContractError>;

    /// Commit every (source, token) pair of `msg` upstream.
    fn commit(&mut self, msg: &Message) -> Result<(), ContractError>;
}

/// A pipe that accumulates the time spent in its calls.
pub trait TimedPipe {
    /// Reset the accumulated duration to zero.
    fn reset(&mut self);

    /// Accumulated duration since construction or the last reset.
    fn duration(&self) -> Duration;
}
