//! Pump trait - downstream consumer interface
//!
//! Defines the abstract interface for the next processing stage.

use crate::{ContractError, Message};

/// Downstream consumer trait
///
/// Everything a pipe can forward a message to implements this trait.
/// A pump is owned by exactly one pipe and driven serially.
pub trait Pump: Send {
    /// Pump name (used for errors/logging)
    fn name(&self) -> &str;

    /// Accept a message for further processing
    ///
    /// # Errors
    /// Returns process error (should include context)
    fn process(&mut self, msg: &Message) -> Result<(), ContractError>;
}
