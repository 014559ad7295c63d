//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the workspace:
//! the message model, the capabilities a pipe calls into (`Pump`, `Source`)
//! and the capabilities it exposes (`Pipe`, `TimedPipe`).
//! Business crates only depend on this crate, never on each other in reverse.
//!
//! ## Ownership Model
//! - A pipe owns its children (`Box<dyn Pump>`), fixed at construction
//! - Sources are shared by every message they produced (`Arc<dyn Source>`)
//! - Messages are borrowed by the pipe, never owned

mod config;
mod error;
mod message;
mod pipe;
mod pump;
mod source;

pub use config::*;
pub use error::*;
pub use message::{CommitToken, Message, Metadata};
pub use pipe::{Pipe, TimedPipe};
pub use pump::Pump;
pub use source::Source;
