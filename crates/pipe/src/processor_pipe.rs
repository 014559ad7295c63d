//! ProcessorPipe - routes a stage's output to its children and sources

use std::fmt;
use std::time::Duration;

use contracts::{ContractError, Message, Pipe, Pump, TimedPipe};

use crate::stopwatch::Stopwatch;

/// Router between one processing stage and the rest of the topology.
///
/// Children are fixed at construction; their order is the wiring order used
/// by `forward_all` and the index space of `forward_to`.
///
/// Every `Pipe` call adds its full wall-clock time to the pipe duration,
/// whether it succeeds, fails on a child or source, or fails its bounds
/// check. The pipe never retries, logs or swallows an error: the first one
/// stops the call and is returned unchanged.
///
/// # Concurrency
///
/// Not synchronized. Callers that share a pipe between tasks must wrap it
/// themselves (`Mutex`, or a single owning task).
///
/// # Example
///
/// ```ignore
/// let mut pipe = ProcessorPipe::new(vec![Box::new(enrich), Box::new(audit)]);
///
/// pipe.forward_all(&msg)?;
/// pipe.commit(&msg)?;
///
/// // at the end of a reporting window
/// let spent = pipe.duration();
/// pipe.reset();
/// ```
#[derive(Default)]
pub struct ProcessorPipe {
    children: Vec<Box<dyn Pump>>,
    duration: Duration,
}

impl ProcessorPipe {
    /// Create a pipe wired to `children`, in that order
    pub fn new(children: Vec<Box<dyn Pump>>) -> Self {
        Self {
            children,
            duration: Duration::ZERO,
        }
    }

    /// Number of wired children
    pub fn children_len(&self) -> usize {
        self.children.len()
    }

    /// Whether the stage is a sink of the topology
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Children names in wiring order
    fn child_names(&self) -> impl Iterator<Item = &str> {
        self.children.iter().map(|child| child.name())
    }
}

impl Pipe for ProcessorPipe {
    fn forward_all(&mut self, msg: &Message) -> Result<(), ContractError> {
        let _timer = Stopwatch::start(&mut self.duration);

        for child in &mut self.children {
            child.process(msg)?;
        }

        Ok(())
    }

    fn forward_to(&mut self, msg: &Message, index: usize) -> Result<(), ContractError> {
        let _timer = Stopwatch::start(&mut self.duration);

        let len = self.children.len();
        let child = self
            .children
            .get_mut(index)
            .ok_or_else(|| ContractError::child_out_of_bounds(index, len))?;

        child.process(msg)
    }

    fn commit(&mut self, msg: &Message) -> Result<(), ContractError> {
        let _timer = Stopwatch::start(&mut self.duration);

        for (source, token) in msg.metadata().iter() {
            source.commit(token)?;
        }

        Ok(())
    }
}

impl TimedPipe for ProcessorPipe {
    fn reset(&mut self) {
        self.duration = Duration::ZERO;
    }

    fn duration(&self) -> Duration {
        self.duration
    }
}

impl fmt::Debug for ProcessorPipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorPipe")
            .field("children", &self.child_names().collect::<Vec<_>>())
            .field("duration", &self.duration)
            .finish()
    }
}
