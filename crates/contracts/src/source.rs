//! Source trait - upstream origin of records
//!
//! Only the acknowledgement half of a source is part of the contract;
//! how records are read or partitioned belongs to the source itself.

use crate::{CommitToken, ContractError};

/// Upstream data source trait
///
/// A message records, for every source in its lineage, the token needed to
/// acknowledge consumption. Pipes hand that token back through `commit`.
///
/// Sources are shared (`Arc<dyn Source>`) by every message they produced, so
/// `commit` takes `&self`; implementations synchronize internally.
pub trait Source: Send + Sync {
    /// Source name (used for errors/logging/metrics)
    fn name(&self) -> &str;

    /// Durably acknowledge `token`, typically advancing a read offset
    ///
    /// # Errors
    /// Returns commit error (should include context)
    fn commit(&self, token: &CommitToken) -> Result<(), ContractError>;
}
