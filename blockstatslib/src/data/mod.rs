//! Data collection: walk a world region and count what is in it.
//!
//! This module is the first stage of the pipeline:
//!
//! - **TypeKey**: identifier of a counted kind (block type, block-entity type)
//! - **TypeCounter**: accumulated counts plus chunk bookkeeping
//! - **SpatialAggregator**: box/radius/region traversal feeding a counter
//! - **SessionRegistry**: one aggregator per requester, kept across commands
//!
//! Querying and formatting live in the `query` and `output` modules.

pub mod aggregator;
pub mod counter;
pub mod key;
pub mod session;

pub use aggregator::{CountTarget, SpatialAggregator};
pub use counter::TypeCounter;
pub use key::TypeKey;
pub use session::{Requester, SessionRegistry};
