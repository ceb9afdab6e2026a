//! Movement records and the merge engine that reconciles them with persisted collections.

mod merge;
mod types;

pub use merge::{merge, MergeOutcome};
pub use types::{IdentityKey, MergeError, MovementRecord};
