//! Allocation engine for project rooms and the Oasis open workspace.
//!
//! Both schedulers are pure functions over a snapshot of submissions and a
//! resource configuration. Ties are broken with an explicit [`FairnessRng`],
//! so a run is reproducible from its seed.

extern crate alloc;

pub mod engine;
pub mod error;
pub mod fairness;
pub mod model;
pub mod oasis;
pub mod report;
pub mod rooms;

pub use engine::{AllocationEngine, AllocationRun, Resources, Snapshot, DEFAULT_DAILY_CAPACITY};
pub use error::{AdhocRejection, AllocationError, ConfigError, ValidationError};
pub use fairness::FairnessRng;
