//! A shared-memory stress harness.
//!
//! Two waves of workers hammer a pair of shared buffers, the first one with direct stores and
//! the second one with atomic exchanges, while a coordinator prints everything they relay.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod relay;
pub mod reporting;
pub mod storage;
pub mod worker;

pub use config::{HarnessConfig, InjectedFault, Wave};
pub use coordinator::{Coordinator, RunSummary};
pub use error::{HarnessError, Result};
