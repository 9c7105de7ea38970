#[allow(clippy::module_inception)]
mod coordinator;
mod summary;

pub use coordinator::Coordinator;
pub use summary::RunSummary;
