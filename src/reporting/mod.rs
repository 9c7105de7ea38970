mod repeating;
mod reporter;
mod snapshot;

pub use repeating::RepeatingTask;
pub use reporter::ProgressReporter;
pub use snapshot::{FinalState, ProgressSnapshot, render};
