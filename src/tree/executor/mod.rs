//! Group runners.
//!
//! - [`sequential`]: run tasks one after another, skipping the rest after a failure
//! - [`parallel`]: run tasks concurrently, aborting running siblings after a failure

pub mod parallel;
pub mod sequential;


pub use parallel::run_parallel;
pub use sequential::run_sequential;
