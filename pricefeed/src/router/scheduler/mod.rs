pub mod backoff;
pub mod controller;
mod refresh;
pub mod scheduler_sm;

pub use controller::PollScheduler;
