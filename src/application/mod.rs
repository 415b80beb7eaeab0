pub mod ports;
pub mod scheduler;
pub mod usecases;

pub use ports::*;
pub use scheduler::{Scheduler, SchedulerSettings};
