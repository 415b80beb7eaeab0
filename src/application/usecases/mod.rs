pub mod dispatch;
pub mod poll_target;

pub use dispatch::{DispatchOutcome, DispatchUseCase};
pub use poll_target::PollTargetUseCase;
