pub mod alert;
pub mod policy;
pub mod poll;
pub mod registry;
pub mod scanner;
pub mod target;
pub mod user;

pub use alert::*;
pub use policy::*;
pub use poll::*;
pub use registry::*;
pub use scanner::*;
pub use target::*;
pub use user::*;
