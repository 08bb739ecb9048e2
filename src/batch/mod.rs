pub mod orchestrator;
pub mod partition;
pub mod summary;
pub mod worker;

pub use orchestrator::*;
pub use partition::*;
pub use summary::*;
pub use worker::*;
