pub mod event_bus;
pub mod job;
pub mod schedule;

pub use event_bus::*;
pub use job::*;
pub use schedule::*;
