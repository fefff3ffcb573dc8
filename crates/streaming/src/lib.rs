pub mod client;
pub mod protocol;

pub use client::*;
pub use protocol::*;
