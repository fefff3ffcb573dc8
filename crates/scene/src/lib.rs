pub mod memory;
pub mod overlay;
pub mod picking;
pub mod surface;

pub use memory::*;
pub use overlay::*;
pub use surface::*;
