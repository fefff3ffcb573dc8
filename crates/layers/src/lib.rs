pub mod heatmap;
pub mod hover;
pub mod preview;
pub mod symbology;

pub use heatmap::*;
pub use hover::*;
pub use preview::*;
