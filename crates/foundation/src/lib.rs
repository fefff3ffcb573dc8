pub mod arena;
pub mod bounds;
pub mod geo;
pub mod handles;
pub mod model;

// Foundation crate: geo primitives and the shared data model.
pub use arena::*;
pub use bounds::*;
pub use geo::*;
pub use handles::*;
pub use model::*;
