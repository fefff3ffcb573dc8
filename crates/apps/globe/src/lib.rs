//! Client side of the site-scoring globe: region selection, the prediction
//! pipeline and the controller tying them to a [`scene::GlobeSurface`].

pub mod config;
pub mod controller;
pub mod error;
pub mod orchestrator;
pub mod selection;

pub use config::GlobeConfig;
pub use controller::{FinishOutcome, GlobeController, run_confirmed};
pub use error::PipelineError;
pub use orchestrator::Orchestrator;
pub use selection::{RegionSelector, SelectionState, SideLengthLimits};
