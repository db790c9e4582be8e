pub mod batch;
pub mod factory;

pub use batch::{run_batch, run_batch_files, BatchSummary};
pub use factory::{build_resolver, build_vision_analyzer};
