pub mod pipeline;
pub mod types;

pub use pipeline::PredictionPipeline;
pub use types::{Diagnosis, PredictionResult};
