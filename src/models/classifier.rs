use crate::config::OnnxConfig;
use crate::image::PixelGrid;
use crate::utils::error::PredictError;
use crate::Result;
use ort::{
    inputs,
    session::{builder::GraphOptimizationLevel, Session},
    value::Tensor,
};
use parking_lot::Mutex;
use std::fmt::Display;
use std::path::Path;

/// A pre-trained single-image classifier.
pub trait ImageClassifier: Send + Sync {
    /// Class scores for one grid, in the model's output order.
    fn predict(&self, grid: &PixelGrid) -> Result<Vec<f32>>;
}

/// Classifier backed by an ONNX Runtime session.
pub struct OnnxClassifier {
    name: String,
    // `Session::run` needs exclusive access.
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
}

impl OnnxClassifier {
    pub fn load(name: &str, model_path: &Path, onnx_config: &OnnxConfig) -> Result<Self> {
        if !model_path.exists() {
            return Err(PredictError::ModelLoad(format!(
                "{} model not found: {}",
                name,
                model_path.display()
            )));
        }

        tracing::info!("Loading {} model from: {}", name, model_path.display());

        let load_error = |e: &dyn Display| {
            PredictError::ModelLoad(format!("{} ({}): {}", name, model_path.display(), e))
        };

        let session = Session::builder()
            .map_err(|e| load_error(&e))?
            .with_optimization_level(optimization_level(onnx_config.optimization_level))
            .map_err(|e| load_error(&e))?
            .with_intra_threads(onnx_config.intra_threads)
            .map_err(|e| load_error(&e))?
            .commit_from_file(model_path)
            .map_err(|e| load_error(&e))?;

        let input_name = match session.inputs.first() {
            Some(input) => input.name.clone(),
            None => return Err(load_error(&"model has no inputs")),
        };
        let output_name = match session.outputs.first() {
            Some(output) => output.name.clone(),
            None => return Err(load_error(&"model has no outputs")),
        };

        tracing::info!(
            "{} model ready: input '{}', output '{}'",
            name,
            input_name,
            output_name
        );
        for (i, output) in session.outputs.iter().enumerate() {
            tracing::debug!("{} output[{}]: '{}'", name, i, output.name);
        }

        Ok(Self {
            name: name.to_string(),
            session: Mutex::new(session),
            input_name,
            output_name,
        })
    }
}

impl ImageClassifier for OnnxClassifier {
    fn predict(&self, grid: &PixelGrid) -> Result<Vec<f32>> {
        let input_tensor = Tensor::from_array(grid.to_batch())?;

        let mut session = self.session.lock();
        let outputs = session.run(inputs![self.input_name.as_str() => input_tensor])?;

        let predictions = match outputs.get(self.output_name.as_str()) {
            Some(output) => output.try_extract_array::<f32>()?,
            None => {
                let available: Vec<String> = outputs.keys().map(|s| s.to_string()).collect();
                return Err(PredictError::Inference(format!(
                    "{} output '{}' not found. Available outputs: {:?}",
                    self.name, self.output_name, available
                )));
            }
        };

        let shape = predictions.shape();
        if shape.len() != 2 || shape[0] != 1 {
            return Err(PredictError::Inference(format!(
                "{} model returned shape {:?}, expected [1, classes]",
                self.name, shape
            )));
        }

        Ok(predictions.iter().copied().collect())
    }
}

fn optimization_level(level: u8) -> GraphOptimizationLevel {
    match level {
        0 => GraphOptimizationLevel::Disable,
        1 => GraphOptimizationLevel::Level1,
        2 => GraphOptimizationLevel::Level2,
        _ => GraphOptimizationLevel::Level3,
    }
}
