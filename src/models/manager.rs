use crate::models::{ImageClassifier, OnnxClassifier, PlantType};
use crate::{Config, Result};

/// The four models, loaded once at startup and read-only afterwards.
pub struct ModelManager {
    plant_type: Box<dyn ImageClassifier>,
    tomato: Box<dyn ImageClassifier>,
    potato: Box<dyn ImageClassifier>,
    bell_pepper: Box<dyn ImageClassifier>,
}

impl ModelManager {
    /// Load all models from `config.models_dir`. Any missing or unreadable
    /// artifact fails the whole load.
    pub fn load(config: &Config) -> Result<Self> {
        tracing::info!("Initializing model manager...");

        let onnx = &config.onnx_config;
        let plant_type = OnnxClassifier::load("Plant type", &config.plant_type_model_path(), onnx)?;
        let tomato = OnnxClassifier::load("Tomato", &config.tomato_model_path(), onnx)?;
        let potato = OnnxClassifier::load("Potato", &config.potato_model_path(), onnx)?;
        let bell_pepper =
            OnnxClassifier::load("Bell Pepper", &config.bell_pepper_model_path(), onnx)?;

        tracing::info!("Model manager initialized successfully");

        Ok(Self::new(
            Box::new(plant_type),
            Box::new(tomato),
            Box::new(potato),
            Box::new(bell_pepper),
        ))
    }

    pub fn new(
        plant_type: Box<dyn ImageClassifier>,
        tomato: Box<dyn ImageClassifier>,
        potato: Box<dyn ImageClassifier>,
        bell_pepper: Box<dyn ImageClassifier>,
    ) -> Self {
        Self {
            plant_type,
            tomato,
            potato,
            bell_pepper,
        }
    }

    pub fn plant_type_model(&self) -> &dyn ImageClassifier {
        self.plant_type.as_ref()
    }

    pub fn disease_model(&self, plant: PlantType) -> &dyn ImageClassifier {
        match plant {
            PlantType::Tomato => self.tomato.as_ref(),
            PlantType::Potato => self.potato.as_ref(),
            PlantType::BellPepper => self.bell_pepper.as_ref(),
        }
    }
}
