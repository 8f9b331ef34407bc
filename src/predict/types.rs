use crate::models::UNKNOWN_LABEL;
use serde::{Deserialize, Serialize};

/// One classifier decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: String,
    /// Winning score as a percentage, rounded to 2 decimals
    pub confidence: f64,
}

impl PredictionResult {
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }

    /// Sentinel for a plant type with no disease model.
    pub fn unknown() -> Self {
        Self::new(UNKNOWN_LABEL, 0.0)
    }
}

/// Body of a successful `/predict` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub plant_type: String,
    pub plant_confidence: f64,
    pub disease: String,
    pub disease_confidence: f64,
}

impl Diagnosis {
    pub fn new(plant: PredictionResult, disease: PredictionResult) -> Self {
        Self {
            plant_type: plant.label,
            plant_confidence: plant.confidence,
            disease: disease.label,
            disease_confidence: disease.confidence,
        }
    }
}
