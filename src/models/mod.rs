pub mod classifier;
pub mod labels;
pub mod manager;

pub use classifier::{ImageClassifier, OnnxClassifier};
pub use labels::{
    PlantType, BELL_PEPPER_DISEASE_CLASSES, PLANT_TYPE_CLASSES, POTATO_DISEASE_CLASSES,
    TOMATO_DISEASE_CLASSES, UNKNOWN_LABEL,
};
pub use manager::ModelManager;
