/// Output order of the plant-type model.
pub const PLANT_TYPE_CLASSES: [&str; 3] = ["Bell Pepper", "Potato", "Tomato"];

pub const TOMATO_DISEASE_CLASSES: [&str; 10] = [
    "Tomato_Target_Spot",
    "Tomato_Tomato_mosaic_virus",
    "Tomato_Tomato_YellowLeaf_Curl_virus",
    "Tomato_Bacterial_spot",
    "Tomato_Early_blight",
    "Tomato_healthy",
    "Tomato_Late_blight",
    "Tomato_Leaf_Mold",
    "Tomato_Septoria_leaf_spot",
    "Tomato_Spider_mites_Two_spotted_spider_mite",
];

pub const POTATO_DISEASE_CLASSES: [&str; 3] =
    ["Potato_Early_blight", "Potato_healthy", "Potato_Late_blight"];

pub const BELL_PEPPER_DISEASE_CLASSES: [&str; 2] =
    ["BellPepper_Bacterial_spot", "BellPepper_healthy"];

/// Label reported when a disease model cannot be chosen.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Species recognised by the first-stage model. Variant order matches
/// `PLANT_TYPE_CLASSES`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlantType {
    BellPepper,
    Potato,
    Tomato,
}

impl PlantType {
    pub const ALL: [PlantType; 3] = [PlantType::BellPepper, PlantType::Potato, PlantType::Tomato];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|plant| plant.label() == label)
    }

    pub fn label(self) -> &'static str {
        match self {
            PlantType::BellPepper => PLANT_TYPE_CLASSES[0],
            PlantType::Potato => PLANT_TYPE_CLASSES[1],
            PlantType::Tomato => PLANT_TYPE_CLASSES[2],
        }
    }

    /// Labels of this species' disease model, in model output order.
    pub fn disease_classes(self) -> &'static [&'static str] {
        match self {
            PlantType::BellPepper => &BELL_PEPPER_DISEASE_CLASSES,
            PlantType::Potato => &POTATO_DISEASE_CLASSES,
            PlantType::Tomato => &TOMATO_DISEASE_CLASSES,
        }
    }
}

impl std::fmt::Display for PlantType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
