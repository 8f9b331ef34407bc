use crate::{
    image::{ImageLoader, PixelGrid},
    models::{ModelManager, PlantType, PLANT_TYPE_CLASSES},
    predict::{Diagnosis, PredictionResult},
    utils::error::PredictError,
    Result,
};
use std::time::Instant;

/// Two-stage cascade: species first, then that species' disease model.
pub struct PredictionPipeline<'a> {
    models: &'a ModelManager,
}

impl<'a> PredictionPipeline<'a> {
    pub fn new(models: &'a ModelManager) -> Self {
        Self { models }
    }

    /// Decode uploaded bytes and run both stages.
    pub fn process_bytes(&self, bytes: &[u8]) -> Result<Diagnosis> {
        let start_time = Instant::now();

        let grid = ImageLoader::decode(bytes)?;
        let (plant, plant_result) = self.classify_plant(&grid)?;
        let disease_result = self.classify_disease(&grid, plant)?;

        tracing::info!(
            "Prediction completed: plant={} ({:.2}%), disease={} ({:.2}%), time={:.3}s",
            plant_result.label,
            plant_result.confidence,
            disease_result.label,
            disease_result.confidence,
            start_time.elapsed().as_secs_f32()
        );

        Ok(Diagnosis::new(plant_result, disease_result))
    }

    pub fn classify_plant(&self, grid: &PixelGrid) -> Result<(PlantType, PredictionResult)> {
        let scores = self.models.plant_type_model().predict(grid)?;
        tracing::debug!("Raw plant type scores: {:?}", scores);

        let (index, result) = select_class(&scores, &PLANT_TYPE_CLASSES)?;
        let plant = PlantType::from_index(index).ok_or_else(|| {
            PredictError::Internal(format!("No plant type for class index {}", index))
        })?;

        Ok((plant, result))
    }

    pub fn classify_disease(&self, grid: &PixelGrid, plant: PlantType) -> Result<PredictionResult> {
        let scores = self.models.disease_model(plant).predict(grid)?;
        tracing::debug!("Raw {} disease scores: {:?}", plant, scores);

        let (_, result) = select_class(&scores, plant.disease_classes())?;
        Ok(result)
    }

    /// Like `classify_disease`, keyed by a free-form plant label. A label
    /// outside the plant-type set yields the `Unknown` sentinel and runs no
    /// model.
    pub fn classify_disease_by_label(&self, grid: &PixelGrid, label: &str) -> Result<PredictionResult> {
        match PlantType::from_label(label) {
            Some(plant) => self.classify_disease(grid, plant),
            None => {
                tracing::warn!("No disease model for plant type '{}'", label);
                Ok(PredictionResult::unknown())
            }
        }
    }
}

/// Pick the highest-scoring class and express its score as a percentage.
fn select_class(scores: &[f32], classes: &[&str]) -> Result<(usize, PredictionResult)> {
    if scores.len() != classes.len() {
        return Err(PredictError::Inference(format!(
            "Expected {} class scores, model produced {}",
            classes.len(),
            scores.len()
        )));
    }

    if let Some(score) = scores.iter().find(|s| !s.is_finite()) {
        return Err(PredictError::Inference(format!(
            "Model produced non-finite score {} among {:?}",
            score, scores
        )));
    }

    let index = argmax(scores).ok_or_else(|| {
        PredictError::Inference("Model produced no class scores".to_string())
    })?;

    Ok((index, PredictionResult::new(classes[index], to_percentage(scores[index]))))
}

/// Index of the maximum score; the first one wins on ties. Scores must be
/// finite.
fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;

    for (i, &score) in scores.iter().enumerate() {
        match best {
            Some((_, max)) if score <= max => {}
            _ => best = Some((i, score)),
        }
    }

    best.map(|(i, _)| i)
}

fn to_percentage(score: f32) -> f64 {
    (100.0 * f64::from(score) * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImageClassifier;
    use crate::utils::error::ErrorKind;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Scores {
        scores: Vec<f32>,
        calls: Arc<AtomicUsize>,
    }

    impl Scores {
        fn boxed(scores: &[f32], calls: &Arc<AtomicUsize>) -> Box<dyn ImageClassifier> {
            Box::new(Self {
                scores: scores.to_vec(),
                calls: Arc::clone(calls),
            })
        }
    }

    impl ImageClassifier for Scores {
        fn predict(&self, grid: &PixelGrid) -> Result<Vec<f32>> {
            assert_eq!(grid.shape(), &[256, 256, 3]);
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.scores.clone())
        }
    }

    struct Failing;

    impl ImageClassifier for Failing {
        fn predict(&self, _grid: &PixelGrid) -> Result<Vec<f32>> {
            Err(PredictError::Inference("input shape mismatch".to_string()))
        }
    }

    struct Counters {
        plant: Arc<AtomicUsize>,
        tomato: Arc<AtomicUsize>,
        potato: Arc<AtomicUsize>,
        pepper: Arc<AtomicUsize>,
    }

    impl Counters {
        fn new() -> Self {
            Self {
                plant: Arc::default(),
                tomato: Arc::default(),
                potato: Arc::default(),
                pepper: Arc::default(),
            }
        }

        fn disease_calls(&self) -> usize {
            self.tomato.load(Ordering::SeqCst)
                + self.potato.load(Ordering::SeqCst)
                + self.pepper.load(Ordering::SeqCst)
        }
    }

    fn manager(plant_scores: &[f32], counters: &Counters) -> ModelManager {
        ModelManager::new(
            Scores::boxed(plant_scores, &counters.plant),
            Scores::boxed(&[0.01, 0.02, 0.03, 0.04, 0.05, 0.6, 0.07, 0.08, 0.05, 0.05], &counters.tomato),
            Scores::boxed(&[0.2, 0.1, 0.7], &counters.potato),
            Scores::boxed(&[0.25, 0.75], &counters.pepper),
        )
    }

    fn leaf_png() -> Vec<u8> {
        let image = RgbImage::from_pixel(512, 512, Rgb([40, 160, 60]));
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(image)
            .write_to(&mut buffer, ImageFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    fn grid() -> PixelGrid {
        ImageLoader::decode(&leaf_png()).unwrap()
    }

    #[test]
    fn test_argmax_first_wins_on_ties() {
        assert_eq!(argmax(&[0.2, 0.4, 0.4]), Some(1));
        assert_eq!(argmax(&[0.5, 0.5]), Some(0));
        assert_eq!(argmax(&[0.1, 0.2, 0.7]), Some(2));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_select_class_rejects_non_finite_scores() {
        let cases = [
            [0.3, f32::NAN, 0.6],
            [f32::NAN; 3],
            [0.1, f32::INFINITY, 0.2],
            [f32::NEG_INFINITY, 0.5, 0.5],
        ];
        for scores in cases {
            let err = select_class(&scores, &PLANT_TYPE_CLASSES).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Inference, "{scores:?}");
            assert!(err.to_string().contains("non-finite"), "{err}");
        }
    }

    #[test]
    fn test_nan_plant_scores_fail_before_disease_model() {
        let counters = Counters::new();
        let models = manager(&[f32::NAN, f32::NAN, f32::NAN], &counters);

        let err = PredictionPipeline::new(&models).process_bytes(&leaf_png()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Inference);
        assert_eq!(counters.plant.load(Ordering::SeqCst), 1);
        assert_eq!(counters.disease_calls(), 0);
    }

    #[test]
    fn test_to_percentage_rounds_to_two_decimals() {
        assert_eq!(to_percentage(1.0), 100.0);
        assert_eq!(to_percentage(0.0), 0.0);
        assert_eq!(to_percentage(0.123456), 12.35);
        assert_eq!(to_percentage(0.987654), 98.77);
    }

    #[test]
    fn test_select_class_rejects_length_mismatch() {
        let err = select_class(&[0.1, 0.9], &PLANT_TYPE_CLASSES).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Inference);
    }

    #[test]
    fn test_process_bytes_tomato() {
        let counters = Counters::new();
        let models = manager(&[0.05, 0.15, 0.8], &counters);

        let diagnosis = PredictionPipeline::new(&models).process_bytes(&leaf_png()).unwrap();

        assert_eq!(
            diagnosis,
            Diagnosis {
                plant_type: "Tomato".to_string(),
                plant_confidence: 80.0,
                disease: "Tomato_healthy".to_string(),
                disease_confidence: 60.0,
            }
        );
        assert_eq!(counters.tomato.load(Ordering::SeqCst), 1);
        assert_eq!(counters.disease_calls(), 1);
    }

    #[test]
    fn test_dispatch_follows_plant_type() {
        let cases: [([f32; 3], &str, &str); 3] = [
            ([0.9, 0.05, 0.05], "Bell Pepper", "BellPepper_healthy"),
            ([0.1, 0.8, 0.1], "Potato", "Potato_Late_blight"),
            ([0.0, 0.0, 1.0], "Tomato", "Tomato_healthy"),
        ];

        for (plant_scores, plant, disease) in cases {
            let counters = Counters::new();
            let models = manager(&plant_scores, &counters);
            let diagnosis = PredictionPipeline::new(&models).process_bytes(&leaf_png()).unwrap();

            assert_eq!(diagnosis.plant_type, plant);
            assert_eq!(diagnosis.disease, disease);
            let species = PlantType::from_label(plant).unwrap();
            assert!(species.disease_classes().contains(&diagnosis.disease.as_str()));
            assert_eq!(counters.disease_calls(), 1);
        }
    }

    #[test]
    fn test_process_bytes_is_deterministic() {
        let counters = Counters::new();
        let models = manager(&[0.3, 0.6, 0.1], &counters);
        let pipeline = PredictionPipeline::new(&models);
        let bytes = leaf_png();

        assert_eq!(pipeline.process_bytes(&bytes).unwrap(), pipeline.process_bytes(&bytes).unwrap());
    }

    #[test]
    fn test_decode_failure_skips_models() {
        let counters = Counters::new();
        let models = manager(&[0.3, 0.6, 0.1], &counters);

        let err = PredictionPipeline::new(&models).process_bytes(b"not an image").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Decode);
        assert_eq!(counters.plant.load(Ordering::SeqCst), 0);
        assert_eq!(counters.disease_calls(), 0);
    }

    #[test]
    fn test_inference_failure_propagates() {
        let counters = Counters::new();
        let models = ModelManager::new(
            Box::new(Failing),
            Scores::boxed(&[1.0; 10], &counters.tomato),
            Scores::boxed(&[1.0; 3], &counters.potato),
            Scores::boxed(&[1.0; 2], &counters.pepper),
        );

        let err = PredictionPipeline::new(&models).process_bytes(&leaf_png()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Inference);
        assert_eq!(counters.disease_calls(), 0);
    }

    #[test]
    fn test_plant_model_with_wrong_class_count() {
        let counters = Counters::new();
        let models = manager(&[0.5, 0.5], &counters);

        let err = PredictionPipeline::new(&models).process_bytes(&leaf_png()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Inference);
    }

    #[test]
    fn test_unrecognised_label_returns_unknown_without_inference() {
        let counters = Counters::new();
        let models = manager(&[0.3, 0.6, 0.1], &counters);

        let result = PredictionPipeline::new(&models)
            .classify_disease_by_label(&grid(), "Cucumber")
            .unwrap();

        assert_eq!(result, PredictionResult::unknown());
        assert_eq!(counters.disease_calls(), 0);
    }

    #[test]
    fn test_known_label_dispatches() {
        let counters = Counters::new();
        let models = manager(&[0.3, 0.6, 0.1], &counters);

        let result = PredictionPipeline::new(&models)
            .classify_disease_by_label(&grid(), "Bell Pepper")
            .unwrap();

        assert_eq!(result, PredictionResult::new("BellPepper_healthy", 75.0));
        assert_eq!(counters.pepper.load(Ordering::SeqCst), 1);
    }
}
