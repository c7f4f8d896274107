use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::features::SprintFeatures;
use super::model::CompletionModel;
use crate::core::config::PredictionConfig;
use crate::core::error::{PlannerError, Result};

pub const REDUCE_TASKS_ADVICE: &str = "Consider reducing the number of tasks in this sprint.";

pub const SPLIT_TASKS_ADVICE: &str =
    "The average task size seems large. Consider breaking down tasks into smaller units.";


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprintPrediction {
    pub predicted_completion_rate: f64,
    pub recommendations: Vec<String>,
}


pub struct CompletionPredictor {
    model: Option<Arc<dyn CompletionModel>>,
    config: PredictionConfig,
}

impl CompletionPredictor {

    pub fn new(model: Arc<dyn CompletionModel>, config: PredictionConfig) -> Self {
        info!("CompletionPredictor initialized with {} model", model.kind());
        Self {
            model: Some(model),
            config,
        }
    }

    /// A predictor with nothing loaded; every `predict` fails with `ModelUnavailable`.
    pub fn unloaded(config: PredictionConfig) -> Self {
        warn!("CompletionPredictor has no model loaded, sprint optimization is disabled");
        Self {
            model: None,
            config,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }


    pub fn predict(&self, features: &SprintFeatures) -> Result<SprintPrediction> {
        let model = self.model.as_ref().ok_or(PlannerError::ModelUnavailable)?;

        let predicted_completion_rate = model.predict(&features.to_vector());
        let recommendations = self.recommend(predicted_completion_rate, features);

        debug!(
            "Predicted completion {:.3}, {} recommendation(s)",
            predicted_completion_rate,
            recommendations.len()
        );

        Ok(SprintPrediction {
            predicted_completion_rate,
            recommendations,
        })
    }


    pub fn recommend(&self, predicted_completion_rate: f64, features: &SprintFeatures) -> Vec<String> {
        let mut recommendations = Vec::new();
        if predicted_completion_rate >= self.config.completion_threshold {
            return recommendations;
        }

        if features.tasks_per_day > self.config.max_tasks_per_day {
            recommendations.push(REDUCE_TASKS_ADVICE.to_string());
        }
        if features.avg_task_size > self.config.max_avg_task_size {
            recommendations.push(SPLIT_TASKS_ADVICE.to_string());
        }

        recommendations
    }
}

impl std::fmt::Debug for CompletionPredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionPredictor")
            .field("model", &self.model.as_ref().map(|m| m.kind()))
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction::features::FEATURE_COUNT;

    struct Constant(f64);

    impl CompletionModel for Constant {
        fn predict(&self, _features: &[f64; FEATURE_COUNT]) -> f64 {
            self.0
        }

        fn kind(&self) -> &'static str {
            "constant"
        }
    }

    fn features(tasks_per_day: f64, avg_task_size: f64) -> SprintFeatures {
        SprintFeatures {
            sprint_duration: 10,
            tasks_per_day,
            avg_task_size,
            total_tasks: 20,
        }
    }

    fn predictor(rate: f64) -> CompletionPredictor {
        CompletionPredictor::new(Arc::new(Constant(rate)), PredictionConfig::default())
    }

    #[test]
    fn test_both_recommendations_in_order() {
        let prediction = predictor(0.75).predict(&features(2.0, 10.0)).unwrap();

        assert!((prediction.predicted_completion_rate - 0.75).abs() < 1e-9);
        assert_eq!(
            prediction.recommendations,
            vec![REDUCE_TASKS_ADVICE.to_string(), SPLIT_TASKS_ADVICE.to_string()]
        );
    }

    #[test]
    fn test_single_recommendation() {
        let only_size = predictor(0.5).predict(&features(1.0, 12.0)).unwrap();
        assert_eq!(only_size.recommendations, vec![SPLIT_TASKS_ADVICE.to_string()]);

        let only_load = predictor(0.5).predict(&features(3.0, 4.0)).unwrap();
        assert_eq!(only_load.recommendations, vec![REDUCE_TASKS_ADVICE.to_string()]);
    }

    #[test]
    fn test_no_advice_at_or_above_threshold() {
        assert!(predictor(0.8).predict(&features(5.0, 20.0)).unwrap().recommendations.is_empty());
        assert!(predictor(1.3).predict(&features(5.0, 20.0)).unwrap().recommendations.is_empty());
    }

    #[test]
    fn test_limits_are_strict() {
        let prediction = predictor(0.1).predict(&features(1.5, 8.0)).unwrap();
        assert!(prediction.recommendations.is_empty());
    }

    #[test]
    fn test_unloaded_model() {
        let predictor = CompletionPredictor::unloaded(PredictionConfig::default());
        assert!(!predictor.is_loaded());
        assert!(matches!(
            predictor.predict(&features(2.0, 10.0)),
            Err(PlannerError::ModelUnavailable)
        ));
    }

    #[test]
    fn test_custom_thresholds() {
        let config = PredictionConfig {
            completion_threshold: 0.9,
            max_tasks_per_day: 3.0,
            max_avg_task_size: 4.0,
        };
        let predictor = CompletionPredictor::new(Arc::new(Constant(0.85)), config);
        let prediction = predictor.predict(&features(2.0, 6.0)).unwrap();
        assert_eq!(prediction.recommendations, vec![SPLIT_TASKS_ADVICE.to_string()]);
    }
}
