
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::burndown::{BurnDownSeries, BurnDownSeriesBuilder};
use super::metrics::{MetricsCalculator, PerformanceMetrics};
use crate::core::error::{PlannerError, Result};
use crate::db::models::{Sprint, Task};
use crate::db::store::SprintStore;
use crate::prediction::{
    CompletionPredictor, SprintFeatureBuilder, SprintFeatures, SprintPrediction, SprintSummary,
};


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprintOptimization {
    pub sprint_id: Uuid,
    pub features: SprintFeatures,
    #[serde(flatten)]
    pub prediction: SprintPrediction,
}


/// Loads a sprint and its tasks from the store and runs the analytical
/// components over them.
pub struct SprintAnalytics {
    store: Arc<dyn SprintStore>,
    metrics: MetricsCalculator,
    burn_down: BurnDownSeriesBuilder,
    features: SprintFeatureBuilder,
    predictor: Arc<CompletionPredictor>,
}

impl SprintAnalytics {

    pub fn new(
        store: Arc<dyn SprintStore>,
        metrics: MetricsCalculator,
        predictor: Arc<CompletionPredictor>,
    ) -> Self {
        info!("SprintAnalytics initialized");
        Self {
            store,
            metrics,
            burn_down: BurnDownSeriesBuilder::new(),
            features: SprintFeatureBuilder::new(),
            predictor,
        }
    }

    async fn load(&self, sprint_id: Uuid) -> Result<(Sprint, Vec<Task>)> {
        let sprint = self
            .store
            .get_sprint(sprint_id)
            .await?
            .ok_or_else(|| PlannerError::not_found("Sprint not found"))?;
        let tasks = self.store.tasks_for_sprint(sprint_id).await?;
        debug!("Loaded sprint {} with {} tasks", sprint_id, tasks.len());
        Ok((sprint, tasks))
    }


    pub async fn performance_metrics(&self, sprint_id: Uuid) -> Result<PerformanceMetrics> {
        let (sprint, tasks) = self.load(sprint_id).await?;
        let metrics = self.metrics.calculate(&sprint, &tasks)?;

        info!(
            "Sprint {} metrics: {:.1}% complete, {:.1}% elapsed",
            sprint_id, metrics.completion_rate, metrics.sprint_progress
        );
        Ok(metrics)
    }


    pub async fn burn_down(&self, sprint_id: Uuid) -> Result<BurnDownSeries> {
        let (sprint, tasks) = self.load(sprint_id).await?;
        Ok(self.burn_down.build(&tasks, sprint.start_date, sprint.end_date))
    }


    pub async fn optimize(&self, sprint_id: Uuid) -> Result<SprintOptimization> {
        let (sprint, tasks) = self.load(sprint_id).await?;
        let summary = SprintSummary::from_tasks(&sprint, &tasks);
        let features = self.features.build_features(&summary)?;
        let prediction = self.predictor.predict(&features)?;

        info!(
            "Sprint {} predicted completion {:.2} ({} recommendation(s))",
            sprint_id,
            prediction.predicted_completion_rate,
            prediction.recommendations.len()
        );

        Ok(SprintOptimization {
            sprint_id,
            features,
            prediction,
        })
    }
}

impl std::fmt::Debug for SprintAnalytics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SprintAnalytics").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::FixedClock;
    use crate::core::config::PredictionConfig;
    use crate::db::InMemoryStore;
    use crate::prediction::ModelArtifact;
    use chrono::{Duration, NaiveDate};

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 2).unwrap()
    }

    async fn seeded() -> (Arc<dyn SprintStore>, Sprint) {
        let store: Arc<dyn SprintStore> = Arc::new(InMemoryStore::new());
        let sprint = store
            .insert_sprint(Sprint::new(start(), start() + Duration::days(10)))
            .await
            .unwrap();
        store
            .insert_task(Task::new("done", 5.0).in_sprint(sprint.id).completed(true))
            .await
            .unwrap();
        store
            .insert_task(Task::new("pending", 5.0).in_sprint(sprint.id))
            .await
            .unwrap();
        (store, sprint)
    }

    fn analytics(store: Arc<dyn SprintStore>, predictor: CompletionPredictor) -> SprintAnalytics {
        let clock = Arc::new(FixedClock(start() + Duration::days(5)));
        SprintAnalytics::new(store, MetricsCalculator::new(clock), Arc::new(predictor))
    }

    fn linear(intercept: f64) -> CompletionPredictor {
        let model = ModelArtifact::Linear {
            intercept,
            coefficients: vec![0.0; 4],
        }
        .into_model()
        .unwrap();
        CompletionPredictor::new(model, PredictionConfig::default())
    }

    #[tokio::test]
    async fn test_metrics_end_to_end() {
        let (store, sprint) = seeded().await;
        let analytics = analytics(store, linear(0.9));

        let metrics = analytics.performance_metrics(sprint.id).await.unwrap();
        assert!((metrics.completion_rate - 50.0).abs() < 1e-9);
        assert!((metrics.sprint_progress - 50.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_missing_sprint_is_not_found() {
        let (store, _) = seeded().await;
        let analytics = analytics(store, linear(0.9));

        let err = analytics.performance_metrics(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.to_string(), "Sprint not found");
        assert!(analytics.burn_down(Uuid::new_v4()).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_burn_down_from_store() {
        let (store, sprint) = seeded().await;
        let series = analytics(store, linear(0.9)).burn_down(sprint.id).await.unwrap();

        assert_eq!(series.len(), 11);
        assert_eq!(series.points.last().map(|p| p.actual_remaining_hours), Some(5.0));
    }

    #[tokio::test]
    async fn test_optimize_low_prediction() {
        let (store, sprint) = seeded().await;
        for i in 0..18 {
            store
                .insert_task(Task::new(format!("extra {i}"), 10.0).in_sprint(sprint.id))
                .await
                .unwrap();
        }

        let result = analytics(store, linear(0.6)).optimize(sprint.id).await.unwrap();

        assert_eq!(result.features.total_tasks, 20);
        assert!((result.features.tasks_per_day - 2.0).abs() < 1e-9);
        assert!((result.features.avg_task_size - 9.5).abs() < 1e-9);
        assert_eq!(result.prediction.recommendations.len(), 2);

        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("predicted_completion_rate").is_some());
        assert!(json.get("recommendations").is_some());
    }

    #[tokio::test]
    async fn test_optimize_without_model() {
        let (store, sprint) = seeded().await;
        let analytics = analytics(store, CompletionPredictor::unloaded(PredictionConfig::default()));

        assert!(matches!(
            analytics.optimize(sprint.id).await,
            Err(PlannerError::ModelUnavailable)
        ));
    }
}
