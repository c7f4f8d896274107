use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::error::{PlannerError, Result};
use crate::db::models::{Sprint, Task};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Number of model inputs, in `SprintFeatures::to_vector` order.
pub const FEATURE_COUNT: usize = 4;


/// Raw aggregates of one sprint, the input of feature building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprintSummary {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_tasks: usize,
    pub total_estimated_hours: f64,
}

impl SprintSummary {

    pub fn new(
        start_date: NaiveDate,
        end_date: NaiveDate,
        total_tasks: usize,
        total_estimated_hours: f64,
    ) -> Self {
        Self {
            start_date,
            end_date,
            total_tasks,
            total_estimated_hours,
        }
    }

    /// Same as `new`, with `YYYY-MM-DD` date strings.
    pub fn parse(
        start_date: &str,
        end_date: &str,
        total_tasks: usize,
        total_estimated_hours: f64,
    ) -> Result<Self> {
        Ok(Self::new(
            parse_date(start_date)?,
            parse_date(end_date)?,
            total_tasks,
            total_estimated_hours,
        ))
    }

    pub fn from_tasks(sprint: &Sprint, tasks: &[Task]) -> Self {
        Self::new(
            sprint.start_date,
            sprint.end_date,
            tasks.len(),
            tasks.iter().map(|t| t.estimated_hours).sum(),
        )
    }
}

pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|e| PlannerError::validation(format!("invalid date '{value}': {e}")))
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprintFeatures {
    pub sprint_duration: i64,
    pub tasks_per_day: f64,
    pub avg_task_size: f64,
    pub total_tasks: usize,
}

impl SprintFeatures {
    pub fn to_vector(&self) -> [f64; FEATURE_COUNT] {
        [
            self.sprint_duration as f64,
            self.tasks_per_day,
            self.avg_task_size,
            self.total_tasks as f64,
        ]
    }
}


#[derive(Debug, Clone, Copy, Default)]
pub struct SprintFeatureBuilder;

impl SprintFeatureBuilder {

    pub fn new() -> Self {
        Self
    }


    pub fn build_features(&self, summary: &SprintSummary) -> Result<SprintFeatures> {
        let sprint_duration = (summary.end_date - summary.start_date).num_days();
        if sprint_duration <= 0 {
            return Err(PlannerError::DivisionUndefined(format!(
                "sprint duration is {sprint_duration} days, tasks_per_day needs a positive duration"
            )));
        }
        if summary.total_tasks == 0 {
            return Err(PlannerError::DivisionUndefined(
                "sprint has no tasks, avg_task_size needs at least one".to_string(),
            ));
        }

        let features = SprintFeatures {
            sprint_duration,
            tasks_per_day: summary.total_tasks as f64 / sprint_duration as f64,
            avg_task_size: summary.total_estimated_hours / summary.total_tasks as f64,
            total_tasks: summary.total_tasks,
        };

        debug!(
            "Features: {}d, {:.2} tasks/day, {:.2}h avg, {} tasks",
            features.sprint_duration,
            features.tasks_per_day,
            features.avg_task_size,
            features.total_tasks
        );

        Ok(features)
    }


    pub fn build_batch(&self, summaries: &[SprintSummary]) -> Result<Vec<SprintFeatures>> {
        summaries.iter().map(|s| self.build_features(s)).collect()
    }
}
