
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::core::clock::{Clock, SystemClock};
use crate::core::error::{PlannerError, Result};
use crate::db::models::{Sprint, Task};


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub sprint_id: Uuid,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub total_estimated_hours: f64,
    pub completed_estimated_hours: f64,
    /// Percent of estimated hours completed, in [0, 100].
    pub completion_rate: f64,
    /// Percent of the sprint's calendar elapsed, in [0, 100].
    pub sprint_progress: f64,
}


pub struct MetricsCalculator {
    clock: Arc<dyn Clock>,
    allow_empty: bool,
}

impl MetricsCalculator {

    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            allow_empty: false,
        }
    }

    /// Report zeros for a sprint without tasks instead of failing.
    pub fn allow_empty(mut self, allow: bool) -> Self {
        self.allow_empty = allow;
        self
    }


    pub fn calculate(&self, sprint: &Sprint, tasks: &[Task]) -> Result<PerformanceMetrics> {
        if tasks.is_empty() && !self.allow_empty {
            return Err(PlannerError::not_found("No tasks found for this sprint"));
        }

        let total_estimated_hours: f64 = tasks.iter().map(|t| t.estimated_hours).sum();
        let completed: Vec<&Task> = tasks.iter().filter(|t| t.completed).collect();
        let completed_estimated_hours: f64 = completed.iter().map(|t| t.estimated_hours).sum();

        let completion_rate = completion_rate(completed_estimated_hours, total_estimated_hours);
        let sprint_progress = sprint_progress(sprint, self.clock.today());

        debug!(
            "Sprint {}: {:.1}/{:.1}h done ({:.1}%), {:.1}% elapsed",
            sprint.id,
            completed_estimated_hours,
            total_estimated_hours,
            completion_rate,
            sprint_progress
        );

        Ok(PerformanceMetrics {
            sprint_id: sprint.id,
            total_tasks: tasks.len(),
            completed_tasks: completed.len(),
            total_estimated_hours,
            completed_estimated_hours,
            completion_rate,
            sprint_progress,
        })
    }
}

impl Default for MetricsCalculator {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl std::fmt::Debug for MetricsCalculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsCalculator")
            .field("allow_empty", &self.allow_empty)
            .finish()
    }
}


pub fn completion_rate(completed_hours: f64, total_hours: f64) -> f64 {
    if total_hours > 0.0 {
        (completed_hours / total_hours * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Elapsed share of the sprint; a sprint that has not started reports 0.
pub fn sprint_progress(sprint: &Sprint, today: chrono::NaiveDate) -> f64 {
    let total_days = sprint.duration_days();
    if total_days <= 0 {
        return 0.0;
    }

    let days_passed = (today - sprint.start_date).num_days().max(0);
    (days_passed as f64 / total_days as f64 * 100.0).min(100.0)
}
