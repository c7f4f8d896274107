
use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::analytics::{
    BurnDownSeries, MetricsCalculator, PerformanceMetrics, SprintAnalytics, SprintOptimization,
};
use crate::core::clock::{Clock, SystemClock};
use crate::core::config::PlannerConfig;
use crate::core::error::{PlannerError, Result};
use crate::db::{InMemoryStore, Sprint, SprintStore, Task, TeamMember, UserStory};
use crate::planning::{AllocationEngine, AllocationRequest, AllocationResult};
use crate::prediction::{CompletionPredictor, load_model};


/// Allocation decisions plus the member snapshot after capacities were drawn down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationBatch {
    pub results: Vec<AllocationResult>,
    pub members: Vec<TeamMember>,
}


pub struct SprintPlanner {
    config: PlannerConfig,
    store: Arc<dyn SprintStore>,
    analytics: SprintAnalytics,
    engine: AllocationEngine,
}

impl SprintPlanner {

    pub fn new(
        config: PlannerConfig,
        store: Arc<dyn SprintStore>,
        predictor: CompletionPredictor,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let metrics =
            MetricsCalculator::new(clock).allow_empty(config.analytics.allow_empty_sprints);
        let analytics = SprintAnalytics::new(Arc::clone(&store), metrics, Arc::new(predictor));

        Self {
            config,
            store,
            analytics,
            engine: AllocationEngine::new(),
        }
    }

    /// In-memory store and wall clock; loads the model when `model_path` is set.
    pub fn from_config(config: PlannerConfig) -> Result<Self> {
        let predictor = match &config.model_path {
            Some(path) => CompletionPredictor::new(load_model(path)?, config.prediction.clone()),
            None => CompletionPredictor::unloaded(config.prediction.clone()),
        };

        Ok(Self::new(
            config,
            Arc::new(InMemoryStore::new()),
            predictor,
            Arc::new(SystemClock),
        ))
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    fn page(&self, skip: Option<usize>, limit: Option<usize>) -> (usize, usize) {
        (
            skip.unwrap_or(0),
            limit.unwrap_or(self.config.store.default_page_limit),
        )
    }


    pub async fn create_sprint(&self, start_date: NaiveDate, end_date: NaiveDate) -> Result<Sprint> {
        let sprint = Sprint::new(start_date, end_date);
        sprint.validate()?;
        let sprint = self.store.insert_sprint(sprint).await?;
        info!("Created sprint {} ({} -> {})", sprint.id, start_date, end_date);
        Ok(sprint)
    }

    pub async fn list_sprints(&self, skip: Option<usize>, limit: Option<usize>) -> Result<Vec<Sprint>> {
        let (skip, limit) = self.page(skip, limit);
        self.store.list_sprints(skip, limit).await
    }


    pub async fn create_task(&self, task: Task) -> Result<Task> {
        task.validate()?;
        if let Some(sprint_id) = task.sprint_id {
            self.require_sprint(sprint_id).await?;
        }
        let task = self.store.insert_task(task).await?;
        info!("Created task {} '{}'", task.id, task.title);
        Ok(task)
    }

    pub async fn list_tasks(&self, skip: Option<usize>, limit: Option<usize>) -> Result<Vec<Task>> {
        let (skip, limit) = self.page(skip, limit);
        self.store.list_tasks(skip, limit).await
    }


    pub async fn create_user_story(
        &self,
        story: impl Into<String>,
        sprint_id: Option<Uuid>,
    ) -> Result<UserStory> {
        if let Some(sprint_id) = sprint_id {
            self.require_sprint(sprint_id).await?;
        }
        let story = self.store.insert_user_story(UserStory::new(story, sprint_id)).await?;
        info!("Created user story {}", story.id);
        Ok(story)
    }

    pub async fn list_user_stories(
        &self,
        skip: Option<usize>,
        limit: Option<usize>,
    ) -> Result<Vec<UserStory>> {
        let (skip, limit) = self.page(skip, limit);
        self.store.list_user_stories(skip, limit).await
    }

    pub async fn user_stories_for_sprint(&self, sprint_id: Uuid) -> Result<Vec<UserStory>> {
        self.store.user_stories_for_sprint(sprint_id).await
    }


    pub async fn create_member(&self, member: TeamMember) -> Result<TeamMember> {
        member.validate()?;
        let member = self.store.insert_member(member).await?;
        info!("Created team member {} ({})", member.id, member.name);
        Ok(member)
    }

    pub async fn list_members(
        &self,
        skip: Option<usize>,
        limit: Option<usize>,
    ) -> Result<Vec<TeamMember>> {
        let (skip, limit) = self.page(skip, limit);
        self.store.list_members(skip, limit).await
    }

    pub async fn update_member(
        &self,
        id: Uuid,
        name: impl Into<String>,
        skills: BTreeSet<String>,
        available_hours: f64,
    ) -> Result<TeamMember> {
        let member = TeamMember {
            id,
            name: name.into(),
            skills,
            available_hours,
        };
        member.validate()?;

        let updated = self
            .store
            .update_member(member)
            .await?
            .ok_or_else(|| PlannerError::not_found("User not found"))?;
        info!("Updated team member {}", id);
        Ok(updated)
    }

    pub async fn delete_member(&self, id: Uuid) -> Result<TeamMember> {
        let deleted = self
            .store
            .delete_member(id)
            .await?
            .ok_or_else(|| PlannerError::not_found("User not found"))?;
        info!("Deleted team member {} ({})", id, deleted.name);
        Ok(deleted)
    }


    /// Allocates against a caller-supplied member snapshot; nothing is persisted.
    pub fn allocate_tasks(
        &self,
        requests: &[AllocationRequest],
        members: Vec<TeamMember>,
    ) -> Result<AllocationBatch> {
        for member in &members {
            member.validate()?;
        }
        self.run_allocation(requests, members)
    }

    /// Allocates against the stored team and writes drawn-down capacities back.
    pub async fn allocate_team(&self, requests: &[AllocationRequest]) -> Result<AllocationBatch> {
        let before = self.store.list_members(0, usize::MAX).await?;
        let batch = self.run_allocation(requests, before.clone())?;

        for (old, new) in before.iter().zip(&batch.members) {
            if old.available_hours != new.available_hours {
                debug!(
                    "Persisting capacity for {}: {:.1}h -> {:.1}h",
                    new.name, old.available_hours, new.available_hours
                );
                self.store.update_member(new.clone()).await?;
            }
        }

        Ok(batch)
    }

    fn run_allocation(
        &self,
        requests: &[AllocationRequest],
        mut members: Vec<TeamMember>,
    ) -> Result<AllocationBatch> {
        for request in requests {
            request.validate()?;
        }
        let results = self.engine.allocate_all(requests, &mut members);
        Ok(AllocationBatch { results, members })
    }


    pub async fn performance_metrics(&self, sprint_id: Uuid) -> Result<PerformanceMetrics> {
        self.analytics.performance_metrics(sprint_id).await
    }

    pub async fn burn_down(&self, sprint_id: Uuid) -> Result<BurnDownSeries> {
        self.analytics.burn_down(sprint_id).await
    }

    pub async fn optimize_sprint(&self, sprint_id: Uuid) -> Result<SprintOptimization> {
        self.analytics.optimize(sprint_id).await
    }

    async fn require_sprint(&self, sprint_id: Uuid) -> Result<Sprint> {
        self.store
            .get_sprint(sprint_id)
            .await?
            .ok_or_else(|| PlannerError::not_found("Sprint not found"))
    }
}

impl std::fmt::Debug for SprintPlanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SprintPlanner")
            .field("config", &self.config)
            .finish()
    }
}
