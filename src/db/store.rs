use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use super::models::{Sprint, Task, TeamMember, UserStory};
use crate::core::error::Result;


/// Data access the planner needs from the persistence layer.
///
/// Lookups return `Ok(None)` on a miss; the callers decide whether a miss is
/// a `NotFound` error. `update_member` and `delete_member` report a miss the
/// same way.
#[async_trait]
pub trait SprintStore: Send + Sync {

    async fn get_sprint(&self, id: Uuid) -> Result<Option<Sprint>>;

    async fn list_sprints(&self, skip: usize, limit: usize) -> Result<Vec<Sprint>>;

    async fn insert_sprint(&self, sprint: Sprint) -> Result<Sprint>;


    async fn get_task(&self, id: Uuid) -> Result<Option<Task>>;

    async fn list_tasks(&self, skip: usize, limit: usize) -> Result<Vec<Task>>;

    async fn insert_task(&self, task: Task) -> Result<Task>;

    /// Tasks attached to the sprint directly or through one of its user stories.
    async fn tasks_for_sprint(&self, sprint_id: Uuid) -> Result<Vec<Task>>;


    async fn insert_user_story(&self, story: UserStory) -> Result<UserStory>;

    async fn list_user_stories(&self, skip: usize, limit: usize) -> Result<Vec<UserStory>>;

    async fn user_stories_for_sprint(&self, sprint_id: Uuid) -> Result<Vec<UserStory>>;


    async fn get_member(&self, id: Uuid) -> Result<Option<TeamMember>>;

    async fn list_members(&self, skip: usize, limit: usize) -> Result<Vec<TeamMember>>;

    async fn insert_member(&self, member: TeamMember) -> Result<TeamMember>;

    async fn update_member(&self, member: TeamMember) -> Result<Option<TeamMember>>;

    async fn delete_member(&self, id: Uuid) -> Result<Option<TeamMember>>;
}


#[async_trait]
impl SprintStore for Arc<dyn SprintStore> {
    async fn get_sprint(&self, id: Uuid) -> Result<Option<Sprint>> {
        (**self).get_sprint(id).await
    }

    async fn list_sprints(&self, skip: usize, limit: usize) -> Result<Vec<Sprint>> {
        (**self).list_sprints(skip, limit).await
    }

    async fn insert_sprint(&self, sprint: Sprint) -> Result<Sprint> {
        (**self).insert_sprint(sprint).await
    }

    async fn get_task(&self, id: Uuid) -> Result<Option<Task>> {
        (**self).get_task(id).await
    }

    async fn list_tasks(&self, skip: usize, limit: usize) -> Result<Vec<Task>> {
        (**self).list_tasks(skip, limit).await
    }

    async fn insert_task(&self, task: Task) -> Result<Task> {
        (**self).insert_task(task).await
    }

    async fn tasks_for_sprint(&self, sprint_id: Uuid) -> Result<Vec<Task>> {
        (**self).tasks_for_sprint(sprint_id).await
    }

    async fn insert_user_story(&self, story: UserStory) -> Result<UserStory> {
        (**self).insert_user_story(story).await
    }

    async fn list_user_stories(&self, skip: usize, limit: usize) -> Result<Vec<UserStory>> {
        (**self).list_user_stories(skip, limit).await
    }

    async fn user_stories_for_sprint(&self, sprint_id: Uuid) -> Result<Vec<UserStory>> {
        (**self).user_stories_for_sprint(sprint_id).await
    }

    async fn get_member(&self, id: Uuid) -> Result<Option<TeamMember>> {
        (**self).get_member(id).await
    }

    async fn list_members(&self, skip: usize, limit: usize) -> Result<Vec<TeamMember>> {
        (**self).list_members(skip, limit).await
    }

    async fn insert_member(&self, member: TeamMember) -> Result<TeamMember> {
        (**self).insert_member(member).await
    }

    async fn update_member(&self, member: TeamMember) -> Result<Option<TeamMember>> {
        (**self).update_member(member).await
    }

    async fn delete_member(&self, id: Uuid) -> Result<Option<TeamMember>> {
        (**self).delete_member(id).await
    }
}
