
use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::models::{Sprint, Task, TeamMember, UserStory};
use super::store::SprintStore;
use crate::core::error::Result;


#[derive(Debug, Default)]
struct Tables {
    sprints: Vec<Sprint>,
    tasks: Vec<Task>,
    stories: Vec<UserStory>,
    members: Vec<TeamMember>,
}


/// Process-local store. Rows keep insertion order so paging is stable.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {

    pub fn new() -> Self {
        Self::default()
    }
}

fn page<T: Clone>(rows: &[T], skip: usize, limit: usize) -> Vec<T> {
    rows.iter().skip(skip).take(limit).cloned().collect()
}

fn upsert<T, F>(rows: &mut Vec<T>, row: T, same: F)
where
    F: Fn(&T) -> bool,
{
    match rows.iter_mut().find(|r| same(r)) {
        Some(existing) => *existing = row,
        None => rows.push(row),
    }
}

#[async_trait]
impl SprintStore for InMemoryStore {
    async fn get_sprint(&self, id: Uuid) -> Result<Option<Sprint>> {
        Ok(self.tables.read().sprints.iter().find(|s| s.id == id).cloned())
    }

    async fn list_sprints(&self, skip: usize, limit: usize) -> Result<Vec<Sprint>> {
        Ok(page(&self.tables.read().sprints, skip, limit))
    }

    async fn insert_sprint(&self, sprint: Sprint) -> Result<Sprint> {
        debug!("Storing sprint {}", sprint.id);
        let id = sprint.id;
        upsert(&mut self.tables.write().sprints, sprint.clone(), |s| s.id == id);
        Ok(sprint)
    }

    async fn get_task(&self, id: Uuid) -> Result<Option<Task>> {
        Ok(self.tables.read().tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn list_tasks(&self, skip: usize, limit: usize) -> Result<Vec<Task>> {
        Ok(page(&self.tables.read().tasks, skip, limit))
    }

    async fn insert_task(&self, task: Task) -> Result<Task> {
        debug!("Storing task {} ({})", task.id, task.title);
        let id = task.id;
        upsert(&mut self.tables.write().tasks, task.clone(), |t| t.id == id);
        Ok(task)
    }

    async fn tasks_for_sprint(&self, sprint_id: Uuid) -> Result<Vec<Task>> {
        let tables = self.tables.read();
        let story_ids: Vec<Uuid> = tables
            .stories
            .iter()
            .filter(|s| s.sprint_id == Some(sprint_id))
            .map(|s| s.id)
            .collect();

        Ok(tables
            .tasks
            .iter()
            .filter(|t| {
                t.sprint_id == Some(sprint_id)
                    || t.user_story_id.is_some_and(|id| story_ids.contains(&id))
            })
            .cloned()
            .collect())
    }

    async fn insert_user_story(&self, story: UserStory) -> Result<UserStory> {
        debug!("Storing user story {}", story.id);
        let id = story.id;
        upsert(&mut self.tables.write().stories, story.clone(), |s| s.id == id);
        Ok(story)
    }

    async fn list_user_stories(&self, skip: usize, limit: usize) -> Result<Vec<UserStory>> {
        Ok(page(&self.tables.read().stories, skip, limit))
    }

    async fn user_stories_for_sprint(&self, sprint_id: Uuid) -> Result<Vec<UserStory>> {
        Ok(self
            .tables
            .read()
            .stories
            .iter()
            .filter(|s| s.sprint_id == Some(sprint_id))
            .cloned()
            .collect())
    }

    async fn get_member(&self, id: Uuid) -> Result<Option<TeamMember>> {
        Ok(self.tables.read().members.iter().find(|m| m.id == id).cloned())
    }

    async fn list_members(&self, skip: usize, limit: usize) -> Result<Vec<TeamMember>> {
        Ok(page(&self.tables.read().members, skip, limit))
    }

    async fn insert_member(&self, member: TeamMember) -> Result<TeamMember> {
        debug!("Storing team member {} ({})", member.id, member.name);
        let id = member.id;
        upsert(&mut self.tables.write().members, member.clone(), |m| m.id == id);
        Ok(member)
    }

    async fn update_member(&self, member: TeamMember) -> Result<Option<TeamMember>> {
        let mut tables = self.tables.write();
        match tables.members.iter_mut().find(|m| m.id == member.id) {
            Some(existing) => {
                *existing = member.clone();
                Ok(Some(member))
            }
            None => Ok(None),
        }
    }

    async fn delete_member(&self, id: Uuid) -> Result<Option<TeamMember>> {
        let mut tables = self.tables.write();
        let position = tables.members.iter().position(|m| m.id == id);
        Ok(position.map(|idx| tables.members.remove(idx)))
    }
}
