use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::error::{PlannerError, Result};


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    pub estimated_hours: f64,
    #[serde(default)]
    pub user_story_id: Option<Uuid>,
    #[serde(default)]
    pub sprint_id: Option<Uuid>,
    #[serde(default)]
    pub assignee_id: Option<Uuid>,
}

impl Task {

    pub fn new(title: impl Into<String>, estimated_hours: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: None,
            completed: false,
            estimated_hours,
            user_story_id: None,
            sprint_id: None,
            assignee_id: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn in_sprint(mut self, sprint_id: Uuid) -> Self {
        self.sprint_id = Some(sprint_id);
        self
    }

    pub fn in_story(mut self, user_story_id: Uuid) -> Self {
        self.user_story_id = Some(user_story_id);
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.estimated_hours.is_finite() || self.estimated_hours < 0.0 {
            return Err(PlannerError::validation(format!(
                "estimated_hours must be a non-negative number, got {}",
                self.estimated_hours
            )));
        }
        Ok(())
    }
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprint {
    pub id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Sprint {

    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            start_date,
            end_date,
        }
    }

    /// Length in whole days; zero for a single-day sprint.
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }

    pub fn validate(&self) -> Result<()> {
        if self.end_date < self.start_date {
            return Err(PlannerError::validation(format!(
                "sprint end_date {} is before start_date {}",
                self.end_date, self.start_date
            )));
        }
        Ok(())
    }
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStory {
    pub id: Uuid,
    pub story: String,
    #[serde(default)]
    pub sprint_id: Option<Uuid>,
}

impl UserStory {

    pub fn new(story: impl Into<String>, sprint_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            story: story.into(),
            sprint_id,
        }
    }
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub skills: BTreeSet<String>,
    pub available_hours: f64,
}

impl TeamMember {

    pub fn new<I, S>(name: impl Into<String>, skills: I, available_hours: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            skills: skills.into_iter().map(Into::into).collect(),
            available_hours,
        }
    }

    pub fn has_skills(&self, required: &BTreeSet<String>) -> bool {
        required.is_subset(&self.skills)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.available_hours.is_finite() || self.available_hours < 0.0 {
            return Err(PlannerError::validation(format!(
                "available_hours must be a non-negative number, got {}",
                self.available_hours
            )));
        }
        Ok(())
    }
}
