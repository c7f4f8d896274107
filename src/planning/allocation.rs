use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::error::{PlannerError, Result};
use crate::db::models::TeamMember;


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRequest {
    pub task_id: Uuid,
    #[serde(default)]
    pub required_skills: BTreeSet<String>,
    pub estimated_hours: f64,
}

impl AllocationRequest {

    pub fn new<I, S>(task_id: Uuid, required_skills: I, estimated_hours: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            task_id,
            required_skills: required_skills.into_iter().map(Into::into).collect(),
            estimated_hours,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.estimated_hours.is_finite() || self.estimated_hours < 0.0 {
            return Err(PlannerError::validation(format!(
                "task {} estimated_hours must be a non-negative number, got {}",
                self.task_id, self.estimated_hours
            )));
        }
        Ok(())
    }
}


#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
pub enum AllocationOutcome {
    #[serde(rename = "Task allocated successfully")]
    #[strum(serialize = "Task allocated successfully")]
    Allocated,
    #[serde(rename = "No suitable member found")]
    #[strum(serialize = "No suitable member found")]
    NoSuitableMember,
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationResult {
    pub task_id: Uuid,
    pub assigned_member_id: Option<Uuid>,
    pub message: AllocationOutcome,
}

impl AllocationResult {
    pub fn is_allocated(&self) -> bool {
        self.assigned_member_id.is_some()
    }
}


/// Greedy first-fit allocation of tasks to team members.
///
/// Members are scanned in the order given. The first one holding every
/// required skill with enough remaining hours takes the task, and its
/// `available_hours` is decremented in place so later tasks in the same batch
/// see the reduced capacity. Nothing is rolled back and no global optimum is
/// searched for.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllocationEngine;

impl AllocationEngine {

    pub fn new() -> Self {
        Self
    }


    pub fn allocate(&self, task: &AllocationRequest, members: &mut [TeamMember]) -> AllocationResult {
        let candidate = members.iter_mut().find(|member| {
            member.has_skills(&task.required_skills) && member.available_hours >= task.estimated_hours
        });

        match candidate {
            Some(member) => {
                member.available_hours -= task.estimated_hours;
                debug!(
                    "Task {} -> {} ({:.1}h left)",
                    task.task_id, member.name, member.available_hours
                );
                AllocationResult {
                    task_id: task.task_id,
                    assigned_member_id: Some(member.id),
                    message: AllocationOutcome::Allocated,
                }
            }
            None => {
                warn!(
                    "No member can take task {} ({:.1}h, skills: {:?})",
                    task.task_id, task.estimated_hours, task.required_skills
                );
                AllocationResult {
                    task_id: task.task_id,
                    assigned_member_id: None,
                    message: AllocationOutcome::NoSuitableMember,
                }
            }
        }
    }


    pub fn allocate_all(
        &self,
        tasks: &[AllocationRequest],
        members: &mut [TeamMember],
    ) -> Vec<AllocationResult> {
        let mut results = Vec::with_capacity(tasks.len());
        for task in tasks {
            results.push(self.allocate(task, members));
        }

        info!(
            "Allocated {}/{} tasks across {} members",
            results.iter().filter(|r| r.is_allocated()).count(),
            results.len(),
            members.len()
        );

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(skills: &[&str], hours: f64) -> AllocationRequest {
        AllocationRequest::new(Uuid::new_v4(), skills.iter().copied(), hours)
    }

    #[test]
    fn test_first_eligible_member_wins() {
        let mut members = vec![
            TeamMember::new("A", ["rust"], 10.0),
            TeamMember::new("B", ["rust"], 10.0),
        ];
        let first = members[0].id;

        let result = AllocationEngine::new().allocate(&request(&["rust"], 4.0), &mut members);

        assert_eq!(result.assigned_member_id, Some(first));
        assert_eq!(result.message, AllocationOutcome::Allocated);
        assert!((members[0].available_hours - 6.0).abs() < 1e-9);
        assert!((members[1].available_hours - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_skips_members_missing_skills_or_hours() {
        let mut members = vec![
            TeamMember::new("frontend", ["react"], 40.0),
            TeamMember::new("busy", ["rust", "sql"], 2.0),
            TeamMember::new("fit", ["rust", "sql", "k8s"], 8.0),
        ];
        let fit = members[2].id;

        let result = AllocationEngine::new().allocate(&request(&["rust", "sql"], 8.0), &mut members);

        assert_eq!(result.assigned_member_id, Some(fit));
        assert!(members[2].available_hours.abs() < 1e-9);
    }

    #[test]
    fn test_no_match_leaves_capacity_untouched() {
        let mut members = vec![TeamMember::new("A", ["rust"], 3.0)];

        let result = AllocationEngine::new().allocate(&request(&["rust"], 5.0), &mut members);

        assert!(!result.is_allocated());
        assert_eq!(result.message, AllocationOutcome::NoSuitableMember);
        assert!((members[0].available_hours - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_batch_capacity_carries_over() {
        let mut members = vec![
            TeamMember::new("A", ["rust"], 5.0),
            TeamMember::new("B", ["rust"], 5.0),
        ];
        let (a, b) = (members[0].id, members[1].id);
        let tasks = vec![
            request(&["rust"], 4.0),
            request(&["rust"], 4.0),
            request(&["rust"], 4.0),
        ];

        let results = AllocationEngine::new().allocate_all(&tasks, &mut members);

        let assigned: Vec<Option<Uuid>> = results.iter().map(|r| r.assigned_member_id).collect();
        assert_eq!(assigned, vec![Some(a), Some(b), None]);
        assert_eq!(results[2].message, AllocationOutcome::NoSuitableMember);
        for (result, task) in results.iter().zip(&tasks) {
            assert_eq!(result.task_id, task.task_id);
        }
    }

    #[test]
    fn test_empty_members_is_not_an_error() {
        let result = AllocationEngine::new().allocate(&request(&[], 1.0), &mut []);
        assert!(!result.is_allocated());
    }

    #[test]
    fn test_outcome_messages() {
        assert_eq!(AllocationOutcome::Allocated.to_string(), "Task allocated successfully");
        let as_str: &'static str = AllocationOutcome::NoSuitableMember.into();
        assert_eq!(as_str, "No suitable member found");
        assert_eq!(
            "Task allocated successfully".parse::<AllocationOutcome>().unwrap(),
            AllocationOutcome::Allocated
        );

        let json = serde_json::to_value(AllocationResult {
            task_id: Uuid::nil(),
            assigned_member_id: None,
            message: AllocationOutcome::NoSuitableMember,
        })
        .unwrap();
        assert_eq!(json["message"], "No suitable member found");
        assert!(json["assigned_member_id"].is_null());
    }
}
