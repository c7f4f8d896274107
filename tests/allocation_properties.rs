use std::collections::BTreeSet;

use proptest::prelude::*;
use sprint_planner::db::TeamMember;
use sprint_planner::planning::{AllocationEngine, AllocationOutcome, AllocationRequest};
use uuid::Uuid;

const SKILLS: [&str; 4] = ["rust", "sql", "react", "ops"];

fn skill_set() -> impl Strategy<Value = BTreeSet<String>> {
    proptest::sample::subsequence(SKILLS.to_vec(), 0..=SKILLS.len())
        .prop_map(|s| s.into_iter().map(String::from).collect())
}

fn member() -> impl Strategy<Value = TeamMember> {
    (skill_set(), 0u32..40).prop_map(|(skills, hours)| TeamMember::new("m", skills, hours as f64))
}

fn request() -> impl Strategy<Value = AllocationRequest> {
    (skill_set(), 0u32..16)
        .prop_map(|(skills, hours)| AllocationRequest::new(Uuid::new_v4(), skills, hours as f64))
}

proptest! {
    #[test]
    fn assignment_respects_skills_and_capacity(
        members in prop::collection::vec(member(), 0..6),
        tasks in prop::collection::vec(request(), 0..12),
    ) {
        let engine = AllocationEngine::new();
        let mut members = members;

        for task in &tasks {
            let before = members.clone();
            let result = engine.allocate(task, &mut members);
            prop_assert_eq!(result.task_id, task.task_id);

            match result.assigned_member_id {
                Some(id) => {
                    prop_assert_eq!(result.message, AllocationOutcome::Allocated);
                    let idx = before.iter().position(|m| m.id == id).unwrap();
                    let chosen = &before[idx];
                    prop_assert!(task.required_skills.is_subset(&chosen.skills));
                    prop_assert!(chosen.available_hours >= task.estimated_hours);
                    prop_assert_eq!(
                        members[idx].available_hours,
                        chosen.available_hours - task.estimated_hours
                    );

                    // nobody earlier in the list was eligible
                    for earlier in &before[..idx] {
                        prop_assert!(
                            !task.required_skills.is_subset(&earlier.skills)
                                || earlier.available_hours < task.estimated_hours
                        );
                    }
                    for (i, (b, a)) in before.iter().zip(&members).enumerate() {
                        if i != idx {
                            prop_assert_eq!(b, a);
                        }
                    }
                }
                None => {
                    prop_assert_eq!(result.message, AllocationOutcome::NoSuitableMember);
                    prop_assert_eq!(&before, &members);
                    let none_eligible = before.iter().all(|m| {
                        !task.required_skills.is_subset(&m.skills)
                            || m.available_hours < task.estimated_hours
                    });
                    prop_assert!(none_eligible);
                }
            }
        }
    }

    #[test]
    fn batch_matches_sequential_allocation(
        members in prop::collection::vec(member(), 0..6),
        tasks in prop::collection::vec(request(), 0..12),
    ) {
        let engine = AllocationEngine::new();

        let mut batch_members = members.clone();
        let batch = engine.allocate_all(&tasks, &mut batch_members);

        let mut seq_members = members;
        let sequential: Vec<_> = tasks.iter().map(|t| engine.allocate(t, &mut seq_members)).collect();

        prop_assert_eq!(batch, sequential);
        prop_assert_eq!(batch_members, seq_members);
    }

    #[test]
    fn capacity_never_goes_negative(
        members in prop::collection::vec(member(), 1..6),
        tasks in prop::collection::vec(request(), 0..20),
    ) {
        let mut members = members;
        AllocationEngine::new().allocate_all(&tasks, &mut members);
        prop_assert!(members.iter().all(|m| m.available_hours >= 0.0));
    }
}
