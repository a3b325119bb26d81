//! Project dashboard figures and per-assignee load

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use super::hierarchy::weighted_progress;
use super::id::TaskId;
use super::task::Task;

/// Headline numbers for a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct ProjectStats {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub at_risk_tasks: usize,
    /// Working-day weighted progress of leaf tasks
    pub overall_progress: u8,
}

/// Open work assigned to one person
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceLoad {
    pub assignee: String,
    pub active_tasks: usize,
    pub remaining_days: u32,
}

fn parent_ids(tasks: &[Task]) -> HashSet<&TaskId> {
    tasks.iter().filter_map(|t| t.parent_id.as_ref()).collect()
}

/// Leaf tasks: nothing references them as a parent
pub fn leaves(tasks: &[Task]) -> impl Iterator<Item = &Task> {
    let parents = parent_ids(tasks);
    tasks.iter().filter(move |t| !parents.contains(&t.id))
}

pub fn project_stats(tasks: &[Task]) -> ProjectStats {
    ProjectStats {
        total_tasks: tasks.len(),
        completed_tasks: tasks.iter().filter(|t| t.status.is_complete()).count(),
        at_risk_tasks: tasks.iter().filter(|t| t.status.is_at_risk()).count(),
        overall_progress: weighted_progress(leaves(tasks)),
    }
}

/// Unfinished leaf work per assignee, sorted by assignee
pub fn resource_load(tasks: &[Task]) -> Vec<ResourceLoad> {
    let mut load: BTreeMap<&str, (usize, u32)> = BTreeMap::new();
    for task in leaves(tasks).filter(|t| !t.status.is_complete()) {
        let Some(assignee) = task.assignee_id.as_deref() else {
            continue;
        };
        let entry = load.entry(assignee).or_default();
        entry.0 += 1;
        entry.1 += task.working_days;
    }

    load.into_iter()
        .map(|(assignee, (active_tasks, remaining_days))| ResourceLoad {
            assignee: assignee.to_string(),
            active_tasks,
            remaining_days,
        })
        .collect()
}
