//! Drag-and-drop reparenting
//!
//! A drop is described by the dragged task, the row it was dropped after and
//! a horizontal pixel offset. The offset is turned into an indentation change
//! of one level per `pixels_per_level` pixels. The dragged task moves with its
//! whole subtree, so a drop can never put a task under its own descendant.

use chrono::NaiveDate;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

use super::hierarchy::{aggregate, order_depth_first, HierarchyIndex};
use super::id::TaskId;
use super::task::Task;

/// Indentation width of one nesting level, in pixels
pub const DEFAULT_PIXELS_PER_LEVEL: u32 = 24;

/// A single drag-and-drop gesture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRequest {
    /// The dragged task
    pub moved: TaskId,
    /// Row the task was dropped after; `None` drops it at the top of the list.
    /// Dropping a task on itself keeps its position and only changes depth.
    pub target: Option<TaskId>,
    /// Horizontal drag distance in pixels (positive = indent)
    pub horizontal_delta: i32,
}

impl MoveRequest {
    pub fn after(moved: TaskId, target: TaskId, horizontal_delta: i32) -> Self {
        Self {
            moved,
            target: Some(target),
            horizontal_delta,
        }
    }

    pub fn to_top(moved: TaskId) -> Self {
        Self {
            moved,
            target: None,
            horizontal_delta: 0,
        }
    }
}

/// Why a move left the collection untouched
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MoveRejection {
    #[error("Task not found: {0}")]
    UnknownTask(TaskId),

    #[error("Cannot move {moved} below its own descendant {target}")]
    Cycle { moved: TaskId, target: TaskId },
}

/// Result of [`resolve_move`]
#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    /// Reordered, reparented and re-aggregated collection
    Moved {
        tasks: Vec<Task>,
        parent: Option<TaskId>,
    },
    /// The input, unchanged
    Rejected {
        tasks: Vec<Task>,
        reason: MoveRejection,
    },
}

impl MoveOutcome {
    pub fn tasks(&self) -> &[Task] {
        match self {
            MoveOutcome::Moved { tasks, .. } | MoveOutcome::Rejected { tasks, .. } => tasks,
        }
    }

    pub fn into_tasks(self) -> Vec<Task> {
        match self {
            MoveOutcome::Moved { tasks, .. } | MoveOutcome::Rejected { tasks, .. } => tasks,
        }
    }

    pub fn is_moved(&self) -> bool {
        matches!(self, MoveOutcome::Moved { .. })
    }
}

/// Converts a pixel offset to whole levels, rounding halves toward +∞
pub fn level_shift(horizontal_delta: i32, pixels_per_level: u32) -> i64 {
    if pixels_per_level == 0 {
        return 0;
    }
    let delta = i64::from(horizontal_delta);
    let unit = i64::from(pixels_per_level);
    (2 * delta + unit).div_euclid(2 * unit)
}

/// Applies a drop gesture and re-aggregates the collection.
///
/// The tasks are expected in display order. Moves onto an unknown task or
/// below the dragged task's own subtree are rejected and return the input.
pub fn resolve_move(
    tasks: &[Task],
    request: &MoveRequest,
    pixels_per_level: u32,
    today: NaiveDate,
) -> MoveOutcome {
    let reject = |reason: MoveRejection| {
        debug!(%reason, "move rejected");
        MoveOutcome::Rejected {
            tasks: tasks.to_vec(),
            reason,
        }
    };

    let index = HierarchyIndex::build(tasks);
    if !index.contains(&request.moved) {
        return reject(MoveRejection::UnknownTask(request.moved.clone()));
    }
    if let Some(target) = &request.target {
        if !index.contains(target) {
            return reject(MoveRejection::UnknownTask(target.clone()));
        }
        if target != &request.moved && index.is_descendant(target, &request.moved) {
            return reject(MoveRejection::Cycle {
                moved: request.moved.clone(),
                target: target.clone(),
            });
        }
    }

    let mut block_ids: HashSet<&TaskId> = index.descendants(&request.moved).into_iter().collect();
    block_ids.insert(&request.moved);

    let (block, rest): (Vec<&Task>, Vec<&Task>) =
        tasks.iter().partition(|t| block_ids.contains(&t.id));

    let insert_at = match &request.target {
        None => 0,
        Some(target) if target == &request.moved => {
            let moved_pos = index.position(&request.moved).unwrap_or(0);
            tasks[..moved_pos]
                .iter()
                .filter(|t| !block_ids.contains(&t.id))
                .count()
        }
        Some(target) => rest
            .iter()
            .position(|t| &t.id == target)
            .map(|p| p + 1)
            .unwrap_or(rest.len()),
    };

    let parent = if insert_at == 0 {
        None
    } else {
        let prev = &rest[insert_at - 1].id;
        let prev_depth = index.depth(prev);
        let max_depth = prev_depth as i64 + 1;
        let current_depth = index.depth(&request.moved) as i64;
        let projected = (current_depth + level_shift(request.horizontal_delta, pixels_per_level)).max(0);
        let target_depth = projected.min(max_depth);

        if target_depth == max_depth {
            Some(prev.clone())
        } else if target_depth == 0 {
            None
        } else {
            let wanted = (target_depth - 1) as usize;
            let found = index
                .ancestors(prev)
                .into_iter()
                .find(|a| index.depth(a) == wanted)
                .cloned();
            if found.is_none() {
                warn!(task = %request.moved, depth = target_depth, "no ancestor at target depth; moving to root");
            }
            found
        }
    };

    let mut reordered: Vec<Task> = Vec::with_capacity(tasks.len());
    reordered.extend(rest[..insert_at].iter().map(|t| (*t).clone()));
    reordered.extend(block.iter().map(|t| (*t).clone()));
    reordered.extend(rest[insert_at..].iter().map(|t| (*t).clone()));

    if let Some(moved) = reordered.iter_mut().find(|t| t.id == request.moved) {
        moved.parent_id = parent.clone();
    }

    debug!(task = %request.moved, parent = ?parent, "task moved");
    let tasks = aggregate(&order_depth_first(reordered), today);
    MoveOutcome::Moved { tasks, parent }
}
