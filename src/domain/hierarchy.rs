//! Task hierarchy: index, aggregation and ordering
//!
//! The hierarchy is a flat arena of tasks linked by `parent_id`. A
//! [`HierarchyIndex`] resolves those links into positions once per call so
//! child lookups are map reads instead of repeated scans.
//!
//! [`aggregate`] rolls child schedule, progress and status up into parents
//! until a fixpoint is reached. It never fails: dangling parent references
//! are treated as roots and cyclic input is cut off by a pass bound.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use thiserror::Error;
use tracing::{debug, warn};

use super::calendar::working_days;
use super::id::TaskId;
use super::status::derive_status;
use super::task::{Task, TaskStatus};

#[derive(Debug, Error, PartialEq)]
pub enum HierarchyError {
    #[error("Duplicate task ID: {0}")]
    DuplicateId(TaskId),

    #[error("Task {task} references missing parent {parent}")]
    DanglingParent { task: TaskId, parent: TaskId },

    #[error("Parent cycle through task {0}")]
    Cycle(TaskId),
}

/// Position-based view of the parent links of a task slice
#[derive(Debug)]
pub struct HierarchyIndex<'a> {
    tasks: &'a [Task],
    positions: HashMap<&'a TaskId, usize>,
    parent: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
}

impl<'a> HierarchyIndex<'a> {
    /// Builds the index. The first occurrence of a duplicated ID wins.
    pub fn build(tasks: &'a [Task]) -> Self {
        let mut positions = HashMap::with_capacity(tasks.len());
        for (i, task) in tasks.iter().enumerate() {
            positions.entry(&task.id).or_insert(i);
        }

        let parent: Vec<Option<usize>> = tasks
            .iter()
            .map(|t| t.parent_id.as_ref().and_then(|p| positions.get(p).copied()))
            .collect();

        let mut children = vec![Vec::new(); tasks.len()];
        for (i, p) in parent.iter().enumerate() {
            if let Some(p) = p {
                children[*p].push(i);
            }
        }

        Self {
            tasks,
            positions,
            parent,
            children,
        }
    }

    pub fn position(&self, id: &TaskId) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn contains(&self, id: &TaskId) -> bool {
        self.positions.contains_key(id)
    }

    pub fn task(&self, id: &TaskId) -> Option<&'a Task> {
        self.position(id).map(|i| &self.tasks[i])
    }

    /// Direct children, in collection order
    pub fn children(&self, id: &TaskId) -> Vec<&'a Task> {
        self.position(id)
            .map(|i| self.children[i].iter().map(|c| &self.tasks[*c]).collect())
            .unwrap_or_default()
    }

    pub fn has_children(&self, id: &TaskId) -> bool {
        self.position(id)
            .map(|i| !self.children[i].is_empty())
            .unwrap_or(false)
    }

    /// Ancestor positions from the direct parent up to the root.
    ///
    /// Stops at the first repeated position, so cyclic links terminate.
    fn ancestor_positions(&self, pos: usize) -> Vec<usize> {
        let mut seen = HashSet::from([pos]);
        let mut chain = Vec::new();
        let mut current = self.parent[pos];
        while let Some(p) = current {
            if !seen.insert(p) {
                break;
            }
            chain.push(p);
            current = self.parent[p];
        }
        chain
    }

    /// Ancestors from the direct parent up to the root
    pub fn ancestors(&self, id: &TaskId) -> Vec<&'a TaskId> {
        self.position(id)
            .map(|i| {
                self.ancestor_positions(i)
                    .into_iter()
                    .map(|p| &self.tasks[p].id)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Nesting depth; roots (and tasks with a missing parent) are at 0
    pub fn depth(&self, id: &TaskId) -> usize {
        self.position(id)
            .map(|i| self.ancestor_positions(i).len())
            .unwrap_or(0)
    }

    /// Returns true if `candidate` sits anywhere below `ancestor`
    pub fn is_descendant(&self, candidate: &TaskId, ancestor: &TaskId) -> bool {
        self.ancestors(candidate).into_iter().any(|a| a == ancestor)
    }

    /// All transitive descendants, depth-first
    pub fn descendants(&self, id: &TaskId) -> Vec<&'a TaskId> {
        let Some(root) = self.position(id) else {
            return Vec::new();
        };

        let mut seen = HashSet::from([root]);
        let mut out = Vec::new();
        let mut stack: Vec<usize> = self.children[root].iter().rev().copied().collect();
        while let Some(pos) = stack.pop() {
            if !seen.insert(pos) {
                continue;
            }
            out.push(&self.tasks[pos].id);
            stack.extend(self.children[pos].iter().rev().copied());
        }
        out
    }
}

/// A row of the depth-first display order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatRow {
    pub id: TaskId,
    pub depth: usize,
}

/// Depth-first display order: parents before children, siblings in
/// collection order. Every task appears exactly once; tasks unreachable
/// from a root (cycles) are emitted as roots after the rest.
pub fn flatten(tasks: &[Task]) -> Vec<FlatRow> {
    let index = HierarchyIndex::build(tasks);
    let mut visited = vec![false; tasks.len()];
    let mut rows = Vec::with_capacity(tasks.len());

    let visit_from = |start: usize, visited: &mut Vec<bool>, rows: &mut Vec<FlatRow>| {
        let mut stack = vec![(start, 0usize)];
        while let Some((pos, depth)) = stack.pop() {
            if visited[pos] {
                continue;
            }
            visited[pos] = true;
            rows.push(FlatRow {
                id: tasks[pos].id.clone(),
                depth,
            });
            for child in index.children[pos].iter().rev() {
                stack.push((*child, depth + 1));
            }
        }
    };

    for pos in 0..tasks.len() {
        if index.parent[pos].is_none() && !visited[pos] {
            visit_from(pos, &mut visited, &mut rows);
        }
    }
    for pos in 0..tasks.len() {
        if !visited[pos] {
            visit_from(pos, &mut visited, &mut rows);
        }
    }

    rows
}

/// Reorders tasks into depth-first display order
pub fn order_depth_first(tasks: Vec<Task>) -> Vec<Task> {
    let rows = flatten(&tasks);
    let mut slots: Vec<Option<Task>> = tasks.into_iter().map(Some).collect();
    let mut lookup: HashMap<TaskId, Vec<usize>> = HashMap::new();
    for (i, task) in slots.iter().enumerate() {
        if let Some(task) = task {
            lookup.entry(task.id.clone()).or_default().push(i);
        }
    }

    let mut ordered = Vec::with_capacity(slots.len());
    for row in rows {
        if let Some(positions) = lookup.get_mut(&row.id) {
            if !positions.is_empty() {
                let pos = positions.remove(0);
                if let Some(task) = slots[pos].take() {
                    ordered.push(task);
                }
            }
        }
    }
    // duplicates of an ID are not reachable through the index
    ordered.extend(slots.into_iter().flatten());
    ordered
}

/// Removes a task together with all of its descendants.
///
/// Returns the remaining tasks and the removed IDs (empty if `id` is unknown).
pub fn remove_subtree(tasks: &[Task], id: &TaskId) -> (Vec<Task>, Vec<TaskId>) {
    let index = HierarchyIndex::build(tasks);
    if !index.contains(id) {
        return (tasks.to_vec(), Vec::new());
    }

    let mut removed: Vec<TaskId> = vec![id.clone()];
    removed.extend(index.descendants(id).into_iter().cloned());
    let doomed: HashSet<&TaskId> = removed.iter().collect();

    let remaining = tasks
        .iter()
        .filter(|t| !doomed.contains(&t.id))
        .cloned()
        .collect();
    (remaining, removed)
}

/// Reports every structural problem in the collection
pub fn validate(tasks: &[Task]) -> Vec<HierarchyError> {
    let mut errors = Vec::new();
    let mut graph: DiGraph<&TaskId, ()> = DiGraph::new();
    let mut nodes: HashMap<&TaskId, NodeIndex> = HashMap::new();

    for task in tasks {
        if nodes.contains_key(&task.id) {
            errors.push(HierarchyError::DuplicateId(task.id.clone()));
            continue;
        }
        nodes.insert(&task.id, graph.add_node(&task.id));
    }

    for task in tasks {
        let Some(parent) = &task.parent_id else {
            continue;
        };
        match (nodes.get(parent), nodes.get(&task.id)) {
            (Some(p), Some(c)) => {
                graph.add_edge(*p, *c, ());
            }
            _ => errors.push(HierarchyError::DanglingParent {
                task: task.id.clone(),
                parent: parent.clone(),
            }),
        }
    }

    if let Err(cycle) = toposort(&graph, None) {
        errors.push(HierarchyError::Cycle(graph[cycle.node_id()].clone()));
    }

    errors
}

/// Returns the first structural problem, if any
pub fn ensure_valid(tasks: &[Task]) -> Result<(), HierarchyError> {
    match validate(tasks).into_iter().next() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Derived fields of a parent task
#[derive(Debug, Clone, Copy, PartialEq)]
struct Rollup {
    start: NaiveDate,
    end: NaiveDate,
    working_days: u32,
    progress: u8,
    status: TaskStatus,
}

impl Rollup {
    fn of(task: &Task) -> Self {
        Self {
            start: task.start_date,
            end: task.end_date,
            working_days: task.working_days,
            progress: task.progress,
            status: task.status,
        }
    }

    fn apply(self, task: &mut Task) {
        task.start_date = self.start;
        task.end_date = self.end;
        task.working_days = self.working_days;
        task.progress = self.progress;
        task.status = self.status;
    }
}

/// Working-day weighted mean of progress, rounded half up.
/// Zero total weight yields 0.
pub fn weighted_progress<'t>(tasks: impl IntoIterator<Item = &'t Task>) -> u8 {
    let (weighted, weight) = tasks.into_iter().fold((0u64, 0u64), |(sum, total), c| {
        let days = u64::from(c.working_days);
        (sum + u64::from(c.progress) * days, total + days)
    });
    if weight == 0 {
        return 0;
    }
    ((2 * weighted + weight) / (2 * weight)) as u8
}

fn rollup_status(children: &[&Task]) -> TaskStatus {
    if children.iter().all(|c| c.status == TaskStatus::Done) {
        TaskStatus::Done
    } else if children.iter().all(|c| c.status == TaskStatus::Todo) {
        TaskStatus::Todo
    } else {
        TaskStatus::InProgress
    }
}

fn compute_rollup(parent: &Task, children: &[&Task]) -> Rollup {
    let start = children.iter().map(|c| c.start_date).min().unwrap_or(parent.start_date);
    let end = children.iter().map(|c| c.end_date).max().unwrap_or(parent.end_date);
    let status = match parent.hold {
        Some(hold) => hold.status(),
        None => rollup_status(children),
    };

    Rollup {
        start,
        end,
        working_days: working_days(start, end),
        progress: weighted_progress(children.iter().copied()),
        status,
    }
}

/// Recomputes every derived field of the collection.
///
/// 1. Every task gets its working days recounted and its status derived.
/// 2. Parents take the envelope of their children's schedule, the
///    working-day weighted progress and the rolled-up status. Passes repeat
///    until nothing changes; each pass reads the previous pass's values.
///
/// Order and identities are preserved.
pub fn aggregate(tasks: &[Task], today: NaiveDate) -> Vec<Task> {
    let mut current: Vec<Task> = tasks
        .iter()
        .map(|t| {
            let mut task = t.clone();
            task.working_days = task.planned_working_days();
            task.status = derive_status(&task, today);
            task
        })
        .collect();

    let parents: Vec<(usize, Vec<usize>)> = {
        let index = HierarchyIndex::build(tasks);
        index
            .children
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_empty())
            .map(|(i, c)| (i, c.clone()))
            .collect()
    };

    let max_passes = tasks.len() + 1;
    let mut pass = 0;
    loop {
        pass += 1;
        let updates: Vec<(usize, Rollup)> = parents
            .iter()
            .filter_map(|(pos, child_positions)| {
                let children: Vec<&Task> = child_positions.iter().map(|c| &current[*c]).collect();
                let rollup = compute_rollup(&current[*pos], &children);
                (rollup != Rollup::of(&current[*pos])).then_some((*pos, rollup))
            })
            .collect();

        debug!(pass, changed = updates.len(), "aggregation pass");
        if updates.is_empty() {
            break;
        }
        for (pos, rollup) in updates {
            rollup.apply(&mut current[pos]);
        }
        if pass >= max_passes {
            warn!(passes = pass, "aggregation did not settle; parent links may be cyclic");
            break;
        }
    }

    current
}
