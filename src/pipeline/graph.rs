//! Dependency graph of build tasks.

use super::{Profile, Task};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("task `{task}` depends on `{missing}`, which is not in the graph")]
    UnknownPredecessor { task: Task, missing: Task },

    #[error("dependency cycle between: {0:?}")]
    Cycle(Vec<Task>),
}

/// Tasks and their predecessor edges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskGraph {
    predecessors: FxHashMap<Task, BTreeSet<Task>>,
}

impl TaskGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `task` with the given predecessors. Re-adding a task extends its
    /// predecessor set.
    pub fn add(&mut self, task: Task, after: &[Task]) -> &mut Self {
        self.predecessors
            .entry(task)
            .or_default()
            .extend(after.iter().copied());
        self
    }

    /// Clean → Manifest → Fonts → {Html, Styles, Scripts, Images}.
    ///
    /// Both profiles share the skeleton; they differ in what the tasks do.
    pub fn for_profile(_profile: Profile) -> Self {
        let mut graph = Self::new();
        graph
            .add(Task::Clean, &[])
            .add(Task::Manifest, &[Task::Clean])
            .add(Task::Fonts, &[Task::Manifest]);
        for leaf in [Task::Html, Task::Styles, Task::Scripts, Task::Images] {
            graph.add(leaf, &[Task::Fonts]);
        }
        graph
    }

    fn contains(&self, task: Task) -> bool {
        self.predecessors.contains_key(&task)
    }

    pub fn len(&self) -> usize {
        self.predecessors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predecessors.is_empty()
    }

    /// Layer the graph into stages: every task runs after all of its
    /// predecessors' stages. Tasks within a stage are sorted.
    pub fn stages(&self) -> Result<Vec<Vec<Task>>, GraphError> {
        let mut remaining: FxHashMap<Task, usize> = FxHashMap::default();
        let mut successors: FxHashMap<Task, Vec<Task>> = FxHashMap::default();

        for (&task, preds) in &self.predecessors {
            for &pred in preds {
                if !self.contains(pred) {
                    return Err(GraphError::UnknownPredecessor {
                        task,
                        missing: pred,
                    });
                }
                successors.entry(pred).or_default().push(task);
            }
            remaining.insert(task, preds.len());
        }

        let mut ready: Vec<Task> = remaining
            .iter()
            .filter(|&(_, &n)| n == 0)
            .map(|(&t, _)| t)
            .collect();
        let mut stages = Vec::new();
        let mut placed = 0;

        while !ready.is_empty() {
            ready.sort_unstable();
            let mut next = Vec::new();
            for task in &ready {
                for succ in successors.get(task).into_iter().flatten() {
                    if let Some(n) = remaining.get_mut(succ) {
                        *n -= 1;
                        if *n == 0 {
                            next.push(*succ);
                        }
                    }
                }
            }
            placed += ready.len();
            stages.push(std::mem::replace(&mut ready, next));
        }

        if placed != self.len() {
            let mut stuck: Vec<Task> = remaining
                .into_iter()
                .filter(|&(_, n)| n > 0)
                .map(|(t, _)| t)
                .collect();
            stuck.sort_unstable();
            return Err(GraphError::Cycle(stuck));
        }

        Ok(stages)
    }

    /// Keep only `keep`, connecting each kept task to the nearest kept
    /// ancestors through any dropped ones.
    pub fn subgraph(&self, keep: &FxHashSet<Task>) -> Self {
        let mut graph = Self::new();
        for (&task, _) in self.predecessors.iter().filter(|(t, _)| keep.contains(t)) {
            let mut preds = BTreeSet::new();
            let mut visited = FxHashSet::default();
            self.kept_ancestors(task, keep, &mut visited, &mut preds);
            graph.predecessors.insert(task, preds);
        }
        graph
    }

    fn kept_ancestors(
        &self,
        task: Task,
        keep: &FxHashSet<Task>,
        visited: &mut FxHashSet<Task>,
        out: &mut BTreeSet<Task>,
    ) {
        for &pred in self.predecessors.get(&task).into_iter().flatten() {
            if !visited.insert(pred) {
                continue;
            }
            if keep.contains(&pred) {
                out.insert(pred);
            } else {
                self.kept_ancestors(pred, keep, visited, out);
            }
        }
    }
}
