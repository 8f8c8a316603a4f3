//! Stage-by-stage execution of a task graph.

use super::{BuildContext, Executor, GraphError, Task, TaskGraph};
use crate::{log, reload::ReloadKind};
use rayon::prelude::*;
use std::time::Instant;

/// Outcome of a graph run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub completed: Vec<Task>,
    pub failed: Vec<Task>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Run every stage of `graph` in order, the tasks of a stage in parallel.
///
/// A failing task is logged and recorded; its siblings and all later stages
/// still run. In development each finished task triggers a live reload.
pub fn run(
    graph: &TaskGraph,
    ctx: &BuildContext<'_>,
    executor: &dyn Executor,
) -> Result<RunReport, GraphError> {
    let stages = graph.stages()?;
    let mut report = RunReport::default();

    for stage in stages {
        let results: Vec<_> = stage
            .par_iter()
            .map(|&task| {
                let start = Instant::now();
                let result = executor.execute(task, ctx);
                (task, result, start.elapsed())
            })
            .collect();

        for (task, result, elapsed) in results {
            match result {
                Ok(()) => {
                    log!("build"; "{task} done in {}ms", elapsed.as_millis());
                    report.completed.push(task);
                    if !ctx.is_production()
                        && let Some(kind) = ReloadKind::after(task)
                    {
                        ctx.reload.reload(kind);
                    }
                }
                Err(e) => {
                    log!("error"; "{task}: {e:#}");
                    report.failed.push(task);
                }
            }
        }
    }

    Ok(report)
}
