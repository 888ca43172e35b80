use super::config::{EngineConfig, FailurePolicy};
use super::report::{ConsoleReporter, Reporter};
use crate::graph::{StepGraph, StepId};
use crate::result::{Result, StepError};
use crate::step::{command_line, staleness, FsTimestamps, Step, Timestamps};
use crate::utils::process::{CommandRunner, Invocation, ProcessRunner};
use camino::Utf8PathBuf;
use serde::Serialize;
use smol_str::SmolStr;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Why a step failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FailureCause {
    /// The program could not be started.
    Spawn { program: SmolStr, message: String },
    /// The program ran and exited unsuccessfully. `None` means it was killed by a signal.
    Exit { code: Option<i32> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildFailure {
    pub step: StepId,
    pub output: Utf8PathBuf,
    pub cause: FailureCause,
}

impl fmt::Display for BuildFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            FailureCause::Spawn { program, message } => write!(
                f,
                "Step {} ({}) could not start '{}': {}",
                self.step, self.output, program, message
            ),
            FailureCause::Exit { code: Some(code) } => write!(
                f,
                "Step {} ({}) failed with exit code {}",
                self.step, self.output, code
            ),
            FailureCause::Exit { code: None } => write!(
                f,
                "Step {} ({}) was terminated by a signal",
                self.step, self.output
            ),
        }
    }
}

/// What one call to [`Engine::build`] did.
#[derive(Debug, Default, Clone, Serialize)]
pub struct BuildSummary {
    /// Stale steps, in execution order. Under dry run they were only reported.
    pub executed: Vec<StepId>,
    pub up_to_date: Vec<StepId>,
    /// Steps not evaluated because a dependency failed.
    pub skipped: Vec<StepId>,
    pub dry_run: bool,
}

impl BuildSummary {
    pub fn ran(&self, id: StepId) -> bool {
        self.executed.contains(&id)
    }
}

/** Dependency-first build driver
 *
 * # Traversal
 * 1. Plans a post-order walk from the root, dependencies in declaration
 *    order, each step at most once, cycles rejected up front
 * 2. Skips steps whose output is newer than all of their inputs
 * 3. Expands the stale step's templates, reports the command line and runs it
 *
 * # Collaborators
 * - `R`: runs commands (child processes by default)
 * - `T`: supplies modification times (filesystem by default)
 * - `P`: receives progress (stdout by default)
 *
 * Steps run one at a time; each command finishes before the next starts.
 */
pub struct Engine<R = ProcessRunner, T = FsTimestamps, P = ConsoleReporter> {
    runner: R,
    timestamps: T,
    reporter: P,
    policy: FailurePolicy,
    dry_run: bool,
}

impl Engine {
    pub fn new() -> Self {
        Self::with_parts(ProcessRunner::new(), FsTimestamps, ConsoleReporter::default())
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, T, P> Engine<R, T, P>
where
    R: CommandRunner,
    T: Timestamps,
    P: Reporter,
{
    pub fn with_parts(runner: R, timestamps: T, reporter: P) -> Self {
        Self {
            runner,
            timestamps,
            reporter,
            policy: FailurePolicy::default(),
            dry_run: false,
        }
    }

    pub fn with_config(mut self, config: &EngineConfig) -> Self {
        self.policy = config.failure_policy;
        self.dry_run = config.dry_run;
        self
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn runner_mut(&mut self) -> &mut R {
        &mut self.runner
    }

    pub fn reporter(&self) -> &P {
        &self.reporter
    }

    /** Builds `root` and everything it depends on
     *
     * # Returns
     * - `Ok(summary)` when every stale step succeeded
     * - `Err(StepError::Build)` on the first failure under `AbortOnFirst`
     * - `Err(StepError::Incomplete)` with every failure under `KeepGoing`
     * - `Err(StepError::Cycle)` before anything runs if the graph loops
     */
    pub async fn build(&mut self, graph: &StepGraph, root: StepId) -> Result<BuildSummary> {
        let order = plan(graph, root)?;
        log::info!(
            "Building {} ({} step(s) reachable)",
            graph.step(root)?.output(),
            order.len()
        );

        let mut summary = BuildSummary {
            dry_run: self.dry_run,
            ..BuildSummary::default()
        };
        let mut failures = Vec::new();
        let mut broken: HashSet<StepId> = HashSet::new();

        for id in order {
            let step = graph.step(id)?;

            if step.dependencies().iter().any(|dep| broken.contains(dep)) {
                log::warn!("Skipping {}: a dependency failed", step.output());
                self.reporter.skipped(id, step);
                broken.insert(id);
                summary.skipped.push(id);
                continue;
            }

            let reason = staleness(step, &self.timestamps).await;
            if !reason.is_stale() {
                log::debug!("{} is up to date", step.output());
                self.reporter.up_to_date(id, step);
                summary.up_to_date.push(id);
                continue;
            }

            log::debug!("{} is stale: {}", step.output(), reason);
            self.reporter.stale(id, step, &reason);

            match self.execute(id, step).await {
                Ok(()) => summary.executed.push(id),
                Err(failure) => {
                    log::error!("{}", failure);
                    self.reporter.failed(&failure);

                    match self.policy {
                        FailurePolicy::AbortOnFirst => return Err(failure.into()),
                        FailurePolicy::KeepGoing => {
                            broken.insert(id);
                            failures.push(failure);
                        }
                    }
                }
            }
        }

        if !failures.is_empty() {
            return Err(StepError::Incomplete { failures });
        }

        Ok(summary)
    }

    async fn execute(&mut self, id: StepId, step: &Step) -> std::result::Result<(), BuildFailure> {
        let mut argv = command_line(step);
        self.reporter.command(id, step, &argv);

        if self.dry_run {
            return Ok(());
        }

        let invocation = Invocation {
            step: id,
            program: SmolStr::new(step.command()),
            args: argv.split_off(1),
            output: step.output().to_owned(),
        };

        log::info!("Running {} for {}", invocation.program, invocation.output);

        let cause = match self.runner.run(&invocation).await {
            Ok(status) if status.success => return Ok(()),
            Ok(status) => FailureCause::Exit { code: status.code },
            Err(e) => FailureCause::Spawn {
                program: invocation.program.clone(),
                message: e.to_string(),
            },
        };

        Err(BuildFailure {
            step: id,
            output: invocation.output,
            cause,
        })
    }
}

#[derive(Clone, Copy)]
enum Mark {
    Visiting,
    Done,
}

/** Order in which `build` evaluates the steps reachable from `root`
 *
 * Post-order over dependencies in declaration order. A step reachable through
 * several paths appears once, at its first completion.
 */
pub fn plan(graph: &StepGraph, root: StepId) -> Result<Vec<StepId>> {
    graph.step(root)?;

    let mut marks: HashMap<StepId, Mark> = HashMap::new();
    let mut order = Vec::new();
    let mut stack: Vec<(StepId, usize)> = vec![(root, 0)];
    marks.insert(root, Mark::Visiting);

    while let Some(&(id, next)) = stack.last() {
        let dependencies = graph.step(id)?.dependencies();

        if next == dependencies.len() {
            stack.pop();
            marks.insert(id, Mark::Done);
            order.push(id);
            continue;
        }

        let top = stack.len() - 1;
        stack[top].1 += 1;

        let dep = *dependencies.get(next);
        match marks.get(&dep) {
            Some(Mark::Done) => {}
            Some(Mark::Visiting) => {
                let start = stack.iter().position(|&(s, _)| s == dep).unwrap_or(0);
                let mut steps = Vec::new();
                for &(s, _) in &stack[start..] {
                    steps.push(graph.step(s)?.output().to_owned());
                }
                steps.push(graph.step(dep)?.output().to_owned());
                return Err(StepError::Cycle { steps });
            }
            None => {
                graph.step(dep)?;
                marks.insert(dep, Mark::Visiting);
                stack.push((dep, 0));
            }
        }
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with(outputs: &[&str]) -> (StepGraph, Vec<StepId>) {
        let mut graph = StepGraph::new();
        let ids = outputs
            .iter()
            .map(|out| graph.add_step("cc", *out).unwrap())
            .collect();
        (graph, ids)
    }

    #[test]
    fn plan_orders_a_chain_dependencies_first() {
        let (mut graph, ids) = graph_with(&["a", "b", "c"]);
        graph.add_dependency(ids[0], ids[1]).unwrap();
        graph.add_dependency(ids[1], ids[2]).unwrap();

        assert_eq!(plan(&graph, ids[0]).unwrap(), vec![ids[2], ids[1], ids[0]]);
    }

    #[test]
    fn plan_visits_shared_dependency_once() {
        let (mut graph, ids) = graph_with(&["a", "b", "c", "d"]);
        let (a, b, c, d) = (ids[0], ids[1], ids[2], ids[3]);
        graph.add_dependency(a, b).unwrap();
        graph.add_dependency(a, c).unwrap();
        graph.add_dependency(b, d).unwrap();
        graph.add_dependency(c, d).unwrap();

        assert_eq!(plan(&graph, a).unwrap(), vec![d, b, c, a]);
    }

    #[test]
    fn plan_only_covers_reachable_steps() {
        let (mut graph, ids) = graph_with(&["a", "b", "unrelated"]);
        graph.add_dependency(ids[0], ids[1]).unwrap();

        assert_eq!(plan(&graph, ids[1]).unwrap(), vec![ids[1]]);
        assert_eq!(plan(&graph, ids[0]).unwrap(), vec![ids[1], ids[0]]);
    }

    #[test]
    fn plan_reports_cycles_with_their_path() {
        let (mut graph, ids) = graph_with(&["a", "b", "c"]);
        graph.add_dependency(ids[0], ids[1]).unwrap();
        graph.add_dependency(ids[1], ids[2]).unwrap();
        graph.add_dependency(ids[2], ids[1]).unwrap();

        match plan(&graph, ids[0]) {
            Err(StepError::Cycle { steps }) => assert_eq!(steps, ["b", "c", "b"]),
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn plan_rejects_unknown_root() {
        let (graph, _) = graph_with(&["a"]);

        assert!(matches!(
            plan(&graph, StepId::new(9)),
            Err(StepError::UnknownStep(_))
        ));
    }

    #[test]
    fn failure_messages_name_step_and_cause() {
        let exit = BuildFailure {
            step: StepId::new(1),
            output: "app".into(),
            cause: FailureCause::Exit { code: Some(1) },
        };
        let spawn = BuildFailure {
            cause: FailureCause::Spawn {
                program: "gcc".into(),
                message: "not found".into(),
            },
            ..exit.clone()
        };

        assert_eq!(exit.to_string(), "Step #1 (app) failed with exit code 1");
        assert_eq!(
            spawn.to_string(),
            "Step #1 (app) could not start 'gcc': not found"
        );
    }
}
