/// stepbuild - build descriptions written as code
///
/// A build is a graph of steps declared from Rust: each step names a command,
/// one output, argument templates, inputs and the steps it depends on. The
/// engine walks the graph dependencies-first and reruns a step only when one
/// of its inputs is newer than its output.
///
/// Main modules:
/// - build: Engine, failure policy, reporters and engine configuration
/// - cli: Command-line interface parsing and execution
/// - commands: Implementation of the command-line subcommands
/// - container: Append-only list backing every per-step list
/// - graph: Arena of steps addressed by `StepId`
/// - result: Error handling and result types
/// - scanner: Lexical discovery of `#include "..."` dependencies
/// - step: The step type, argument templating and staleness
/// - utils: Process execution
///
/// # Example
/// ```no_run
/// use stepbuild::build::Engine;
/// use stepbuild::graph::StepGraph;
/// use stepbuild::scanner::{scan_auto_dependencies, DirectiveSyntax};
/// use stepbuild::step::{T_IN, T_OUT};
///
/// # async fn demo() -> stepbuild::result::Result<()> {
/// let mut graph = StepGraph::new();
/// let app = graph.add_step("gcc", "build/app")?;
/// graph
///     .step_mut(app)?
///     .add_argument(T_IN)
///     .add_argument(format!("-o {T_OUT}"))
///     .add_argument("-Wall -Wextra -std=c99")
///     .add_input("main.c");
/// scan_auto_dependencies(&mut graph, app, &DirectiveSyntax::default()).await?;
///
/// Engine::new().build(&graph, app).await?;
/// # Ok(())
/// # }
/// ```
pub mod build;
pub mod cli;
pub mod commands;
pub mod container;
pub mod graph;
pub mod result;
pub mod scanner;
pub mod step;
pub mod utils;
