use crate::build::BuildFailure;
use crate::graph::StepId;
use camino::Utf8PathBuf;
use std::borrow::Cow;
use thiserror::Error;

/** Main Result type alias for stepbuild operations
 *
 * # Usage
 * ```no_run
 * use stepbuild::graph::StepGraph;
 * use stepbuild::result::Result;
 *
 * fn declare(graph: &mut StepGraph) -> Result<()> {
 *     let id = graph.add_step("cc", "build/app")?;
 *     graph.step_mut(id)?.add_input("main.c");
 *     Ok(())
 * }
 * ```
 */
pub type Result<T> = std::result::Result<T, StepError>;

/** Error enumeration for graph construction, scanning and execution
 *
 * # Error Categories
 * - **Construction**: `EmptyCommand`, `EmptyOutput`, `DuplicateOutput`,
 *   `UnknownStep`, `SelfDependency`. Returned at the call site that caused them.
 * - **Traversal**: `Cycle`, detected before any command runs.
 * - **Execution**: `Build` (first failure under abort-on-first) and
 *   `Incomplete` (every failure under keep-going).
 * - **Resources**: `Scan`, `Io`, `Config`, `TomlParse`, `JsonError`.
 *
 * Malformed include directives are never errors; the scanner skips them.
 */
#[derive(Error, Debug)]
pub enum StepError {
    #[error("Step command cannot be empty")]
    EmptyCommand,

    #[error("Step output cannot be empty")]
    EmptyOutput,

    #[error("Output '{output}' is already produced by step {existing}")]
    DuplicateOutput {
        output: Utf8PathBuf,
        existing: StepId,
    },

    #[error("Unknown step: {0}")]
    UnknownStep(StepId),

    #[error("Step {0} cannot depend on itself")]
    SelfDependency(StepId),

    #[error("Dependency cycle: {}", format_cycle(.steps))]
    Cycle { steps: Vec<Utf8PathBuf> },

    #[error("{0}")]
    Build(Box<BuildFailure>),

    #[error("Build incomplete: {} step(s) failed", .failures.len())]
    Incomplete { failures: Vec<BuildFailure> },

    #[error("Failed to scan '{path}': {source}")]
    Scan {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(Cow<'static, str>),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

fn format_cycle(steps: &[Utf8PathBuf]) -> String {
    steps
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl StepError {
    /** Creates a Config error with flexible message input
     *
     * # Use Cases
     * - Invalid configuration formats
     * - Directive syntax that cannot be scanned
     */
    pub fn config(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Config(msg.into())
    }

    /// Failures carried by this error, empty for non-execution errors.
    pub fn failures(&self) -> &[BuildFailure] {
        match self {
            Self::Build(failure) => std::slice::from_ref(failure.as_ref()),
            Self::Incomplete { failures } => failures,
            _ => &[],
        }
    }
}

impl From<BuildFailure> for StepError {
    fn from(failure: BuildFailure) -> Self {
        Self::Build(Box::new(failure))
    }
}
