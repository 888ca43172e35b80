pub mod stale;
pub mod template;

pub use stale::*;
pub use template::*;

use crate::container::StepList;
use crate::graph::StepId;
use crate::result::{Result, StepError};
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use smol_str::SmolStr;

/// Input-list token. Expands to every command-line input, one element each.
pub const IN_TOKEN: char = '\u{1}';
/// Output token. Expands to the step's output path.
pub const OUT_TOKEN: char = '\u{2}';

/// [`IN_TOKEN`] as a string, for building templates with `concat!` or `format!`.
pub const T_IN: &str = "\u{1}";
/// [`OUT_TOKEN`] as a string.
pub const T_OUT: &str = "\u{2}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    pub path: Utf8PathBuf,
    /// `false` for dependency-only inputs: checked for staleness, never passed to the tool.
    pub on_command_line: bool,
}

/** One buildable unit: a command producing a single output
 *
 * # Lists
 * - `arguments`: templates expanded in declaration order at build time
 * - `inputs`: files whose modification time can invalidate `output`
 * - `dependencies`: steps that must be built before this one
 *
 * All three lists are append-only. `command` and `output` are fixed at creation.
 * Steps are created through [`crate::graph::StepGraph::add_step`], which owns them.
 */
#[derive(Debug, Clone)]
pub struct Step {
    command: SmolStr,
    output: Utf8PathBuf,
    arguments: StepList<String>,
    inputs: StepList<Input>,
    dependencies: StepList<StepId>,
}

impl Step {
    pub(crate) fn new(command: SmolStr, output: Utf8PathBuf) -> Result<Self> {
        if command.trim().is_empty() {
            return Err(StepError::EmptyCommand);
        }

        if output.as_str().is_empty() {
            return Err(StepError::EmptyOutput);
        }

        Ok(Self {
            command,
            output,
            arguments: StepList::new(),
            inputs: StepList::new(),
            dependencies: StepList::new(),
        })
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn output(&self) -> &Utf8Path {
        &self.output
    }

    pub fn arguments(&self) -> &StepList<String> {
        &self.arguments
    }

    pub fn inputs(&self) -> &StepList<Input> {
        &self.inputs
    }

    pub fn dependencies(&self) -> &StepList<StepId> {
        &self.dependencies
    }

    /// Appends an argument template. Call order is command-line order.
    pub fn add_argument(&mut self, template: impl Into<String>) -> &mut Self {
        self.arguments.push(template.into());
        self
    }

    /// Appends an input that is both checked for staleness and passed via [`T_IN`].
    pub fn add_input(&mut self, path: impl Into<Utf8PathBuf>) -> &mut Self {
        self.inputs.push(Input {
            path: path.into(),
            on_command_line: true,
        });
        self
    }

    /// Appends a dependency-only input, such as an included header.
    pub fn add_dependency_path(&mut self, path: impl Into<Utf8PathBuf>) -> &mut Self {
        self.inputs.push(Input {
            path: path.into(),
            on_command_line: false,
        });
        self
    }

    pub(crate) fn push_dependency(&mut self, dependency: StepId) {
        self.dependencies.push(dependency);
    }

    /// Inputs substituted for [`T_IN`], in declaration order.
    pub fn command_line_inputs(&self) -> impl Iterator<Item = &Utf8Path> {
        self.inputs
            .iter()
            .filter(|input| input.on_command_line)
            .map(|input| input.path.as_path())
    }

    /// Whether `path` is already declared, ignoring `.` components such as a leading `./`.
    pub fn has_input(&self, path: &Utf8Path) -> bool {
        let path = normalize_path(path);
        self.inputs
            .iter()
            .any(|input| normalize_path(&input.path) == path)
    }
}

/// Drops `.` components, so `./src/util.h` becomes `src/util.h`.
pub fn normalize_path(path: &Utf8Path) -> Utf8PathBuf {
    let normalized: Utf8PathBuf = path
        .components()
        .filter(|component| !matches!(component, Utf8Component::CurDir))
        .collect();

    if normalized.as_str().is_empty() {
        Utf8PathBuf::from(".")
    } else {
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(command: &str, output: &str) -> Step {
        Step::new(command.into(), output.into()).unwrap()
    }

    #[test]
    fn rejects_empty_output_and_command() {
        assert!(matches!(
            Step::new("cc".into(), "".into()),
            Err(StepError::EmptyOutput)
        ));
        assert!(matches!(
            Step::new("  ".into(), "a.o".into()),
            Err(StepError::EmptyCommand)
        ));
    }

    #[test]
    fn command_line_inputs_skip_dependency_only_entries() {
        let mut s = step("cc", "app");
        s.add_input("main.c")
            .add_dependency_path("util.h")
            .add_input("util.c");

        let inputs: Vec<&str> = s.command_line_inputs().map(|p| p.as_str()).collect();
        assert_eq!(inputs, ["main.c", "util.c"]);
        assert_eq!(s.inputs().len(), 3);
        assert!(s.has_input(Utf8Path::new("util.h")));
        assert!(!s.has_input(Utf8Path::new("other.h")));
    }

    #[test]
    fn has_input_ignores_leading_current_dir() {
        let mut s = step("cc", "app");
        s.add_input("./main.c").add_dependency_path("util.h");

        assert!(s.has_input(Utf8Path::new("./util.h")));
        assert!(s.has_input(Utf8Path::new("main.c")));
        assert_eq!(normalize_path(Utf8Path::new("./src/./util.h")), "src/util.h");
        assert_eq!(normalize_path(Utf8Path::new("./")), ".");
    }
}
