//! Arena owning every step of a build description.

use crate::result::{Result, StepError};
use crate::step::Step;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use smol_str::SmolStr;
use std::collections::HashMap;
use std::fmt;

/// Stable handle to a step inside one [`StepGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct StepId(usize);

impl StepId {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/** Owns steps and hands out [`StepId`] handles
 *
 * # Construction Checks
 * - Command and output must be non-empty
 * - An output path may be produced by one step only
 * - Dependencies must refer to steps of this graph and not to the step itself
 *
 * Cycles through longer paths are accepted here and reported by the engine
 * when it plans a build.
 */
#[derive(Debug, Default)]
pub struct StepGraph {
    steps: Vec<Step>,
    outputs: HashMap<Utf8PathBuf, StepId>,
}

impl StepGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_step(
        &mut self,
        command: impl Into<SmolStr>,
        output: impl Into<Utf8PathBuf>,
    ) -> Result<StepId> {
        let step = Step::new(command.into(), output.into())?;

        if let Some(&existing) = self.outputs.get(step.output()) {
            return Err(StepError::DuplicateOutput {
                output: step.output().to_owned(),
                existing,
            });
        }

        let id = StepId(self.steps.len());
        self.outputs.insert(step.output().to_owned(), id);
        self.steps.push(step);

        log::debug!("Declared step {} -> {}", id, self.steps[id.0].output());
        Ok(id)
    }

    /// Makes `parent` build `dependency` first.
    pub fn add_dependency(&mut self, parent: StepId, dependency: StepId) -> Result<()> {
        self.step(dependency)?;

        if parent == dependency {
            return Err(StepError::SelfDependency(parent));
        }

        self.step_mut(parent)?.push_dependency(dependency);
        Ok(())
    }

    pub fn step(&self, id: StepId) -> Result<&Step> {
        self.steps.get(id.0).ok_or(StepError::UnknownStep(id))
    }

    pub fn step_mut(&mut self, id: StepId) -> Result<&mut Step> {
        self.steps.get_mut(id.0).ok_or(StepError::UnknownStep(id))
    }

    pub fn find_by_output(&self, output: &Utf8Path) -> Option<StepId> {
        self.outputs.get(output).copied()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StepId, &Step)> {
        self.steps
            .iter()
            .enumerate()
            .map(|(index, step)| (StepId(index), step))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_step_hands_out_sequential_ids() {
        let mut graph = StepGraph::new();
        let a = graph.add_step("cc", "a.o").unwrap();
        let b = graph.add_step("cc", "b.o").unwrap();

        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.find_by_output(Utf8Path::new("b.o")), Some(b));
    }

    #[test]
    fn duplicate_output_is_rejected() {
        let mut graph = StepGraph::new();
        let first = graph.add_step("cc", "app").unwrap();

        match graph.add_step("ld", "app") {
            Err(StepError::DuplicateOutput { output, existing }) => {
                assert_eq!(output, "app");
                assert_eq!(existing, first);
            }
            other => panic!("expected duplicate output, got {:?}", other),
        }
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn dependencies_are_validated_at_the_call_site() {
        let mut graph = StepGraph::new();
        let a = graph.add_step("cc", "a").unwrap();
        let foreign = StepId::new(42);

        assert!(matches!(
            graph.add_dependency(a, foreign),
            Err(StepError::UnknownStep(id)) if id == foreign
        ));
        assert!(matches!(
            graph.add_dependency(foreign, a),
            Err(StepError::UnknownStep(id)) if id == foreign
        ));
        assert!(matches!(
            graph.add_dependency(a, a),
            Err(StepError::SelfDependency(_))
        ));
        assert!(graph.step(a).unwrap().dependencies().is_empty());
    }

    #[test]
    fn shared_dependency_is_recorded_on_each_parent() {
        let mut graph = StepGraph::new();
        let lib = graph.add_step("ar", "lib.a").unwrap();
        let app = graph.add_step("cc", "app").unwrap();
        let test = graph.add_step("cc", "test").unwrap();

        graph.add_dependency(app, lib).unwrap();
        graph.add_dependency(test, lib).unwrap();

        assert_eq!(*graph.step(app).unwrap().dependencies().get(0), lib);
        assert_eq!(*graph.step(test).unwrap().dependencies().get(0), lib);
    }
}
