use super::engine::BuildFailure;
use crate::graph::StepId;
use crate::step::{Staleness, Step};

/// Receives build progress. Only `command` is required.
pub trait Reporter {
    /// Called with the full argument vector, command first, before a step runs.
    fn command(&mut self, id: StepId, step: &Step, argv: &[String]);

    fn up_to_date(&mut self, _id: StepId, _step: &Step) {}

    fn stale(&mut self, _id: StepId, _step: &Step, _reason: &Staleness) {}

    fn skipped(&mut self, _id: StepId, _step: &Step) {}

    fn failed(&mut self, _failure: &BuildFailure) {}
}

/** Prints command lines to stdout and failures to stderr
 *
 * With `verbose`, also prints why each step runs and which steps were
 * already up to date.
 */
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    verbose: bool,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Reporter for ConsoleReporter {
    fn command(&mut self, _id: StepId, _step: &Step, argv: &[String]) {
        println!("{}", argv.join(" "));
    }

    fn up_to_date(&mut self, _id: StepId, step: &Step) {
        if self.verbose {
            println!("{} is up to date", step.output());
        }
    }

    fn stale(&mut self, _id: StepId, step: &Step, reason: &Staleness) {
        if self.verbose {
            println!("{}: {}", step.output(), reason);
        }
    }

    fn skipped(&mut self, _id: StepId, step: &Step) {
        eprintln!("Skipped {}: a dependency failed", step.output());
    }

    fn failed(&mut self, failure: &BuildFailure) {
        eprintln!("{}", failure);
    }
}

/// Keeps every reported command line in memory.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub commands: Vec<Vec<String>>,
    pub up_to_date: Vec<StepId>,
    pub skipped: Vec<StepId>,
    pub failed: Vec<StepId>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reporter for RecordingReporter {
    fn command(&mut self, _id: StepId, _step: &Step, argv: &[String]) {
        self.commands.push(argv.to_vec());
    }

    fn up_to_date(&mut self, id: StepId, _step: &Step) {
        self.up_to_date.push(id);
    }

    fn skipped(&mut self, id: StepId, _step: &Step) {
        self.skipped.push(id);
    }

    fn failed(&mut self, failure: &BuildFailure) {
        self.failed.push(failure.step);
    }
}
