//! Shared fixtures for engine tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::io;
use stepbuild::build::{Engine, RecordingReporter};
use stepbuild::step::MemoryTimestamps;
use stepbuild::utils::process::{CommandRunner, Invocation, RunStatus};

/// Records invocations and touches each output in a shared timestamp table.
#[derive(Debug, Default)]
pub struct FakeRunner {
    pub timestamps: MemoryTimestamps,
    pub invocations: Vec<Invocation>,
    /// Programs that exit with code 1 without producing output.
    pub failing: HashSet<String>,
    /// Programs that cannot be started.
    pub missing: HashSet<String>,
}

impl FakeRunner {
    pub fn new(timestamps: MemoryTimestamps) -> Self {
        Self {
            timestamps,
            ..Self::default()
        }
    }

    pub fn outputs(&self) -> Vec<String> {
        self.invocations
            .iter()
            .map(|i| i.output.to_string())
            .collect()
    }
}

impl CommandRunner for FakeRunner {
    async fn run(&mut self, invocation: &Invocation) -> io::Result<RunStatus> {
        if self.missing.contains(invocation.program.as_str()) {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no such program"));
        }

        self.invocations.push(invocation.clone());

        if self.failing.contains(invocation.program.as_str()) {
            return Ok(RunStatus::failed(Some(1)));
        }

        self.timestamps.touch(invocation.output.clone());
        Ok(RunStatus::SUCCESS)
    }
}

pub type TestEngine = Engine<FakeRunner, MemoryTimestamps, RecordingReporter>;

pub fn engine(timestamps: &MemoryTimestamps) -> TestEngine {
    Engine::with_parts(
        FakeRunner::new(timestamps.clone()),
        timestamps.clone(),
        RecordingReporter::new(),
    )
}
