use super::Step;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::UNIX_EPOCH;

/// Modification time in nanoseconds since the Unix epoch. Times at or before the epoch clamp to [`Timestamp::ZERO`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);

    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }
}

/// Source of modification times consulted by the staleness check.
#[allow(async_fn_in_trait)]
pub trait Timestamps {
    /// `None` when `path` does not exist.
    async fn modified(&self, path: &Utf8Path) -> Option<Timestamp>;
}

/// Reads modification times from filesystem metadata.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsTimestamps;

impl Timestamps for FsTimestamps {
    async fn modified(&self, path: &Utf8Path) -> Option<Timestamp> {
        let modified = tokio::fs::metadata(path)
            .await
            .and_then(|m| m.modified())
            .ok()?;

        let timestamp = modified
            .duration_since(UNIX_EPOCH)
            .map(|d| Timestamp(u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)))
            .unwrap_or(Timestamp::ZERO);
        Some(timestamp)
    }
}

/** In-memory timestamp table
 *
 * # Notes
 * - Clones share one table, so a runner and the engine can observe the same files
 * - `touch` advances an internal clock, so every touched path is strictly
 *   newer than everything touched before it
 */
#[derive(Debug, Default, Clone)]
pub struct MemoryTimestamps {
    inner: Rc<RefCell<MemoryTable>>,
}

#[derive(Debug, Default)]
struct MemoryTable {
    clock: u64,
    files: HashMap<Utf8PathBuf, Timestamp>,
}

impl MemoryTimestamps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, path: impl Into<Utf8PathBuf>, timestamp: Timestamp) {
        let mut table = self.inner.borrow_mut();
        table.clock = table.clock.max(timestamp.0);
        table.files.insert(path.into(), timestamp);
    }

    /// Marks `path` as modified now and returns the new timestamp.
    pub fn touch(&self, path: impl Into<Utf8PathBuf>) -> Timestamp {
        let mut table = self.inner.borrow_mut();
        table.clock += 1;
        let now = Timestamp(table.clock);
        table.files.insert(path.into(), now);
        now
    }

    pub fn remove(&self, path: &Utf8Path) {
        self.inner.borrow_mut().files.remove(path);
    }

    pub fn get(&self, path: &Utf8Path) -> Option<Timestamp> {
        self.inner.borrow().files.get(path).copied()
    }
}

impl Timestamps for MemoryTimestamps {
    async fn modified(&self, path: &Utf8Path) -> Option<Timestamp> {
        self.get(path)
    }
}

/// Why a step does or does not need to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "path", rename_all = "kebab-case")]
pub enum Staleness {
    MissingOutput,
    NewerInput(Utf8PathBuf),
    UpToDate,
}

impl Staleness {
    pub fn is_stale(&self) -> bool {
        !matches!(self, Staleness::UpToDate)
    }
}

impl std::fmt::Display for Staleness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Staleness::MissingOutput => write!(f, "output is missing"),
            Staleness::NewerInput(path) => write!(f, "'{}' is newer than the output", path),
            Staleness::UpToDate => write!(f, "up to date"),
        }
    }
}

/** Decides whether `step` must run
 *
 * # Rules
 * - A missing output is stale whatever the inputs are
 * - Otherwise the step is stale when any input, command-line or
 *   dependency-only, is strictly newer than the output
 * - Missing inputs count as the oldest possible time
 *
 * Dependencies in the step graph are not consulted. A step that must rerun
 * when a dependency rebuilds has to declare that dependency's output as one
 * of its inputs.
 */
pub async fn staleness<T: Timestamps>(step: &Step, timestamps: &T) -> Staleness {
    let Some(output_ts) = timestamps.modified(step.output()).await else {
        return Staleness::MissingOutput;
    };

    for input in step.inputs() {
        let input_ts = timestamps
            .modified(&input.path)
            .await
            .unwrap_or(Timestamp::ZERO);
        if input_ts > output_ts {
            return Staleness::NewerInput(input.path.clone());
        }
    }

    Staleness::UpToDate
}

pub async fn is_stale<T: Timestamps>(step: &Step, timestamps: &T) -> bool {
    staleness(step, timestamps).await.is_stale()
}
