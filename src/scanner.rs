use crate::graph::{StepGraph, StepId};
use crate::result::{Result, StepError};
use crate::step::normalize_path;
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use tokio::fs;

/** Shape of a textual inclusion directive
 *
 * A directive is a line that starts with `marker`, immediately followed by
 * `keyword`, one separator character and a double-quoted path:
 *
 * ```text
 * #include "util.h"
 * ```
 *
 * Anything after the closing quote is ignored. There are no escape sequences.
 */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectiveSyntax {
    pub marker: char,
    pub keyword: SmolStr,
}

impl Default for DirectiveSyntax {
    fn default() -> Self {
        Self {
            marker: '#',
            keyword: SmolStr::new_static("include"),
        }
    }
}

impl DirectiveSyntax {
    pub fn validate(&self) -> Result<()> {
        if self.keyword.is_empty() {
            return Err(StepError::config("Directive keyword cannot be empty"));
        }

        if self.marker.is_whitespace() || self.marker == '"' {
            return Err(StepError::config(format!(
                "Directive marker {:?} cannot be whitespace or a quote",
                self.marker
            )));
        }

        Ok(())
    }

    /// Quoted path of `line` when the whole line prefix is a directive.
    pub fn parse_line<'a>(&self, line: &'a str) -> Option<&'a str> {
        let rest = line
            .strip_prefix(self.marker)?
            .strip_prefix(self.keyword.as_str())?;

        let mut chars = rest.chars();
        chars.next()?;

        let quoted = chars.as_str().strip_prefix('"')?;
        let end = quoted.find('"')?;
        let path = &quoted[..end];

        (!path.is_empty()).then_some(path)
    }

    /// Every directive path in `source`, in order of appearance.
    pub fn scan<'a>(&self, source: &'a str) -> Vec<&'a str> {
        source
            .lines()
            .filter_map(|line| self.parse_line(line))
            .collect()
    }
}

/** Discovers implicit dependencies of a step from its sources
 *
 * # Process
 * 1. Reads every command-line input of the step
 * 2. Collects directive paths. A path naming an existing file next to the
 *    including source resolves there; otherwise it is kept as written
 * 3. Registers each new path as a dependency-only input
 *
 * # Returns
 * Paths added by this call. Paths the step already declares are skipped.
 *
 * # Notes
 * - Purely lexical: no macro expansion, comments are not recognized
 * - Discovered files are not scanned in turn
 * - Unreadable inputs fail with `StepError::Scan`
 */
pub async fn scan_auto_dependencies(
    graph: &mut StepGraph,
    id: StepId,
    syntax: &DirectiveSyntax,
) -> Result<Vec<Utf8PathBuf>> {
    syntax.validate()?;

    let sources: Vec<Utf8PathBuf> = graph
        .step(id)?
        .command_line_inputs()
        .map(Utf8Path::to_path_buf)
        .collect();

    let mut discovered = Vec::new();
    for source in &sources {
        let bytes = fs::read(source)
            .await
            .map_err(|e| StepError::Scan {
                path: source.clone(),
                source: e,
            })?;
        let content = String::from_utf8_lossy(&bytes);

        for path in syntax.scan(&content) {
            let resolved = resolve(source, path).await;
            log::debug!("{} includes {}", source, resolved);
            discovered.push(resolved);
        }
    }

    let step = graph.step_mut(id)?;
    let mut added = Vec::new();
    for path in discovered {
        if !step.has_input(&path) {
            step.add_dependency_path(path.clone());
            added.push(path);
        }
    }

    log::info!(
        "Scanned {} source(s) of {}: {} new dependencies",
        sources.len(),
        step.output(),
        added.len()
    );

    Ok(added)
}

async fn resolve(source: &Utf8Path, included: &str) -> Utf8PathBuf {
    if let Some(dir) = source.parent().filter(|dir| !dir.as_str().is_empty()) {
        let sibling = dir.join(included);
        if fs::try_exists(&sibling).await.unwrap_or(false) {
            return normalize_path(&sibling);
        }
    }

    normalize_path(Utf8Path::new(included))
}
