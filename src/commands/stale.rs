use super::load_engine_config;
use crate::graph::StepGraph;
use crate::result::Result;
use crate::scanner::scan_auto_dependencies;
use crate::step::{staleness, FsTimestamps};
use camino::Utf8PathBuf;

#[derive(Debug, Clone)]
pub struct StaleOptions {
    pub output: Utf8PathBuf,
    pub inputs: Vec<Utf8PathBuf>,
    pub scan: bool,
    pub config: Option<String>,
}

/// Prints `<output>: <reason>` without running anything.
pub async fn execute(options: StaleOptions) -> Result<()> {
    let config = load_engine_config(options.config.as_deref()).await?;

    let mut graph = StepGraph::new();
    // The command is never run; it only has to be non-empty.
    let id = graph.add_step("stale-check", options.output.clone())?;
    for input in &options.inputs {
        graph.step_mut(id)?.add_input(input.clone());
    }

    if options.scan {
        scan_auto_dependencies(&mut graph, id, &config.directive).await?;
    }

    let verdict = staleness(graph.step(id)?, &FsTimestamps).await;
    log::info!("{}: {}", options.output, verdict);
    println!("{}: {}", options.output, verdict);

    Ok(())
}
