use super::{declare_compile_step, load_engine_config};
use crate::build::{ConsoleReporter, Engine, FailurePolicy};
use crate::graph::StepGraph;
use crate::result::Result;
use crate::scanner::scan_auto_dependencies;
use crate::step::FsTimestamps;
use crate::utils::process::ProcessRunner;
use camino::Utf8PathBuf;
use indicatif::{ProgressBar, ProgressStyle};
use smol_str::SmolStr;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub cc: SmolStr,
    pub output: Utf8PathBuf,
    pub inputs: Vec<Utf8PathBuf>,
    pub flags: Vec<String>,
    pub scan: bool,
    pub dry_run: bool,
    pub keep_going: bool,
    pub config: Option<String>,
    pub verbose: bool,
    pub json: bool,
}

pub async fn execute(options: CompileOptions) -> Result<()> {
    let mut config = load_engine_config(options.config.as_deref()).await?;
    if options.dry_run {
        config.dry_run = true;
    }
    if options.keep_going {
        config.failure_policy = FailurePolicy::KeepGoing;
    }

    let mut graph = StepGraph::new();
    let id = declare_compile_step(
        &mut graph,
        &options.cc,
        &options.output,
        &options.inputs,
        &options.flags,
    )?;

    if options.scan {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message("Scanning sources for includes...");
        spinner.enable_steady_tick(Duration::from_millis(100));

        let added = scan_auto_dependencies(&mut graph, id, &config.directive).await;
        spinner.finish_and_clear();

        let added = added?;
        if options.verbose {
            for path in &added {
                println!("  depends on {}", path);
            }
        }
    }

    if !config.dry_run {
        if let Some(dir) = options.output.parent().filter(|d| !d.as_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }
    }

    log::info!(
        "Compiling {} from {} input(s)",
        options.output,
        options.inputs.len()
    );

    let start = Instant::now();
    let mut engine = Engine::with_parts(
        ProcessRunner::new(),
        FsTimestamps,
        ConsoleReporter::new(options.verbose),
    )
    .with_config(&config);

    let summary = engine.build(&graph, id).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else if !summary.ran(id) {
        println!("{} is up to date", options.output);
    } else if !summary.dry_run {
        let time_str = format_duration(start.elapsed());
        println!("Build successful: {} ({})", options.output, time_str);
        log::info!(
            "Build completed successfully: {} in {}",
            options.output,
            time_str
        );
    }

    Ok(())
}

fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms >= 1000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        format!("{}ms", total_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_short_and_long_durations() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
    }
}
