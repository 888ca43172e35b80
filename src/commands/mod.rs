pub mod compile;
pub mod stale;

pub use compile::CompileOptions;
pub use stale::StaleOptions;

use crate::build::{EngineConfig, CONFIG_FILE};
use crate::cli::parser::CliParser;
use crate::graph::{StepGraph, StepId};
use crate::result::Result;
use crate::step::{T_IN, T_OUT};
use camino::{Utf8Path, Utf8PathBuf};
use std::path::Path;

#[derive(Debug)]
pub enum CommandType {
    Compile(CompileOptions),
    Stale(StaleOptions),
}

impl CommandType {
    pub async fn execute(self) -> Result<()> {
        match self {
            CommandType::Compile(options) => compile::execute(options).await,
            CommandType::Stale(options) => stale::execute(options).await,
        }
    }
}

#[derive(Default)]
pub struct CommandExecutor;

impl CommandExecutor {
    pub fn new() -> Self {
        Self
    }

    pub async fn compile(&mut self, options: CompileOptions) -> Result<()> {
        CommandType::Compile(options).execute().await
    }

    pub async fn stale(&mut self, options: StaleOptions) -> Result<()> {
        CommandType::Stale(options).execute().await
    }
}

/// Explicit `--config` file, else `stepbuild.toml` in the working directory, else defaults.
pub async fn load_engine_config(config_path: Option<&str>) -> Result<EngineConfig> {
    if let Some(path) = config_path {
        let path = CliParser::validate_config_path(path)?;
        log::info!("Loading engine config from {}", path.display());
        return EngineConfig::from_file(&path).await;
    }

    if Path::new(CONFIG_FILE).is_file() {
        log::info!("Loading engine config from {}", CONFIG_FILE);
        return EngineConfig::from_file(CONFIG_FILE).await;
    }

    Ok(EngineConfig::default())
}

/// Declares `<cc> <inputs...> -o <output> <flags...>` as one step.
pub fn declare_compile_step(
    graph: &mut StepGraph,
    cc: &str,
    output: &Utf8Path,
    inputs: &[Utf8PathBuf],
    flags: &[String],
) -> Result<StepId> {
    let id = graph.add_step(cc, output.to_owned())?;
    let step = graph.step_mut(id)?;

    step.add_argument(T_IN).add_argument(format!("-o {}", T_OUT));
    for flag in flags {
        step.add_argument(flag.clone());
    }
    for input in inputs {
        step.add_input(input.clone());
    }

    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::command_line;

    #[test]
    fn compile_step_places_inputs_output_then_flags() {
        let mut graph = StepGraph::new();
        let inputs = vec![Utf8PathBuf::from("main.c"), Utf8PathBuf::from("util.c")];
        let flags = vec!["-Wall -Wextra".to_string(), "-std=c99".to_string()];
        let id = declare_compile_step(
            &mut graph,
            "gcc",
            &Utf8PathBuf::from("build/app"),
            &inputs,
            &flags,
        )
        .unwrap();

        assert_eq!(
            command_line(graph.step(id).unwrap()),
            ["gcc", "main.c", "util.c", "-o", "build/app", "-Wall", "-Wextra", "-std=c99"]
        );
    }

    #[tokio::test]
    async fn explicit_config_path_must_exist() {
        assert!(load_engine_config(Some("/definitely/not/here.toml"))
            .await
            .is_err());
    }
}
