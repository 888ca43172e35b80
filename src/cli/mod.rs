pub mod parser;

use crate::commands::{CommandExecutor, CompileOptions, StaleOptions};
use crate::result::Result;
use clap::Parser;

#[derive(Parser)]
#[command(name = "stepbuild")]
#[command(about = "Build steps declared in code, rebuilt when their inputs change")]
#[command(version = "0.1.0")]
#[command(arg_required_else_help = true)]
#[command(
    help_template = "{before-help}{name} v{version}\n\n{about-with-newline}\n{usage-heading} {usage}\n\n{all-args}{after-help}"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
pub enum Commands {
    #[command(about = "Compile inputs into one output when it is stale")]
    Compile {
        #[arg(long, default_value = "cc", help = "Compiler program")]
        cc: String,

        #[arg(short, long, help = "Output file")]
        output: String,

        #[arg(required = true, help = "Source files passed to the compiler")]
        inputs: Vec<String>,

        #[arg(
            long = "flag",
            allow_hyphen_values = true,
            help = "Extra compiler argument (repeatable)"
        )]
        flags: Vec<String>,

        #[arg(long, help = "Scan sources for #include \"...\" dependencies")]
        scan: bool,

        #[arg(long, help = "Print commands without running them")]
        dry_run: bool,

        #[arg(long, help = "Continue independent steps after a failure")]
        keep_going: bool,

        #[arg(short, long, help = "Engine configuration file")]
        config: Option<String>,

        #[arg(short, long, help = "Explain why each step runs")]
        verbose: bool,

        #[arg(long, help = "Print the build summary as JSON")]
        json: bool,
    },

    #[command(about = "Report whether an output is stale and why")]
    Stale {
        #[arg(short, long, help = "Output file")]
        output: String,

        #[arg(help = "Source files the output is built from")]
        inputs: Vec<String>,

        #[arg(long, help = "Scan sources for #include \"...\" dependencies")]
        scan: bool,

        #[arg(short, long, help = "Engine configuration file")]
        config: Option<String>,
    },
}

impl Default for Cli {
    fn default() -> Self {
        Self::parse()
    }
}

impl Cli {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn execute(self) -> Result<()> {
        let mut executor = CommandExecutor::new();

        match self.command {
            Commands::Compile {
                cc,
                output,
                inputs,
                flags,
                scan,
                dry_run,
                keep_going,
                config,
                verbose,
                json,
            } => {
                executor
                    .compile(CompileOptions {
                        cc: cc.into(),
                        output: output.into(),
                        inputs: inputs.into_iter().map(Into::into).collect(),
                        flags,
                        scan,
                        dry_run,
                        keep_going,
                        config,
                        verbose,
                        json,
                    })
                    .await
            }
            Commands::Stale {
                output,
                inputs,
                scan,
                config,
            } => {
                executor
                    .stale(StaleOptions {
                        output: output.into(),
                        inputs: inputs.into_iter().map(Into::into).collect(),
                        scan,
                        config,
                    })
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_accepts_hyphenated_flags() {
        let cli = Cli::try_parse_from([
            "stepbuild", "compile", "-o", "app", "main.c", "--flag", "-Wall", "--flag", "-O2",
            "--scan",
        ])
        .unwrap();

        match cli.command {
            Commands::Compile {
                cc,
                output,
                inputs,
                flags,
                scan,
                ..
            } => {
                assert_eq!(cc, "cc");
                assert_eq!(output, "app");
                assert_eq!(inputs, ["main.c"]);
                assert_eq!(flags, ["-Wall", "-O2"]);
                assert!(scan);
            }
            _ => panic!("expected compile"),
        }
    }

    #[test]
    fn compile_requires_an_input() {
        assert!(Cli::try_parse_from(["stepbuild", "compile", "-o", "app"]).is_err());
    }
}
