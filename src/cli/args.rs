use crate::io::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "classmap")]
#[command(about = "Structural class models of Python packages", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build class and function models for a Python package
    Model {
        /// Python file or directory to load
        path: PathBuf,

        /// Only model definitions under this dotted package (defaults to everything loaded)
        #[arg(short, long)]
        package: Option<String>,

        /// Output format (defaults to the configured format, then text)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Methods starting with this prefix are left out
        #[arg(long = "internal-prefix")]
        internal_prefix: Option<String>,

        /// Upper bound on chained import and alias resolution
        #[arg(long = "max-depth")]
        max_depth: Option<usize>,

        /// Additional glob patterns of files to skip
        #[arg(long, value_delimiter = ',')]
        exclude: Vec<String>,

        /// Disable colored text output
        #[arg(long = "no-color")]
        no_color: bool,

        /// Increase verbosity level (can be repeated: -v, -vv)
        /// -v: Debug logging
        /// -vv: Trace logging
        #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
        verbosity: u8,
    },

    /// Initialize a .classmap.toml configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(short, long)]
        force: bool,
    },
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_model_arguments() {
        let cli = Cli::try_parse_from([
            "classmap",
            "model",
            "src",
            "--package",
            "shop",
            "--format",
            "json",
            "--exclude",
            "a/**,b/**",
            "-vv",
        ])
        .unwrap();
        match cli.command {
            Commands::Model {
                path,
                package,
                format,
                exclude,
                verbosity,
                ..
            } => {
                assert_eq!(path, PathBuf::from("src"));
                assert_eq!(package.as_deref(), Some("shop"));
                assert_eq!(format, Some(OutputFormat::Json));
                assert_eq!(exclude, vec!["a/**", "b/**"]);
                assert_eq!(verbosity, 2);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
