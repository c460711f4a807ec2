use anyhow::Result;
use classmap::cli::{self, Commands};
use classmap::commands::{self, ModelCommandConfig};
use classmap::config;

fn main() -> Result<()> {
    let cli = cli::parse_args();

    match cli.command {
        Commands::Model {
            path,
            package,
            format,
            output,
            internal_prefix,
            max_depth,
            exclude,
            no_color,
            verbosity,
        } => {
            cli::init_logging(verbosity);
            cli::configure_thread_pool();

            let model_config = ModelCommandConfig {
                path,
                package,
                format,
                output,
                internal_prefix,
                max_depth,
                exclude,
                color: !no_color,
            };
            commands::handle_model(model_config, &config::load_config())
        }
        Commands::Init { force } => commands::init_config(force),
    }
}
