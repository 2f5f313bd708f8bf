mod args;

use clap::Parser;
use tracing::error;

use nyx_config::{standard_defaults, Configuration};
use nyx_engine::{Nyx, State};

use crate::args::{Cli, PipelineCommand};

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbosity.as_deref());

    if let Err(err) = run(&cli) {
        error!("{err}");
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            error!("caused by: {cause}");
            source = cause.source();
        }
        std::process::exit(err.exit_code());
    }
}

fn run(cli: &Cli) -> nyx_engine::Result<()> {
    let configuration = Configuration::new(standard_defaults())?
        .with_command_line_layer(Some(cli.to_configuration_layer()))?;
    let mut nyx = Nyx::new(configuration)?;

    match cli.command {
        PipelineCommand::Clean => {
            nyx.clean()?;
            println!("Cleaned.");
        }
        PipelineCommand::Arrange => {
            nyx.arrange()?;
        }
        PipelineCommand::Infer => {
            let state = nyx.infer()?;
            print_outcome(state);
        }
        PipelineCommand::Make => {
            let state = nyx.make()?;
            print_outcome(state);
        }
        PipelineCommand::Mark => {
            let state = nyx.mark()?;
            print_outcome(state);
        }
        PipelineCommand::Publish => {
            let state = nyx.publish()?;
            print_outcome(state);
        }
    }

    Ok(())
}

fn print_outcome(state: &State) {
    match (&state.version, &state.release_scope.previous_version) {
        (Some(version), Some(previous)) if state.new_version => {
            println!("{previous} -> {version}");
        }
        (Some(version), _) if state.new_version => {
            println!("{version}");
        }
        (Some(version), _) => {
            println!("{version} (no new version)");
        }
        _ => {}
    }
    if let Some(bump) = &state.bump {
        println!("bump: {bump}");
    }
    if !state.release_scope.commits.is_empty() {
        println!("commits in scope: {}", state.release_scope.commits.len());
    }
}

fn init_tracing(verbosity: Option<&str>) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(verbosity.unwrap_or("warn")))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
