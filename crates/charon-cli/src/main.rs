//! Charon CLI - render entities and parse payloads through resource definitions
//!
//! The entry point loads configuration, sets up logging and dispatches to the
//! subcommand handlers. Failures print to stderr and map to distinct exit codes.

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands};
use colored::control;
use config::Config;
use error::Result;
use logging::{timing::Timer, LoggingConfig};
use output::OutputWriter;
use std::process;

fn main() {
    let cli = Cli::parse_args();

    control::set_override(cli.use_color());

    let result = Config::load_with_file(cli.config.as_deref()).and_then(|config| {
        if let Err(e) = init_logging(&cli, &config) {
            eprintln!("Failed to initialize logging: {}", e);
        }
        run(cli, config)
    });

    match result {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!("{}", error::format_error(&e, control::SHOULD_COLORIZE.should_colorize()));

            if e.should_show_help() {
                eprintln!("\nFor more information, try '--help'");
            }

            process::exit(e.exit_code());
        }
    }
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Render(_) => "render",
        Commands::Parse(_) => "parse",
        Commands::Check(_) => "check",
        Commands::Completions(_) => "completions",
    }
}

/// Main application logic
fn run(cli: Cli, config: Config) -> Result<()> {
    let span = logging::command_span(command_name(&cli.command));
    let _entered = span.enter();
    let _timer = Timer::new(command_name(&cli.command), span.clone());

    let use_color = cli.use_color() && config.output.color;
    let mut output = OutputWriter::new(cli.output, use_color, cli.quiet, config.output.pretty);

    tracing::info!(verbosity = cli.verbosity_level(), "executing command");

    match cli.command {
        Commands::Render(args) => handlers::handle_render(args, &config, &mut output),
        Commands::Parse(args) => handlers::handle_parse(args, &config, &mut output),
        Commands::Check(args) => handlers::handle_check(args, &mut output),
        Commands::Completions(args) => handlers::handle_completions(args),
    }
}

/// Initialize the logging system
fn init_logging(cli: &Cli, config: &Config) -> Result<()> {
    let mut logging_config = LoggingConfig::from_verbosity(cli.verbosity_level());
    logging_config.apply_settings(&config.logging, cli.verbosity_level());
    logging_config.merge_with_env();

    if cli.quiet {
        logging_config.level = "error".to_string();
        logging_config.console = false;
    }

    logging::init_logging(logging_config)
}
