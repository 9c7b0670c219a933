//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API.

use charon_core::Action;
use clap::{Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use std::path::PathBuf;

/// Charon CLI - render entities and parse payloads through resource definitions
#[derive(Parser, Debug)]
#[command(
    name = "charon",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "CHARON_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(short, long, value_enum, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render an entity document through a resource definition
    Render(RenderArgs),

    /// Apply a payload to an entity through a resource definition
    Parse(ParseArgs),

    /// Load and validate definition documents
    Check(CheckArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Arguments shared by the commands that need a registry
#[derive(Parser, Debug, Clone)]
pub struct SchemaArgs {
    /// Definition document (YAML or JSON); repeat to load several
    #[arg(short, long = "schema", value_name = "FILE")]
    pub schemas: Vec<PathBuf>,

    /// Name of the resource definition to use
    #[arg(short, long, value_name = "NAME")]
    pub definition: String,

    /// Context parameter as KEY=JSON (plain strings need no quotes)
    #[arg(short, long = "param", value_name = "KEY=JSON")]
    pub params: Vec<String>,

    /// Relationship nesting limit before children render as links
    #[arg(long)]
    pub max_depth: Option<usize>,
}

#[derive(Parser, Debug)]
pub struct RenderArgs {
    #[command(flatten)]
    pub schema: SchemaArgs,

    /// Entity document (JSON or YAML); an array renders a collection
    #[arg(short, long, value_name = "FILE")]
    pub entity: PathBuf,

    /// Read action to render for
    #[arg(short, long, value_enum)]
    pub action: Option<ReadAction>,

    /// Relationship paths to expand, comma separated
    #[arg(long, value_delimiter = ',', value_name = "PATH")]
    pub expand: Vec<String>,

    /// Restrict output to these display-name paths, comma separated
    #[arg(long, value_delimiter = ',', value_name = "PATH")]
    pub fields: Vec<String>,

    /// Add the item count to collection meta
    #[arg(long)]
    pub count: bool,
}

#[derive(Parser, Debug)]
pub struct ParseArgs {
    #[command(flatten)]
    pub schema: SchemaArgs,

    /// Payload document (JSON or YAML)
    #[arg(short = 'P', long, value_name = "FILE")]
    pub payload: PathBuf,

    /// Write action the payload is applied for
    #[arg(short, long, value_enum)]
    pub action: Option<WriteAction>,

    /// Entity document the payload is applied to
    #[arg(long, value_name = "FILE")]
    pub existing: Option<PathBuf>,

    /// Entities that payload identifiers may link to, as {"Definition": [entity, ...]}
    #[arg(long, value_name = "FILE")]
    pub known: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Definition documents to check together
    #[arg(value_name = "FILE", required = true, num_args = 1..)]
    pub files: Vec<PathBuf>,

    /// List every field of every definition
    #[arg(long)]
    pub fields: bool,
}

#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// Pretty-printed JSON output
    JsonPretty,
    /// YAML output
    Yaml,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReadAction {
    Index,
    View,
    Identifier,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum WriteAction {
    Create,
    Edit,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl From<ReadAction> for Action {
    fn from(action: ReadAction) -> Self {
        match action {
            ReadAction::Index => Action::Index,
            ReadAction::View => Action::View,
            ReadAction::Identifier => Action::Identifier,
        }
    }
}

impl From<WriteAction> for Action {
    fn from(action: WriteAction) -> Self {
        match action {
            WriteAction::Create => Action::Create,
            WriteAction::Edit => Action::Edit,
        }
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}
