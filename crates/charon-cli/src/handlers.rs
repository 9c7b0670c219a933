//! Command handlers for CLI subcommands

mod check;
mod completions;
mod parse;
mod render;
mod utils;

pub use check::handle_check;
pub use completions::handle_completions;
pub use parse::handle_parse;
pub use render::handle_render;
