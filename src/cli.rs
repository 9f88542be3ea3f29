//! CLI domain: parse, route, output, and presentation only.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands, OutputFormat};
pub use presentation::{format_heads_text, format_thread_text, preview, HeadRow, ThreadEntry};
pub use route::RunContext;
