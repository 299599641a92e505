// CLI module
// Public interface for command-line interface

mod commands;
mod input;
mod render;
mod repl;

pub use commands::{format_help, format_stats, Command};
pub use input::InputHandler;
pub use render::Renderer;
pub use repl::{run_single_turn, Repl};
