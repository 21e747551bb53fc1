//! Engine module: traversal, name filter, path tools and the CLI front end.

pub mod arg_parser;
pub mod cli;
pub mod filter;
pub mod tools;
pub mod walk;

// Re-export commonly used functions
pub use arg_parser::Cli;
pub use cli::handle_run;
pub use filter::{NameFilter, base_name};
pub use tools::{expand_home, expand_home_with, resolve_root};
pub use walk::{WalkTotals, Walker};
