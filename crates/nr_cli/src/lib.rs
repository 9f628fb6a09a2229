pub mod cli;
pub mod logging;
pub mod repl;

pub use cli::{Cli, Commands, HumanDuration};
pub use logging::init_logging;
pub use repl::{run_query_loop, PROMPT};
