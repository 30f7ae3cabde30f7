/*-------------------------------------------------------------------------------------------------
  Command Line Interface (CLI) Modules
-------------------------------------------------------------------------------------------------*/

mod args;
mod core;

pub mod confirm;
pub mod csv;
pub mod log;
pub mod output;
pub mod utils;

/*--------------------------------------------------------------------------------------
  CLI Module Interface
--------------------------------------------------------------------------------------*/

pub use args::Args;
pub use args::OutputFormat;
pub use self::core::{build_provider, exit_status, load_exclusion_set, EXIT_FAILURE};
