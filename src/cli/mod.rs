//! Command-Line Interface

pub mod commands;
pub mod util;

pub use util::{build_controller, flow_db_path, open_repository};
