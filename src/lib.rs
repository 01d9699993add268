pub mod cli;
pub mod load_config;
pub mod reddit;

pub use cli::{execute, run, Cli};
