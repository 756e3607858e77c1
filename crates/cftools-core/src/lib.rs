//! cftools Core - Shared functionality for the cftools binaries
//!
//! Paths, configuration and terminal formatting used by every command.

pub mod config;
pub mod format;
pub mod paths;

pub use config::{ColorMode, Config};
pub use paths::Paths;
