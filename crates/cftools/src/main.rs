//! cftools - query a local cloud controller cache
//!
//! "Ask the cache, not the controller."
//!
//! Usage:
//!   cftools service list               List available service types
//!   cftools service usage <LABEL>      Org/space tree of a service's instances
//!   cftools service get-guid <NAME>    Find a service instance by name
//!   cftools binding app <GUID>         Service instances bound to an app
//!   cftools binding service <GUID>     Apps bound to a service instance
//!   cftools app get-guid <NAME>        Find an app by name
//!   cftools app show <GUID>            Show an app with its instance counts
//!   cftools app health-check           Crashed and unhealthy apps
//!   cftools status                     Cache location and record counts
//!
//! A lookup that finds nothing exits with status 255.

mod cli;
mod report;

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Outcome};

/// Exit status for a lookup that resolved nothing
const NOT_FOUND_STATUS: u8 = 255;

fn main() -> Result<ExitCode> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli::run(cli)? {
        Outcome::Found => Ok(ExitCode::SUCCESS),
        Outcome::NotFound => Ok(ExitCode::from(NOT_FOUND_STATUS)),
    }
}
