//! CLI command definitions and handlers

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};

use cftools::health::HealthReport;
use cftools::resolve::Resolver;
use cftools::tree;
use cftools::{Collection, LoadPolicy, LoadedSnapshot, Snapshot, SnapshotIssue};
use cftools_core::format::Style;
use cftools_core::{ColorMode, Config, Paths};

use crate::report;

/// cftools - query a local snapshot of a Cloud Foundry foundation
///
/// "Ask the cache, not the controller."
#[derive(Parser)]
#[command(name = "cftools")]
#[command(version)]
#[command(about = "Query a local cloud controller cache: apps, services, bindings and health")]
#[command(after_help = "\
EXAMPLES:
    cftools app health-check           Crashed and unhealthy apps across the foundation
    cftools app get-guid billing       Where does the 'billing' app live
    cftools app show <GUID>            App details with instance counts
    cftools service list               Service offerings in the cache
    cftools service usage postgres     Orgs and spaces using a service, as a tree
    cftools service get-guid db1       Where does the 'db1' service instance live
    cftools binding app <GUID>         Service instances bound to an app
    cftools binding service <GUID>     Apps bound to a service instance
    cftools status                     Cache location and record counts

CACHE:
    Reads the eight JSON files under ~/.cfcache (override with --cache-dir,
    CFTOOLS_CACHE_DIR or cache_dir in ~/.config/cftools/config.yaml).")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Snapshot directory (default: ~/.cfcache)
    #[arg(long, global = true, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Fail instead of answering from a cache with unparseable files
    #[arg(long, global = true)]
    pub strict: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Commands to investigate service instances
    Service {
        #[command(subcommand)]
        action: ServiceCommands,
    },

    /// Commands to investigate service bindings
    #[command(alias = "b")]
    Binding {
        #[command(subcommand)]
        action: BindingCommands,
    },

    /// Commands to investigate apps
    #[command(alias = "a")]
    App {
        #[command(subcommand)]
        action: AppCommands,
    },

    /// Show cache location, record counts and load problems
    Status,
}

#[derive(Subcommand)]
pub enum ServiceCommands {
    /// List available service types
    List,

    /// Show service instance usage of a service type as a tree
    Usage {
        /// Service label, e.g. "postgres"
        label: String,
    },

    /// Search for a service instance guid by name
    GetGuid {
        /// Service instance name
        name: String,
    },
}

#[derive(Subcommand)]
pub enum BindingCommands {
    /// Find bindings by app guid
    App {
        /// App guid
        guid: String,
    },

    /// Find bindings by service instance guid
    Service {
        /// Service instance guid
        guid: String,
    },
}

#[derive(Subcommand)]
pub enum AppCommands {
    /// Search for an app guid by name
    GetGuid {
        /// App name
        name: String,
    },

    /// Show app info for an app guid
    Show {
        /// App guid
        guid: String,
    },

    /// Show global info regarding crashed and unhealthy apps
    HealthCheck,
}

/// Result of a query, used to pick the exit status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Found,
    NotFound,
}

impl Outcome {
    fn from_count(count: usize) -> Self {
        if count == 0 {
            Outcome::NotFound
        } else {
            Outcome::Found
        }
    }
}

/// Everything a query handler needs
struct Ctx {
    style: Style,
    json: bool,
}

impl Ctx {
    /// Print rows as JSON or text; a lookup without rows prints `not_found`
    fn emit<T: Serialize>(&self, rows: &[T], text: impl FnOnce() -> String, not_found: &str) -> Result<Outcome> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(rows)?);
        } else if rows.is_empty() {
            println!("{}", not_found);
        } else {
            print!("{}", text());
        }
        Ok(Outcome::from_count(rows.len()))
    }
}

/// Run the CLI
pub fn run(cli: Cli) -> Result<Outcome> {
    let paths = Paths::new();
    let config = Config::load()?;

    let dir = paths.snapshot_dir(cli.cache_dir.clone(), config.cache_dir.as_ref());
    let color = if cli.no_color || cli.json {
        ColorMode::Never
    } else {
        config.color
    };
    let ctx = Ctx {
        style: Style::new(color),
        json: cli.json,
    };

    tracing::debug!("Reading snapshot from {}", dir.display());
    let loaded = Snapshot::load(&dir)
        .with_context(|| format!("Failed to load snapshot from {}", dir.display()))?;

    let policy = if cli.strict || config.strict {
        LoadPolicy::Strict
    } else {
        LoadPolicy::Lenient
    };

    match cli.command {
        Commands::Status => cmd_status(&ctx, &dir, &loaded),
        command => {
            warn_issues(&loaded.issues);
            let snapshot = loaded.into_snapshot(policy)?;
            let resolver = Resolver::new(&snapshot);
            dispatch(&ctx, &resolver, command)
        }
    }
}

fn dispatch(ctx: &Ctx, resolver: &Resolver<'_>, command: Commands) -> Result<Outcome> {
    match command {
        Commands::Service { action: ServiceCommands::List } => cmd_service_list(ctx, resolver),
        Commands::Service { action: ServiceCommands::Usage { label } } => cmd_service_usage(ctx, resolver, &label),
        Commands::Service { action: ServiceCommands::GetGuid { name } } => cmd_service_get_guid(ctx, resolver, &name),
        Commands::Binding { action: BindingCommands::App { guid } } => cmd_binding_app(ctx, resolver, &guid),
        Commands::Binding { action: BindingCommands::Service { guid } } => cmd_binding_service(ctx, resolver, &guid),
        Commands::App { action: AppCommands::GetGuid { name } } => cmd_app_get_guid(ctx, resolver, &name),
        Commands::App { action: AppCommands::Show { guid } } => cmd_app_show(ctx, resolver, &guid),
        Commands::App { action: AppCommands::HealthCheck } => cmd_health_check(ctx, resolver),
        Commands::Status => Ok(Outcome::Found),
    }
}

/// Tell the user about collections that loaded empty
fn warn_issues(issues: &[SnapshotIssue]) {
    for issue in issues {
        match issue {
            SnapshotIssue::Missing { collection, .. } => eprintln!(
                "{} does not exist in the cache. Please resync the cache.",
                collection.file_name()
            ),
            SnapshotIssue::Malformed {
                collection, message, ..
            } => eprintln!(
                "{} could not be parsed ({}). Please resync the cache.",
                collection.file_name(),
                message
            ),
        }
    }
}

fn cmd_service_list(ctx: &Ctx, resolver: &Resolver<'_>) -> Result<Outcome> {
    let services: Vec<_> = resolver
        .snapshot()
        .services
        .iter()
        .map(|s| (s, resolver.plans_for_service(&s.guid)))
        .collect();

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&services)?);
    } else {
        println!();
        println!("Services available:");
        println!();
        print!("{}", report::services(ctx.style, &services));
        println!();
    }
    Ok(Outcome::Found)
}

fn cmd_service_usage(ctx: &Ctx, resolver: &Resolver<'_>, label: &str) -> Result<Outcome> {
    let (out, outcome) = service_usage(ctx, resolver, label)?;
    print!("{}", out);
    Ok(outcome)
}

/// Render `service usage`; an unknown label is an empty JSON array with `--json`
fn service_usage(ctx: &Ctx, resolver: &Resolver<'_>, label: &str) -> Result<(String, Outcome)> {
    let mut out = String::new();
    if !ctx.json {
        out.push_str(&format!("\nYou've entered: {}\n\n", label));
    }

    let service = match resolver.service_by_label(label) {
        Some(service) => service,
        None if ctx.json => return Ok(("[]\n".to_string(), Outcome::NotFound)),
        None => {
            out.push_str("Could not find a service guid with your label. Please try again.\n");
            return Ok((out, Outcome::NotFound));
        }
    };

    let entries = tree::group(resolver.snapshot(), &service.guid);
    if ctx.json {
        out.push_str(&serde_json::to_string_pretty(&entries)?);
        out.push('\n');
    } else {
        out.push_str(&report::usage_tree(ctx.style, &entries));
    }
    Ok((out, Outcome::Found))
}

fn cmd_service_get_guid(ctx: &Ctx, resolver: &Resolver<'_>, name: &str) -> Result<Outcome> {
    if !ctx.json {
        println!();
        println!("Searching for service guid by service instance name: {}", name);
        println!();
    }
    let rows = resolver.service_instances_by_name(name);
    ctx.emit(
        &rows,
        || report::service_instances(ctx.style, &rows),
        "No service instance with that name in the cache.",
    )
}

fn cmd_binding_app(ctx: &Ctx, resolver: &Resolver<'_>, guid: &str) -> Result<Outcome> {
    if !ctx.json {
        println!();
        println!("Searching for bindings by app guid: {}", guid);
        println!();
    }
    let rows = resolver.bindings_for_app_guid(guid);
    ctx.emit(
        &rows,
        || report::bound_instances(ctx.style, &rows),
        "No bindings for that app guid in the cache.",
    )
}

fn cmd_binding_service(ctx: &Ctx, resolver: &Resolver<'_>, guid: &str) -> Result<Outcome> {
    if !ctx.json {
        println!();
        println!("Searching for bindings by service instance guid: {}", guid);
        println!();
    }
    let rows = resolver.bindings_for_service_instance_guid(guid);
    ctx.emit(
        &rows,
        || report::bound_apps(ctx.style, &rows),
        "No bindings for that service instance guid in the cache.",
    )
}

fn cmd_app_get_guid(ctx: &Ctx, resolver: &Resolver<'_>, name: &str) -> Result<Outcome> {
    if !ctx.json {
        println!();
        println!("Searching for app guid by app name: {}", name);
        println!();
    }
    let rows = resolver.apps_by_name(name);
    ctx.emit(
        &rows,
        || report::apps(ctx.style, &rows),
        "No app with that name in the cache.",
    )
}

fn cmd_app_show(ctx: &Ctx, resolver: &Resolver<'_>, guid: &str) -> Result<Outcome> {
    if !ctx.json {
        println!();
        println!("Searching for app by app guid: {}", guid);
        println!();
    }
    let details = resolver.app_by_guid(guid);
    ctx.emit(
        &details,
        || report::app_details(ctx.style, &details),
        "No app with that guid in the cache.",
    )
}

fn cmd_health_check(ctx: &Ctx, resolver: &Resolver<'_>) -> Result<Outcome> {
    let health = HealthReport::for_snapshot(resolver.snapshot());

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&health)?);
    } else {
        println!();
        println!("Checking app health for the foundation.");
        println!();
        print!("{}", report::health(ctx.style, resolver, &health));
    }
    Ok(Outcome::Found)
}

#[derive(Serialize)]
struct CollectionStatus {
    file: &'static str,
    records: usize,
    problem: Option<String>,
}

fn cmd_status(ctx: &Ctx, dir: &Path, loaded: &LoadedSnapshot) -> Result<Outcome> {
    let statuses: Vec<CollectionStatus> = Collection::ALL
        .iter()
        .map(|&collection| CollectionStatus {
            file: collection.file_name(),
            records: loaded.snapshot.len(collection),
            problem: loaded
                .issues
                .iter()
                .find(|i| i.collection() == collection)
                .map(|issue| match issue {
                    SnapshotIssue::Missing { .. } => "missing".to_string(),
                    SnapshotIssue::Malformed { message, .. } => format!("malformed: {}", message),
                }),
        })
        .collect();

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
        return Ok(Outcome::Found);
    }

    let mut out = report::Report::new(ctx.style);
    out.field("Cache:", dir.display());
    out.blank();
    for status in &statuses {
        let value = match &status.problem {
            Some(problem) => format!("{} ({})", status.records, ctx.style.yellow(problem)),
            None => status.records.to_string(),
        };
        out.field(status.file, value);
    }
    print!("{}", out.finish());
    Ok(Outcome::Found)
}
