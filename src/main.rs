//! Oops console - runs the correction engine against an in-memory command map
//!
//! # Input (via stdin)
//! One command line per line, as a sender would type it (`/hepl 2`).
//!
//! # Output (via stdout)
//! Suggestion messages and the result of every command that ends up running.
//! Logs go to stderr and are controlled by `RUST_LOG`.

use clap::Parser;
use colored::Colorize;
use oops::lang;
use oops::{
    CommandMap, CommandRegistry, ConfigSource, CorrectionController, FileConfig, Host,
    KnownCommand, OopsError, Outcome, RegistryError,
};
use std::collections::HashSet;
use std::fs;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info};

// ============================================================================
// CLI
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "oops", version, about = "Correct mistyped console commands")]
struct Cli {
    /// Config file (defaults to <config dir>/oops/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON catalog of commands to register (defaults to a built-in set)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Name of the sender issuing the commands
    #[arg(long, default_value = "CONSOLE")]
    sender: String,

    /// Grant a permission to the sender (repeatable)
    #[arg(long = "grant", value_name = "PERMISSION")]
    grants: Vec<String>,

    /// Grant every permission
    #[arg(long)]
    op: bool,
}

// ============================================================================
// Console Host
// ============================================================================

/// Host backed by a [`CommandMap`], printing to stdout.
struct ConsoleHost {
    map: CommandMap,
    permissions: HashSet<String>,
    op: bool,
}

impl ConsoleHost {
    /// Normal processing for a line the controller let through.
    fn process(&mut self, sender: &str, raw: &str) {
        let line = raw.strip_prefix('/').unwrap_or(raw);
        self.dispatch(sender, line);
    }
}

impl CommandRegistry for ConsoleHost {
    fn commands(&self) -> Vec<Arc<KnownCommand>> {
        self.map.commands()
    }

    fn lookup(&self, label: &str) -> Option<Arc<KnownCommand>> {
        self.map.lookup(label)
    }

    fn get(&self, label: &str) -> Result<Option<Arc<KnownCommand>>, RegistryError> {
        self.map.get(label)
    }

    fn put(
        &mut self,
        label: &str,
        command: Arc<KnownCommand>,
    ) -> Result<Option<Arc<KnownCommand>>, RegistryError> {
        self.map.put(label, command)
    }

    fn remove(&mut self, label: &str) -> Result<Option<Arc<KnownCommand>>, RegistryError> {
        self.map.remove(label)
    }
}

impl Host for ConsoleHost {
    fn has_permission(&self, _sender: &str, permission: &str) -> bool {
        self.op || self.permissions.contains(permission)
    }

    fn dispatch(&mut self, sender: &str, command_line: &str) {
        let label = command_line.split_whitespace().next().unwrap_or_default();
        match self.map.lookup(label) {
            Some(command) if self.can_use(sender, &command) => {
                println!(
                    "{} {} ran {} ({})",
                    "⚡".yellow(),
                    sender.bold(),
                    command_line.green(),
                    command.owner
                );
            }
            Some(_) => println!(
                "{}",
                "I'm sorry, but you do not have permission to perform this command.".red()
            ),
            None => println!("Unknown command. Type \"/help\" for help."),
        }
    }

    fn send_message(&mut self, sender: &str, message: &str) {
        debug!("Message to {}: {:?}", sender, message);
        println!("{}", lang::render_ansi(message));
    }
}

// ============================================================================
// Catalog
// ============================================================================

fn default_catalog() -> Vec<KnownCommand> {
    vec![
        KnownCommand::new("help").with_aliases(["?"]),
        KnownCommand::new("version").with_aliases(["ver", "about"]),
        KnownCommand::new("teleport")
            .with_aliases(["tp"])
            .with_permission("minecraft.command.teleport"),
        KnownCommand::new("gamemode")
            .with_aliases(["gm"])
            .with_permission("minecraft.command.gamemode"),
        KnownCommand::new("give").with_permission("minecraft.command.give"),
        KnownCommand::new("list"),
        KnownCommand::new("plugins").with_aliases(["pl"]),
    ]
}

fn load_catalog(path: &PathBuf) -> Result<Vec<KnownCommand>, OopsError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()) {
        error!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), OopsError> {
    let catalog = match &cli.catalog {
        Some(path) => load_catalog(path)?,
        None => default_catalog(),
    };
    info!("Loaded {} commands", catalog.len());

    let source = match cli.config {
        Some(path) => FileConfig::new(path),
        None => FileConfig::default_location()?,
    };
    debug!("Using config at {:?}", source.path());

    let mut host = ConsoleHost {
        map: CommandMap::from_catalog(catalog),
        permissions: cli.grants.into_iter().collect(),
        op: cli.op,
    };
    serve(source, &mut host, &cli.sender)
}

fn serve<C: ConfigSource>(source: C, host: &mut ConsoleHost, sender: &str) -> Result<(), OopsError> {
    let mut controller = CorrectionController::enable(source, host)?;

    for line in io::stdin().lock().lines() {
        let line = line?;
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        if controller.handle_input(host, sender, line) == Outcome::Pass {
            host.process(sender, line);
        }
    }

    controller.disable(host);
    Ok(())
}
