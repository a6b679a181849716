//! OpShell CLI - Main entry point

mod ansi;
mod console;
mod demo;

use clap::{Parser, Subcommand};
use opshell_core::{
    CommandRegistry, DirectoryDelivery, Dispatcher, ProcessorChain, ShellServer, TerminalLoop,
};
use opshell_foundation::ShellConfig;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// OpShell - authenticated operator command shell
#[derive(Parser, Debug)]
#[command(name = "opshell")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Configuration file (defaults to ~/.config/opshell/shell.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Console user name
    #[arg(short, long)]
    user: Option<String>,

    /// Role granted to the console session (repeatable)
    #[arg(short, long = "role")]
    role: Vec<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start an interactive console session (default)
    Console,
    /// List registered commands and subcommands
    Commands,
    /// Print the effective configuration
    Config {
        /// Write it to the global configuration file
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    // Logging goes to stderr; stdout belongs to the session
    let log_level = if args.debug { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = match &args.config {
        Some(path) => ShellConfig::load_from(path)?,
        None => ShellConfig::load()?,
    };

    let registry = Arc::new(CommandRegistry::with_builtins(demo::providers(&config))?);

    match args.command.unwrap_or(Command::Console) {
        Command::Commands => {
            print_commands(&registry);
            Ok(ExitCode::SUCCESS)
        }
        Command::Config { save } => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            if save {
                config.save_global()?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Console => {
            let chain = ProcessorChain::builder()
                .highlight()?
                .forward(Arc::new(DirectoryDelivery::new(
                    config.delivery.resolved_directory(),
                )))?
                .banned_symbols(config.banned_symbols.clone())
                .build(Dispatcher::new(registry))?;

            let terminal = TerminalLoop::from_config(Arc::new(chain), &config);
            let (username, roles) = console::identity(&config, args.user, args.role);
            let transport = console::ConsoleTransport::stdio(username, roles, &config);

            let exit = console::run(ShellServer::new(terminal), transport).await;
            let code = if exit.is_clean() {
                0
            } else {
                eprintln!("Session ended: {}", exit);
                1
            };
            // tokio stdin keeps a blocking read alive; do not wait for it
            std::process::exit(code);
        }
    }
}

fn print_commands(registry: &CommandRegistry) {
    for name in registry.list_top_level() {
        let Some(entry) = registry.lookup(name) else {
            continue;
        };
        let default = entry.default_descriptor();
        println!(
            "{:<12} {:<10} {}",
            name,
            default.required_roles().to_string(),
            default.description()
        );
        for sub in entry.subcommands() {
            println!(
                "  {:<10} {:<10} {}",
                sub.name(),
                sub.required_roles().to_string(),
                sub.description()
            );
        }
    }
}
