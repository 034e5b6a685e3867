mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use event_permalinks::config::{find_config_path, load_or_default};
use event_permalinks::web_server::{HotReloader, WebServer};
use event_permalinks::Config;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::RwLock;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments first to get debug flag
    let cli = Cli::parse();

    // Initialize logging based on debug flag
    let level = if cli.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let config_path = find_config_path(cli.config);
    let config = load_or_default(config_path.as_deref()).context("Failed to load config")?;

    let command = cli.command.unwrap_or(Commands::Serve);
    if let Commands::Serve = command {
        return run_server(config, config_path).await;
    }

    let rewriter = config.build_rewriter()?;
    let output = match command {
        Commands::Rules(args) if args.json => cli::render_rules_json(&rewriter)?,
        Commands::Rules(_) => cli::render_rules(&rewriter)?,
        Commands::Bases(args) => cli::render_bases(&rewriter, args.raw),
        Commands::Matchers => cli::render_matchers(&rewriter),
        Commands::Resolve(args) => cli::render_resolution(&rewriter, &args.url),
        Commands::Link(args) => rewriter.view_link(&cli::view_link_from_args(&args)),
        Commands::Check => cli::check_rules(&rewriter)?,
        Commands::Serve => return Ok(()),
    };
    println!("{}", output);

    Ok(())
}

/// Serve the dispatcher until Ctrl+C, reloading on config changes.
async fn run_server(config: Config, config_path: Option<PathBuf>) -> Result<()> {
    let rewriter = Arc::new(RwLock::new(config.build_rewriter()?));

    println!("🎯 event-permalinks started");
    match &config_path {
        Some(path) => println!("📂 Config file: {}", path.display()),
        None => println!("📂 No config file, using defaults"),
    }

    // Keep the watcher alive for the lifetime of the server
    let _reloader = match &config_path {
        Some(path) if config.server.watch => Some(HotReloader::new(path, rewriter.clone())?),
        _ => None,
    };

    let server = WebServer::new(config.server.port, config.server.host.clone(), rewriter);
    println!(
        "🌐 Dispatcher available at: http://{}:{}",
        config.server.host, config.server.port
    );
    println!("🛑 Press Ctrl+C to stop");

    tokio::select! {
        result = server.start() => result?,
        result = signal::ctrl_c() => {
            result.context("Failed to listen for ctrl_c")?;
            println!("\n🛑 Received Ctrl+C, shutting down...");
        }
    }

    Ok(())
}
