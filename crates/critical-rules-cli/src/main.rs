//! Critical Rules MCP - stdio server and maintenance commands

mod server;

use anyhow::{bail, Context};
use clap::Parser;
use critical_rules_core::{RulesConfig, RulesRuntime, VersionRecord};
use rmcp::ServiceExt;
use server::{RulesServer, SERVER_NAME};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Rules document written by `init`.
const BUNDLED_RULES: &str = include_str!("../assets/CRITICAL-RULES.md");

#[derive(Parser)]
#[command(name = "critical-rules-mcp")]
#[command(about = "Critical Rules - MCP server with verified self-updating rules", version)]
struct Cli {
    /// Configuration file path (TOML)
    #[arg(short, long, global = true, env = "CRITICAL_RULES_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory holding the rules, version record and backups
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log filter (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Serve the rules over MCP on stdio (default)
    Serve,
    /// Seed the data directory with the bundled rules
    Init {
        /// Overwrite an existing rules document
        #[arg(long)]
        force: bool,
    },
    /// Show the installed version (no network)
    Status,
    /// Check the remote for a newer version
    Check,
    /// Download, verify and install the published rules
    Update {
        /// Reinstall even if already on the latest version
        #[arg(long)]
        force: bool,
    },
    /// Invoke a tool by name and print its response
    Tool {
        /// Tool name, e.g. verify_compliance
        name: String,
        /// Tool arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.log_level.as_deref());

    let config = load_config(&cli)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(&config).await,
        Commands::Init { force } => init(&config, force),
        Commands::Status => {
            let runtime = RulesRuntime::load(&config)?;
            println!("{}", runtime.version_info_text(false).await);
            Ok(())
        }
        Commands::Check => {
            let runtime = RulesRuntime::load(&config)?;
            println!("{}", runtime.check_for_updates_text().await);
            Ok(())
        }
        Commands::Update { force } => {
            let runtime = RulesRuntime::load(&config)?;
            println!("{}", runtime.update_rules_text(force).await);
            Ok(())
        }
        Commands::Tool { name, args } => {
            let arguments: serde_json::Value =
                serde_json::from_str(&args).context("--args must be a JSON object")?;
            let runtime = RulesRuntime::load(&config)?;
            println!("{}", runtime.call_tool(&name, &arguments).await?);
            Ok(())
        }
    }
}

/// Logs go to stderr; stdout carries the protocol.
fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn load_config(cli: &Cli) -> anyhow::Result<RulesConfig> {
    let mut config = match &cli.config {
        Some(path) => RulesConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RulesConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.storage.data_dir = dir.clone();
    }
    config.validate()?;
    Ok(config)
}

async fn serve(config: &RulesConfig) -> anyhow::Result<()> {
    let runtime = RulesRuntime::load(config)?;
    info!(
        "Serving rules from {} over stdio",
        runtime.store().root().display()
    );

    let service = RulesServer::new(Arc::new(runtime))
        .serve(rmcp::transport::io::stdio())
        .await
        .inspect_err(|e| error!("MCP server error: {}", e))?;
    service.waiting().await?;
    Ok(())
}

fn init(config: &RulesConfig, force: bool) -> anyhow::Result<()> {
    let store = config.store();
    if store.has_rules() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            store.rules_path().display()
        );
    }

    store.ensure_dir()?;
    store.write_rules(BUNDLED_RULES)?;
    let record = VersionRecord::bootstrap(BUNDLED_RULES, &config.bootstrap);
    store.save_version(&record)?;
    info!("Seeded rules v{} in {}", record.version, store.root().display());

    let binary = std::env::current_exe()?;
    let snippet = serde_json::json!({
        "mcpServers": {
            SERVER_NAME: {
                "command": binary.to_string_lossy(),
                "args": ["--data-dir", store.root().to_string_lossy()],
            }
        }
    });
    println!("Installed {}", store.rules_path().display());
    println!("\nAdd to your MCP host configuration:\n");
    println!("{}", serde_json::to_string_pretty(&snippet)?);
    Ok(())
}
