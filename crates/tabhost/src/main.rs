mod core_tabs;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{debug, info, warn};
use tabhost_core::kernel::error::Error;
use tabhost_core::storage::StorageSystemError;
use tabhost_core::{Discovery, DiscoverySettings, RegistryView};
use tracing_subscriber::EnvFilter;

/// Tabhost: discover and inspect tab plugins
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Simple ping command for testing
    #[arg(long)]
    ping: bool,

    /// Directory scanned for local plugin libraries
    #[arg(long, global = true)]
    plugins_dir: Option<PathBuf>,

    /// Root of installed packages (repeatable)
    #[arg(long = "package-dir", global = true)]
    package_dirs: Vec<PathBuf>,

    /// Settings file (JSON, YAML or TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log discovery progress
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List every registered plugin with its status
    List,
    /// List plugins that passed validation
    Active,
    /// Show every recorded discovery outcome
    Diagnostics,
    /// Show details of one plugin
    Info {
        /// The name of the plugin
        name: String,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Build a plugin's tab and print it
    Open {
        /// The name of the plugin
        name: String,
    },
    /// Summarize the discovery run
    Summary {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    // log records from tabhost-core reach the subscriber through its log bridge
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("Failed to initialize logging: {}", e);
    }
}

fn load_settings(args: &CliArgs) -> Result<DiscoverySettings, Error> {
    let mut settings = match &args.config {
        Some(path) => match DiscoverySettings::load(path) {
            Ok(settings) => settings,
            Err(Error::StorageSystem(StorageSystemError::FileNotFound(missing))) => {
                warn!("Settings file {} not found, using defaults", missing.display());
                DiscoverySettings::default()
            }
            Err(e) => return Err(e),
        },
        None => DiscoverySettings::default(),
    };

    if let Some(dir) = &args.plugins_dir {
        settings.plugins_dir = dir.clone();
    }
    settings.package_dirs.extend(args.package_dirs.iter().cloned());
    Ok(settings)
}

/// Surface discovery outcomes through the log sink
fn report_diagnostics(view: &RegistryView) {
    for (source, result) in view.diagnostics() {
        if result.is_valid() {
            info!("{}: registered '{}'", source, result.name().unwrap_or_default());
        } else {
            warn!("{}: {}: {}", source, result.status, result.messages.join("; "));
        }
    }
    for record in view.overrides() {
        info!("{}", record);
    }
}

fn print_list(view: &RegistryView) {
    if view.all().is_empty() {
        println!("No plugins registered.");
        return;
    }
    for entry in view.all() {
        let switch = if view.is_enabled(entry.name()) { "" } else { " (disabled)" };
        println!(
            "  - {} [{}] {}{} - {}",
            entry.name(),
            entry.descriptor.origin,
            entry.status(),
            switch,
            entry.descriptor.source_identifier
        );
    }
}

fn print_active(view: &RegistryView) {
    let active = view.active();
    if active.is_empty() {
        println!("No active plugins.");
        return;
    }
    for entry in active {
        println!("  - {}: {}", entry.name(), entry.descriptor.description);
    }
}

fn print_diagnostics(view: &RegistryView) {
    for (source, result) in view.diagnostics() {
        println!("{}: {}", source, result.status);
        for message in &result.messages {
            println!("    {}", message);
        }
    }
}

fn print_info(view: &RegistryView, name: &str, json: bool) -> ExitCode {
    let Some(info) = view.info(name) else {
        eprintln!("Plugin '{}' not found.", name);
        return ExitCode::FAILURE;
    };

    if json {
        match serde_json::to_string_pretty(&info) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Failed to serialize plugin info: {}", e);
                return ExitCode::FAILURE;
            }
        }
        return ExitCode::SUCCESS;
    }

    println!("Name: {}", info.name);
    println!("Description: {}", info.description);
    println!("Version: {}", info.version);
    println!("Author: {}", info.author);
    println!("Platforms: {}", info.supported_platforms.join(", "));
    println!("Compatible with {}: {}", info.current_platform, info.compatible);
    println!("Requires admin: {}", info.requires_admin);
    println!("Origin: {}", info.origin);
    println!("Source: {}", info.source);
    ExitCode::SUCCESS
}

fn open_tab(view: &RegistryView, name: &str) -> ExitCode {
    let Some(entry) = view.get(name) else {
        eprintln!("Plugin '{}' not found.", name);
        return ExitCode::FAILURE;
    };
    if !entry.is_active() {
        eprintln!("Plugin '{}' is not active: {}", name, entry.status());
        return ExitCode::FAILURE;
    }

    match entry.descriptor.create_widget() {
        Ok(widget) => {
            println!("== {} ==", widget.title());
            println!("{}", widget.render_text());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to open '{}': {}", name, e);
            ExitCode::FAILURE
        }
    }
}

fn print_summary(view: &RegistryView, json: bool) -> ExitCode {
    let summary = view.summary();
    if json {
        return match serde_json::to_string_pretty(&summary) {
            Ok(text) => {
                println!("{}", text);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Failed to serialize summary: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    println!("Platform: {}", summary.platform);
    println!("Registered: {}", summary.total);
    println!("Active: {}", summary.active);
    println!("Enabled: {}", summary.enabled);
    println!("Failures: {}", summary.failures);
    println!("Overrides: {}", summary.overrides.len());
    ExitCode::SUCCESS
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    if args.ping {
        println!("pong");
        return ExitCode::SUCCESS;
    }

    init_logging(args.verbose);

    let settings = match load_settings(&args) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load settings: {}", e);
            return ExitCode::from(2);
        }
    };
    debug!("Discovering plugins with {:?}", settings);

    // --- Discovery runs off the main thread; the handle is the only sync point ---
    let handle = Discovery::new(settings)
        .with_core_plugin(core_tabs::about_tab())
        .spawn();
    let view = match handle.wait().await {
        Ok(view) => view,
        Err(e) => {
            eprintln!("Plugin discovery failed: {}", e);
            return ExitCode::FAILURE;
        }
    };
    report_diagnostics(&view);

    match args.command.unwrap_or(Commands::List) {
        Commands::List => {
            print_list(&view);
            ExitCode::SUCCESS
        }
        Commands::Active => {
            print_active(&view);
            ExitCode::SUCCESS
        }
        Commands::Diagnostics => {
            print_diagnostics(&view);
            ExitCode::SUCCESS
        }
        Commands::Info { name, json } => print_info(&view, &name, json),
        Commands::Open { name } => open_tab(&view, &name),
        Commands::Summary { json } => print_summary(&view, json),
    }
}
