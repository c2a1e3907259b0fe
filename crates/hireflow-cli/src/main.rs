mod commands;

use clap::{Parser, Subcommand};
use commands::{EXIT_CONFIG_ERROR, EXIT_FAILURE, EXIT_INVALID_INPUT, EXIT_STORE_ERROR};
use hireflow_core::install_signal_handler;
use hireflow_schema::{HireflowConfig, HiringEvent};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;

const DEFAULT_STORE: &str = "~/.local/share/hireflow";

#[derive(Debug, Parser)]
#[command(
    name = "hireflow",
    version,
    about = "Track employee hiring through ADDED, IN_CHECK, APPROVED and REJECTED"
)]
struct Cli {
    /// Path to the record store directory (overrides HIREFLOW_STORE and the config file).
    #[arg(long, global = true)]
    store: Option<String>,

    /// Path to a config file (default: ~/.config/hireflow/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Register a new employee in the ADDED state.
    Create {
        /// Attribute as key=value; repeatable. Values that parse as JSON keep their type.
        #[arg(long = "attr", value_name = "KEY=VALUE")]
        attrs: Vec<String>,
        /// Attributes as a JSON object, merged before --attr values.
        #[arg(long)]
        attributes: Option<String>,
    },
    /// Show one employee record.
    Get {
        /// Employee ID.
        id: String,
    },
    /// List employees ordered by ID.
    List {
        /// Zero-based page number.
        #[arg(long, default_value_t = 0)]
        page: usize,
        /// Page size (defaults to the configured page size).
        #[arg(long)]
        size: Option<usize>,
    },
    /// Delete an employee record.
    Delete {
        /// Employee ID.
        id: String,
    },
    /// Move an ADDED employee into background check.
    StartCheck {
        /// Employee ID.
        id: String,
    },
    /// Approve an employee in check.
    Approve {
        /// Employee ID.
        id: String,
    },
    /// Reject an employee in check.
    Reject {
        /// Employee ID.
        id: String,
    },
    /// Apply an event by trigger name (start-check, approve, reject).
    Event {
        /// Employee ID.
        id: String,
        /// Trigger name.
        trigger: String,
    },
    /// Show committed state changes from the audit journal.
    History {
        /// Only show changes for this employee.
        id: Option<String>,
    },
    /// Validate the workflow table and the configuration.
    CheckConfig,
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("HIREFLOW_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .init();

    install_signal_handler();

    let result = load_config(cli.config.as_deref()).and_then(|config| {
        let store_path = resolve_store(cli.store.as_deref(), &config);
        debug!("using store at {}", store_path.display());
        dispatch(cli.command, &config, &store_path, cli.json)
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            ExitCode::from(exit_code_for(&msg))
        }
    }
}

fn dispatch(
    command: Commands,
    config: &HireflowConfig,
    store_path: &Path,
    json: bool,
) -> Result<u8, String> {
    match command {
        Commands::Create { attrs, attributes } => {
            let wf = commands::open_workflow(store_path, config)?;
            commands::create::run(&wf, &attrs, attributes.as_deref(), json)
        }
        Commands::Get { id } => {
            let wf = commands::open_workflow(store_path, config)?;
            commands::get::run(&wf, &id, json)
        }
        Commands::List { page, size } => {
            let wf = commands::open_workflow(store_path, config)?;
            let size = size.unwrap_or(config.default_page_size);
            commands::list::run(&wf, page, size, json)
        }
        Commands::Delete { id } => {
            let wf = commands::open_workflow(store_path, config)?;
            commands::delete::run(&wf, &id, json)
        }
        Commands::StartCheck { id } => {
            let wf = commands::open_workflow(store_path, config)?;
            commands::transition::run(&wf, &id, HiringEvent::StartCheck.trigger(), json)
        }
        Commands::Approve { id } => {
            let wf = commands::open_workflow(store_path, config)?;
            commands::transition::run(&wf, &id, HiringEvent::Approve.trigger(), json)
        }
        Commands::Reject { id } => {
            let wf = commands::open_workflow(store_path, config)?;
            commands::transition::run(&wf, &id, HiringEvent::Reject.trigger(), json)
        }
        Commands::Event { id, trigger } => {
            let wf = commands::open_workflow(store_path, config)?;
            commands::transition::run(&wf, &id, &trigger, json)
        }
        Commands::History { id } => commands::history::run(store_path, id.as_deref(), json),
        Commands::CheckConfig => commands::check_config::run(config, store_path, json),
    }
}

fn load_config(path: Option<&Path>) -> Result<HireflowConfig, String> {
    let loaded = match path {
        Some(path) => HireflowConfig::load(path),
        None => HireflowConfig::load_default(),
    };
    loaded.map_err(|e| format!("config error: {e}"))
}

/// `--store`, then `HIREFLOW_STORE`, then the config file, then the default.
fn resolve_store(flag: Option<&str>, config: &HireflowConfig) -> PathBuf {
    if let Some(path) = flag {
        return expand_tilde(path);
    }
    if let Ok(path) = std::env::var("HIREFLOW_STORE") {
        if !path.is_empty() {
            return expand_tilde(&path);
        }
    }
    if let Some(path) = &config.store_path {
        return expand_tilde(&path.to_string_lossy());
    }
    expand_tilde(DEFAULT_STORE)
}

fn exit_code_for(msg: &str) -> u8 {
    if msg.starts_with("invalid transition:") || msg.starts_with("invalid input:") {
        EXIT_INVALID_INPUT
    } else if msg.starts_with("store error:") {
        EXIT_STORE_ERROR
    } else if msg.starts_with("config error:") {
        EXIT_CONFIG_ERROR
    } else {
        EXIT_FAILURE
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(stripped);
        }
    }
    PathBuf::from(path)
}
