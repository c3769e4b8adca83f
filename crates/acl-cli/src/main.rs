//! aclctl
//!
//! Command-line administration of hierarchical ACL databases.

#![warn(clippy::all)]
#![forbid(unsafe_code)]

use acl_cli::cli::{Cli, Command};
use acl_cli::config::AclConfig;
use acl_cli::{commands, config_handlers, exit_code};
use acl_engine::Acl;
use acl_storage::RedbBackend;
use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            let code = err
                .downcast_ref::<acl_core::Error>()
                .map_or(1, |e| exit_code(e.kind()));
            ExitCode::from(code)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let config_path = cli.config.as_deref();
    let database = cli.database.as_deref();

    match cli.command {
        Command::Config { action } => {
            init_logging("warn");
            config_handlers::handle_config_command(config_path, action, &mut out)?;
        }
        Command::Object { action } => {
            let acl = open_acl(config_path, database)?;
            commands::handle_object_command(&acl, action, &mut out)?;
        }
        Command::Grant { action } => {
            let acl = open_acl(config_path, database)?;
            commands::handle_grant_command(&acl, action, &mut out)?;
        }
        Command::Check {
            object_id,
            sid,
            permission,
        } => {
            let acl = open_acl(config_path, database)?;
            commands::handle_check(&acl, &object_id, &sid, permission, &mut out)?;
        }
    }
    out.flush()?;
    Ok(())
}

/// Load configuration, start logging, and open the configured database.
fn open_acl(config_path: Option<&str>, database: Option<&str>) -> Result<Acl<RedbBackend>> {
    let mut config = AclConfig::load(config_path)?;
    if let Some(path) = database {
        config.database.path = PathBuf::from(path);
    }
    init_logging(&config.logging.level);
    Ok(Acl::new(open_backend(&config)?))
}

fn open_backend(config: &AclConfig) -> Result<RedbBackend> {
    if config.database.in_memory {
        log::warn!("Using an in-memory database; changes are discarded on exit");
        return Ok(RedbBackend::in_memory()?);
    }

    let path = &config.database.path;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| acl_core::Error::io_with_path(e, parent))?;
    }
    RedbBackend::open(path).with_context(|| format!("opening database {}", path.display()))
}

/// `RUST_LOG` wins; otherwise `level`. `log` records are bridged in.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
