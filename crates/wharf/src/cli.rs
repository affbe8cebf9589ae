//! CLI command definitions and handlers.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use tracing_subscriber::EnvFilter;
use wharf_common::WharfError;
use wharf_common::config::{self, DEFAULT_CONFIG_PATH, Settings};
use wharf_network::Allocations;

/// Wharf - container port bindings for server allocations
#[derive(Parser)]
#[command(name = "wharf")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, env = "WHARF_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Print the port bindings for an allocation file
    Bindings(PipelineArgs),

    /// Print the exposed port set for an allocation file
    Exposed(PipelineArgs),
}

/// Arguments shared by the pipeline commands.
#[derive(Args)]
pub struct PipelineArgs {
    /// Path to the allocations JSON file
    pub allocations: PathBuf,

    /// Override the bridge interface address
    #[arg(long)]
    pub interface: Option<String>,

    /// Drop loopback bindings (isolated network mode); `--isolated=false` turns it off
    #[arg(long, num_args = 0..=1, default_missing_value = "true", require_equals = true)]
    pub isolated: Option<bool>,
}

impl PipelineArgs {
    fn apply_overrides(&self) {
        config::update(|settings| {
            if let Some(interface) = &self.interface {
                settings.docker.network.interface.clone_from(interface);
            }
            if let Some(isolated) = self.isolated {
                settings.docker.network.ispn = isolated;
            }
        });
    }

    fn load_allocations(&self) -> Result<Allocations> {
        let json = std::fs::read_to_string(&self.allocations).wrap_err_with(|| {
            format!("Failed to read allocations from {}", self.allocations.display())
        })?;
        Allocations::from_json(&json)
            .map_err(|e| eyre!("Invalid allocations in {}: {e}", self.allocations.display()))
    }
}

impl Cli {
    /// Log filter for the CLI. `RUST_LOG` replaces the defaults when set.
    #[must_use]
    pub fn log_filter(&self) -> EnvFilter {
        build_log_filter(self.debug, std::env::var("RUST_LOG").ok().as_deref())
    }

    /// Execute the CLI command.
    pub fn execute(self) -> Result<()> {
        config::set(load_settings(self.config.as_deref())?);

        let output = match self.command {
            Commands::Bindings(args) => {
                args.apply_overrides();
                let allocations = args.load_allocations()?;
                serde_json::to_string_pretty(&allocations.docker_bindings_current())?
            }
            Commands::Exposed(args) => {
                args.apply_overrides();
                let allocations = args.load_allocations()?;
                serde_json::to_string_pretty(&allocations.exposed_current())?
            }
        };

        println!("{output}");
        Ok(())
    }
}

fn build_log_filter(debug: bool, rust_log: Option<&str>) -> EnvFilter {
    if let Some(filter) = rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
    {
        return filter;
    }

    let level = if debug { "debug" } else { "info" };
    EnvFilter::new(format!(
        "wharf={level},wharf_common={level},wharf_network={level}"
    ))
}

/// Load settings from an explicit path, or from the default location if it
/// exists.
fn load_settings(path: Option<&Path>) -> Result<Settings> {
    if let Some(path) = path {
        return Settings::load(path)
            .map_err(|e| eyre!("Failed to load configuration {}: {e}", path.display()));
    }

    match Settings::load(DEFAULT_CONFIG_PATH) {
        Ok(settings) => Ok(settings),
        Err(WharfError::Io(e)) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = DEFAULT_CONFIG_PATH, "No configuration file, using defaults");
            Ok(Settings::default())
        }
        Err(e) => Err(eyre!("Failed to load configuration {DEFAULT_CONFIG_PATH}: {e}")),
    }
}
