//! FanBoy CLI
//!
//! Command-line interface for a FanBoy controller on a serial port.

use anyhow::{Context, Result};
use clap::Parser;
use fanboy_core::{default_config_path, DefaultBoard, StaticConfig};
use fanboy_hardware::FanBoyController;
use fanboyctl::cli::{
    generate_completion, handle_config, handle_curve, handle_fan, handle_load, handle_ports,
    handle_reset, handle_save, handle_settings, handle_status, handle_version, Cli, Commands,
    OutputFormat,
};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout carries command output
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Build configuration using priority chain: defaults → file → env → CLI args
fn build_config(cli: &Cli, path: &Path) -> fanboy_core::Result<StaticConfig> {
    let mut config = if cli.no_config {
        StaticConfig::default()
    } else {
        StaticConfig::load(path)?
    };

    config.apply_env_overrides()?;

    if let Some(ref device) = cli.device {
        config.serial.device = device.clone();
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.serial.read_timeout_ms = timeout_ms;
    }
    if cli.debug_uart {
        config.serial.debug_uart = true;
    }

    config.validate()?;
    Ok(config)
}

/// Open the serial link and run one controller command
async fn run_controller_command(
    command: Commands,
    config: &StaticConfig,
    format: &OutputFormat,
) -> Result<()> {
    let controller = <FanBoyController>::open::<DefaultBoard>(config).with_context(|| {
        format!(
            "Cannot open {} (pass --device, 'fanboyctl ports' lists candidates)",
            config.serial.device
        )
    })?;

    match command {
        Commands::Version => handle_version(&controller, format).await,
        Commands::Status => handle_status(&controller, format).await,
        Commands::Config => handle_config(&controller, format).await,
        Commands::Fan { command } => handle_fan(&controller, command).await,
        Commands::Curve => handle_curve(&controller, config, format).await,
        Commands::Save => handle_save(&controller).await,
        Commands::Load => handle_load(&controller).await,
        Commands::Reset => handle_reset(&controller).await,
        other => anyhow::bail!("{:?} does not use the controller", other),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = cli
        .config
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);

    let config = match build_config(&cli, &config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    debug!("Effective configuration: {:?}", config);

    let output_format = cli.format.clone().unwrap_or(OutputFormat::Table);

    // Ports, settings and completion work without a controller
    let result = match cli.command {
        Commands::Ports => handle_ports(&output_format),
        Commands::Settings { command } => handle_settings(
            command,
            &config,
            &config_path,
            !cli.no_config && config_path.exists(),
            &output_format,
        ),
        Commands::Completion { shell } => {
            generate_completion(shell);
            Ok(())
        }
        command => run_controller_command(command, &config, &output_format).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        if cli.verbose {
            eprintln!("Error details: {:?}", e);
        }
        std::process::exit(1);
    }

    Ok(())
}
