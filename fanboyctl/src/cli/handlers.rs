//! Command handlers
//!
//! Each handler runs one controller transaction and prints the result.

use anyhow::{Context, Result};
use fanboy_core::{LinearParams, PidParams, StaticConfig};
use fanboy_hardware::{available_port_names, FanBoyController};
use std::path::Path;
use tracing::info;

use super::commands::{Cli, FanCommands, OutputFormat, SettingsCommands};
use crate::format::{
    format_config, format_curve, format_ports, format_settings, format_status, format_success,
    format_version,
};

pub async fn handle_version(controller: &FanBoyController, format: &OutputFormat) -> Result<()> {
    let version = controller.version().await?;
    println!("{}", format_version(&version, &format.into())?);
    Ok(())
}

pub async fn handle_status(controller: &FanBoyController, format: &OutputFormat) -> Result<()> {
    let status = controller.status().await?;
    println!("{}", format_status(&status, &format.into())?);
    Ok(())
}

pub async fn handle_config(controller: &FanBoyController, format: &OutputFormat) -> Result<()> {
    let config = controller.config().await?;
    println!("{}", format_config(&config, &format.into())?);
    Ok(())
}

/// Handle fan commands
pub async fn handle_fan(controller: &FanBoyController, command: FanCommands) -> Result<()> {
    match command {
        FanCommands::Mode { fan, mode } => {
            controller.set_mode(fan, mode).await?;
            println!("{}", format_success(&format!("Fan {} mode set to {}", fan, mode)));
        }
        FanCommands::Duty { fan, duty } => {
            controller.set_duty(fan, duty).await?;
            println!("{}", format_success(&format!("Fan {} duty set to {}%", fan, duty)));
        }
        FanCommands::Map { fan, sensor } => {
            controller.set_map(fan, sensor).await?;
            println!(
                "{}",
                format_success(&format!("Fan {} mapped to sensor {}", fan, sensor))
            );
        }
        FanCommands::Linear {
            fan,
            min_temp,
            min_duty,
            max_temp,
            max_duty,
        } => {
            let params = LinearParams {
                min_temp,
                min_duty,
                max_temp,
                max_duty,
            };
            controller.set_linear(fan, params).await?;
            println!(
                "{}",
                format_success(&format!("Fan {} linear parameters updated", fan))
            );
        }
        FanCommands::Pid {
            fan,
            target,
            min_duty,
            max_duty,
        } => {
            let params = PidParams {
                target_temp: target,
                min_duty,
                max_duty,
            };
            controller.set_pid(fan, params).await?;
            println!(
                "{}",
                format_success(&format!("Fan {} PID parameters updated", fan))
            );
        }
    }
    Ok(())
}

pub async fn handle_curve(
    controller: &FanBoyController,
    settings: &StaticConfig,
    format: &OutputFormat,
) -> Result<()> {
    eprintln!(
        "Measuring fan curve, this takes about {} seconds...",
        settings.curve.estimated_duration().as_secs()
    );
    let curve = controller.fan_curve().await?;
    println!("{}", format_curve(&curve, &format.into())?);
    Ok(())
}

pub async fn handle_save(controller: &FanBoyController) -> Result<()> {
    controller.save().await?;
    println!("{}", format_success("Configuration saved to EEPROM"));
    Ok(())
}

pub async fn handle_load(controller: &FanBoyController) -> Result<()> {
    controller.load().await?;
    println!("{}", format_success("Configuration loaded from EEPROM"));
    Ok(())
}

pub async fn handle_reset(controller: &FanBoyController) -> Result<()> {
    controller.reset().await?;
    println!("{}", format_success("Controller restarting"));
    Ok(())
}

pub fn handle_ports(format: &OutputFormat) -> Result<()> {
    let ports = available_port_names()?;
    println!("{}", format_ports(&ports, &format.into())?);
    Ok(())
}

/// Handle host configuration commands
pub fn handle_settings(
    command: SettingsCommands,
    settings: &StaticConfig,
    path: &Path,
    loaded: bool,
    format: &OutputFormat,
) -> Result<()> {
    match command {
        SettingsCommands::Show => {
            let source = loaded.then_some(path);
            println!("{}", format_settings(settings, source, &format.into())?);
        }
        SettingsCommands::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            write_default_settings(path)?;
            info!("Wrote default configuration to {}", path.display());
            println!(
                "{}",
                format_success(&format!("Wrote {}", path.display()))
            );
        }
    }
    Ok(())
}

/// Write a default configuration file, creating parent directories
pub fn write_default_settings(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let content = StaticConfig::default().to_toml()?;
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Generate shell completion script
pub fn generate_completion(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_default_settings_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        write_default_settings(&path).unwrap();
        let loaded = StaticConfig::load(&path).unwrap();
        assert_eq!(loaded, StaticConfig::default());
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[serial]\ndevice = \"/dev/ttyUSB0\"\n").unwrap();

        let result = handle_settings(
            SettingsCommands::Init { force: false },
            &StaticConfig::default(),
            &path,
            true,
            &OutputFormat::Table,
        );
        assert!(result.is_err());
        assert!(std::fs::read_to_string(&path).unwrap().contains("ttyUSB0"));

        handle_settings(
            SettingsCommands::Init { force: true },
            &StaticConfig::default(),
            &path,
            true,
            &OutputFormat::Table,
        )
        .unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("ttyACM0"));
    }
}
