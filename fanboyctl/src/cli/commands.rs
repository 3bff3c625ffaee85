//! CLI command and subcommand definitions

use clap::{Parser, Subcommand};
use fanboy_core::FanMode;

use crate::format::parse_temperature;

/// FanBoy Controller CLI
#[derive(Parser, Debug)]
#[command(name = "fanboyctl")]
#[command(version, about = "FanBoy fan controller CLI", long_about = None)]
pub struct Cli {
    /// Serial device (overrides config file and FANBOY_DEVICE)
    #[arg(short, long, global = true)]
    pub device: Option<String>,

    /// Per-read timeout in milliseconds (overrides config file)
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Log every frame sent and received
    #[arg(long, global = true)]
    pub debug_uart: bool,

    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Don't load config file
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Config file path (default: ~/.config/fanboy/config.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty table output
    Table,
    /// JSON output
    Json,
}

impl From<&OutputFormat> for crate::format::OutputFormat {
    fn from(format: &OutputFormat) -> Self {
        match format {
            OutputFormat::Table => crate::format::OutputFormat::Table,
            OutputFormat::Json => crate::format::OutputFormat::Json,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show firmware version and build
    Version,

    /// Show fan speeds, duties and temperatures
    Status,

    /// Show the controller's active configuration
    Config,

    /// Fan control commands
    Fan {
        #[command(subcommand)]
        command: FanCommands,
    },

    /// Measure the duty-vs-RPM curve of every fan (takes about a minute)
    Curve,

    /// Persist the active configuration to EEPROM
    Save,

    /// Reload the last saved configuration from EEPROM
    Load,

    /// Restart the controller
    Reset,

    /// List serial ports present on this machine
    Ports,

    /// Host configuration file commands
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum FanCommands {
    /// Select the control mode of a fan
    Mode {
        /// Fan ID (0-3)
        fan: u8,
        /// manual, linear or pid
        mode: FanMode,
    },

    /// Set the manual duty of a fan
    Duty {
        /// Fan ID (0-3)
        fan: u8,
        /// Duty percentage (0-100)
        duty: u8,
    },

    /// Bind a fan to a temperature sensor
    Map {
        /// Fan ID (0-3)
        fan: u8,
        /// Sensor ID (0-1)
        sensor: u8,
    },

    /// Set the linear curve of a fan
    Linear {
        /// Fan ID (0-3)
        fan: u8,
        /// Low temperature breakpoint in degrees (e.g. 25 or 27.5)
        #[arg(long, value_parser = parse_temperature)]
        min_temp: u16,
        /// Duty at or below the low breakpoint
        #[arg(long)]
        min_duty: u8,
        /// High temperature breakpoint in degrees
        #[arg(long, value_parser = parse_temperature)]
        max_temp: u16,
        /// Duty at or above the high breakpoint
        #[arg(long)]
        max_duty: u8,
    },

    /// Set the target-temperature parameters of a fan
    Pid {
        /// Fan ID (0-3)
        fan: u8,
        /// Target temperature in degrees
        #[arg(long, value_parser = parse_temperature)]
        target: u16,
        /// Lower duty clamp
        #[arg(long)]
        min_duty: u8,
        /// Upper duty clamp
        #[arg(long)]
        max_duty: u8,
    },
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Show the effective host configuration
    Show,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_fan_duty() {
        let cli = Cli::try_parse_from(["fanboyctl", "fan", "duty", "2", "42"]).unwrap();
        match cli.command {
            Commands::Fan {
                command: FanCommands::Duty { fan, duty },
            } => {
                assert_eq!(fan, 2);
                assert_eq!(duty, 42);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_fan_mode() {
        let cli = Cli::try_parse_from(["fanboyctl", "fan", "mode", "0", "linear"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Fan {
                command: FanCommands::Mode {
                    fan: 0,
                    mode: FanMode::Linear
                }
            }
        ));

        assert!(Cli::try_parse_from(["fanboyctl", "fan", "mode", "0", "turbo"]).is_err());
    }

    #[test]
    fn test_parse_linear_temperatures() {
        let cli = Cli::try_parse_from([
            "fanboyctl",
            "fan",
            "linear",
            "1",
            "--min-temp",
            "25",
            "--min-duty",
            "30",
            "--max-temp",
            "42.5",
            "--max-duty",
            "90",
        ])
        .unwrap();
        match cli.command {
            Commands::Fan {
                command:
                    FanCommands::Linear {
                        min_temp, max_temp, ..
                    },
            } => {
                assert_eq!(min_temp, 2500);
                assert_eq!(max_temp, 4250);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "fanboyctl",
            "status",
            "--device",
            "/dev/ttyUSB1",
            "-f",
            "json",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.device.as_deref(), Some("/dev/ttyUSB1"));
        assert!(matches!(cli.format, Some(OutputFormat::Json)));
        assert!(cli.verbose);
    }
}
