//! Output formatting utilities for the CLI
//!
//! Provides table and JSON formatting with colors.

use anyhow::Result;
use colored::*;
use fanboy_core::{
    Configuration, FanCurve, FanMode, StaticConfig, Status, VersionInfo, NCONN, NUM_FAN,
};
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

/// Output format options
#[derive(Debug, Clone)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Render a ×100 fixed-point temperature
fn centi(value: u16) -> String {
    format!("{}.{:02}", value / 100, value % 100)
}

fn rpm_cell(rpm: u16) -> String {
    match rpm {
        NCONN => "n/c".dimmed().to_string(),
        0 => "0".red().to_string(),
        rpm => rpm.to_string().green().to_string(),
    }
}

/// Parse a temperature in degrees (`"25"`, `"27.5"`) into hundredths
pub fn parse_temperature(s: &str) -> std::result::Result<u16, String> {
    let degrees: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a temperature", s))?;
    let hundredths = (degrees * 100.0).round();
    if !(0.0..NCONN as f64).contains(&hundredths) {
        return Err(format!(
            "temperature must be between 0 and {}, got {}",
            centi(NCONN - 1),
            s
        ));
    }
    Ok(hundredths as u16)
}

/// Format firmware version
pub fn format_version(info: &VersionInfo, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(info)?),
        OutputFormat::Table => Ok(format!(
            "{}\nVersion: {}\nBuild: {}",
            "FanBoy Firmware".bold(),
            info.version.cyan(),
            info.build.cyan()
        )),
    }
}

/// Format live fan and sensor status
pub fn format_status(status: &Status, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(status)?),
        OutputFormat::Table => {
            #[derive(Tabled)]
            struct FanRow {
                #[tabled(rename = "Fan ID")]
                fan_id: String,
                #[tabled(rename = "RPM")]
                rpm: String,
                #[tabled(rename = "Duty %")]
                duty: String,
            }

            #[derive(Tabled)]
            struct SensorRow {
                #[tabled(rename = "Sensor ID")]
                sensor_id: String,
                #[tabled(rename = "Temperature")]
                temp: String,
            }

            let fans: Vec<FanRow> = status
                .fans
                .iter()
                .enumerate()
                .map(|(id, fan)| FanRow {
                    fan_id: id.to_string(),
                    rpm: rpm_cell(fan.rpm),
                    duty: if fan.duty > 0 {
                        format!("{}%", fan.duty).cyan().to_string()
                    } else {
                        "0%".dimmed().to_string()
                    },
                })
                .collect();

            let sensors: Vec<SensorRow> = (0..status.temps.len())
                .map(|id| SensorRow {
                    sensor_id: id.to_string(),
                    temp: match status.temp(id) {
                        Some(t) => centi(t).yellow().to_string(),
                        None => "n/c".dimmed().to_string(),
                    },
                })
                .collect();

            let fan_table = Table::new(fans).with(Style::rounded()).to_string();
            let sensor_table = Table::new(sensors).with(Style::rounded()).to_string();
            Ok(format!(
                "{}\n{}\n{}\n{}",
                "Fan Status:".bold(),
                fan_table,
                "Sensors:".bold(),
                sensor_table
            ))
        }
    }
}

/// Format the controller's active configuration
pub fn format_config(config: &Configuration, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(config)?),
        OutputFormat::Table => {
            #[derive(Tabled)]
            struct ConfigRow {
                #[tabled(rename = "Fan ID")]
                fan_id: String,
                #[tabled(rename = "Mode")]
                mode: String,
                #[tabled(rename = "Duty %")]
                duty: u8,
                #[tabled(rename = "Sensor")]
                sensor: u8,
                #[tabled(rename = "Linear")]
                linear: String,
                #[tabled(rename = "PID")]
                pid: String,
            }

            let unit = config.temp_unit.symbol();
            let rows: Vec<ConfigRow> = config
                .fans
                .iter()
                .enumerate()
                .map(|(id, fan)| {
                    let mode = fan.mode.to_string();
                    ConfigRow {
                        fan_id: id.to_string(),
                        mode: if fan.mode == FanMode::Manual {
                            mode.cyan().to_string()
                        } else {
                            mode.yellow().to_string()
                        },
                        duty: fan.duty,
                        sensor: fan.sensor,
                        linear: format!(
                            "{}%@{}{} .. {}%@{}{}",
                            fan.linear.min_duty,
                            centi(fan.linear.min_temp),
                            unit,
                            fan.linear.max_duty,
                            centi(fan.linear.max_temp),
                            unit
                        ),
                        pid: format!(
                            "{}{} [{}-{}%]",
                            centi(fan.pid.target_temp),
                            unit,
                            fan.pid.min_duty,
                            fan.pid.max_duty
                        ),
                    }
                })
                .collect();

            let table = Table::new(rows).with(Style::rounded()).to_string();
            Ok(format!(
                "{} (unit: {})\n{}",
                "Controller Configuration:".bold(),
                unit,
                table
            ))
        }
    }
}

/// Format a measured fan curve, one column per fan
pub fn format_curve(curve: &FanCurve, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(curve)?),
        OutputFormat::Table => {
            let mut builder = tabled::builder::Builder::default();
            let mut header = vec!["Duty %".to_string()];
            header.extend((0..NUM_FAN).map(|id| format!("Fan {}", id)));
            builder.push_record(header);

            for point in &curve.points {
                let mut record = vec![format!("{}%", point.duty)];
                record.extend(point.rpm.iter().map(|rpm| rpm_cell(*rpm)));
                builder.push_record(record);
            }

            let table = builder.build().with(Style::rounded()).to_string();
            Ok(format!("{}\n{}", "Fan Curve (RPM):".bold(), table))
        }
    }
}

/// Format the effective host configuration
pub fn format_settings(
    settings: &StaticConfig,
    source: Option<&Path>,
    format: &OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(settings)?),
        OutputFormat::Table => {
            let source = match source {
                Some(path) => path.display().to_string(),
                None => "built-in defaults".to_string(),
            };
            let mut output = format!("{}\n", "Host Configuration:".bold());
            output.push_str(&format!("{:<22} {}\n", "Source", source.cyan()));
            output.push_str(&format!("{:<22} {}\n", "Device", settings.serial.device));
            output.push_str(&format!(
                "{:<22} {} ms\n",
                "Read timeout", settings.serial.read_timeout_ms
            ));
            output.push_str(&format!(
                "{:<22} {}\n",
                "UART debug", settings.serial.debug_uart
            ));
            output.push_str(&format!("{:<22} {}\n", "Retries", settings.query.retries));
            output.push_str(&format!(
                "{:<22} {}\n",
                "Curve retries", settings.query.curve_retries
            ));
            output.push_str(&format!(
                "{:<22} {} s",
                "Curve duration",
                settings.curve.estimated_duration().as_secs()
            ));
            Ok(output)
        }
    }
}

/// Format the list of serial ports
pub fn format_ports(ports: &[String], format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(ports)?),
        OutputFormat::Table => {
            if ports.is_empty() {
                return Ok("No serial ports found".dimmed().to_string());
            }
            let mut output = "Serial Ports:".bold().to_string();
            for port in ports {
                output.push('\n');
                output.push_str(&format!("  {}", port.cyan()));
            }
            Ok(output)
        }
    }
}

/// Format success message
pub fn format_success(message: &str) -> String {
    format!("{} {}", "✓".green().bold(), message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fanboy_core::{CurvePoint, FanStatus};

    #[test]
    fn test_format_success() {
        let message = format_success("Operation completed");
        assert!(message.contains("✓"));
        assert!(message.contains("Operation completed"));
    }

    #[test]
    fn test_parse_temperature() {
        assert_eq!(parse_temperature("25"), Ok(2500));
        assert_eq!(parse_temperature("27.5"), Ok(2750));
        assert_eq!(parse_temperature(" 31.456 "), Ok(3146));
        assert_eq!(parse_temperature("0"), Ok(0));
        assert!(parse_temperature("-1").is_err());
        assert!(parse_temperature("655.35").is_err());
        assert!(parse_temperature("warm").is_err());
        assert!(parse_temperature("NaN").is_err());
    }

    #[test]
    fn test_centi() {
        assert_eq!(centi(3150), "31.50");
        assert_eq!(centi(5), "0.05");
    }

    #[test]
    fn test_format_status_json() {
        let mut status = Status::default();
        status.fans[0] = FanStatus {
            duty: 42,
            rpm: 1234,
        };
        status.temps[1] = 2875;

        let result = format_status(&status, &OutputFormat::Json).unwrap();
        assert!(result.contains("\"duty\": 42"));
        assert!(result.contains("1234"));
        assert!(result.contains("2875"));
    }

    #[test]
    fn test_format_status_table_marks_disconnected() {
        let mut status = Status::default();
        status.fans[2] = FanStatus {
            duty: 60,
            rpm: 900,
        };
        status.temps[0] = 3150;

        let result = format_status(&status, &OutputFormat::Table).unwrap();
        assert!(result.contains("900"));
        assert!(result.contains("60%"));
        assert!(result.contains("31.50"));
        assert!(result.contains("n/c"));
    }

    #[test]
    fn test_format_config_table() {
        let mut config = Configuration::default();
        config.fans[1].mode = FanMode::Linear;

        let result = format_config(&config, &OutputFormat::Table).unwrap();
        assert!(result.contains("linear"));
        assert!(result.contains("manual"));
        assert!(result.contains("20.00C"));
    }

    #[test]
    fn test_format_curve_table() {
        let mut curve = FanCurve::default();
        curve.points[0] = CurvePoint {
            duty: 100,
            rpm: [2000, NCONN, 1500, 0],
        };

        let result = format_curve(&curve, &OutputFormat::Table).unwrap();
        assert!(result.contains("Fan 3"));
        assert!(result.contains("2000"));
        assert!(result.contains("100%"));
    }

    #[test]
    fn test_format_version_json() {
        let info = VersionInfo::new("0.1.0", "Jan 01 2026 12:00:00");
        let result = format_version(&info, &OutputFormat::Json).unwrap();
        assert!(result.contains("\"version\": \"0.1.0\""));
        assert!(result.contains("Jan 01 2026"));
    }

    #[test]
    fn test_format_settings_defaults() {
        let result =
            format_settings(&StaticConfig::default(), None, &OutputFormat::Table).unwrap();
        assert!(result.contains("/dev/ttyACM0"));
        assert!(result.contains("built-in defaults"));
    }

    #[test]
    fn test_format_ports_empty() {
        let result = format_ports(&[], &OutputFormat::Table).unwrap();
        assert!(result.contains("No serial ports"));
    }
}
