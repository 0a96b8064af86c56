//! Build script for aubade-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates blind.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate blind.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=blind.toml");

    let config_path = Path::new("blind.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: blind.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a blind.toml configuration file with     ║\n\
            ║  at least the [travel] calibration of your blind.                ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read blind.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in blind.toml                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_travel(&config, &mut errors);
    validate_schedule(&config, &mut errors);
    validate_sections(&config, &mut errors);
    report_errors("Invalid blind configuration", &errors);

    warn_slow_travel(&config);

    println!("cargo:warning=blind.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn report_errors(title: &str, errors: &[String]) {
    if errors.is_empty() {
        return;
    }

    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

fn int(table: &toml::Value, key: &str) -> Option<i64> {
    table.get(key).and_then(|v| v.as_integer())
}

/// Check an optional integer key against a range
fn check_range(
    section: &str,
    table: &toml::Value,
    key: &str,
    min: i64,
    max: i64,
    errors: &mut Vec<String>,
) {
    match table.get(key) {
        None => {}
        Some(toml::Value::Integer(v)) if (min..=max).contains(v) => {}
        Some(toml::Value::Integer(_)) => {
            errors.push(format!("[{}] {} must be {}-{}", section, key, min, max));
        }
        Some(_) => errors.push(format!("[{}] {} must be an integer", section, key)),
    }
}

/// The travel calibration has no default
fn validate_travel(config: &toml::Value, errors: &mut Vec<String>) {
    let travel = match config.get("travel") {
        Some(t @ toml::Value::Table(_)) => t,
        Some(_) => {
            errors.push("[travel] must be a table".to_string());
            return;
        }
        None => {
            errors.push("Missing [travel] section".to_string());
            return;
        }
    };

    for key in ["full_travel_steps", "max_speed"] {
        if travel.get(key).is_none() {
            errors.push(format!("[travel] missing '{}'", key));
        }
    }

    check_range("travel", travel, "full_travel_steps", 1, i32::MAX as i64, errors);
    check_range("travel", travel, "max_speed", 1, u16::MAX as i64, errors);
    check_range("travel", travel, "acceleration", 1, u16::MAX as i64, errors);
    check_range("travel", travel, "gradual_percent", 0, 100, errors);
    check_range("travel", travel, "gradual_speed", 1, u16::MAX as i64, errors);
    check_range("travel", travel, "move_timeout_s", 1, 4_000_000, errors);
    check_range("travel", travel, "manual_jog_steps", 1, i32::MAX as i64, errors);
}

fn validate_schedule(config: &toml::Value, errors: &mut Vec<String>) {
    let schedule = match config.get("schedule") {
        Some(s) => s,
        None => return,
    };

    for key in ["open", "close"] {
        match schedule.get(key) {
            None => {}
            Some(toml::Value::String(s)) if is_valid_time(s) => {}
            Some(_) => errors.push(format!("[schedule] {} must be \"HH:MM\"", key)),
        }
    }

    check_range("schedule", schedule, "gradual_lead_min", 0, 59, errors);
    check_range("schedule", schedule, "check_interval_s", 1, 3600, errors);
}

fn is_valid_time(s: &str) -> bool {
    let Some((h, m)) = s.split_once(':') else {
        return false;
    };
    if h.len() != 2 || m.len() != 2 {
        return false;
    }
    matches!(
        (h.parse::<u8>(), m.parse::<u8>()),
        (Ok(h), Ok(m)) if h < 24 && m < 60
    )
}

fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    if let Some(motor) = config.get("motor") {
        check_range("motor", motor, "steps_per_revolution", 1, u16::MAX as i64, errors);
    }
    if let Some(clock) = config.get("clock") {
        check_range("clock", clock, "utc_offset_s", -14 * 3600, 14 * 3600, errors);
        check_range("clock", clock, "dst_offset_s", 0, 7200, errors);
        check_range("clock", clock, "resync_interval_s", 1, 7 * 24 * 3600, errors);
    }
    if let Some(bridge) = config.get("bridge") {
        check_range("bridge", bridge, "baud_rate", 1200, 3_000_000, errors);
        check_range("bridge", bridge, "heartbeat_timeout_ms", 1, 600_000, errors);
        check_range("bridge", bridge, "status_interval_s", 1, 3600, errors);
    }
}

/// A full-travel move that cannot finish before the timeout is not an
/// error, but the blind will stop short every time
fn warn_slow_travel(config: &toml::Value) {
    let Some(travel) = config.get("travel") else {
        return;
    };
    let (Some(steps), Some(speed)) = (int(travel, "full_travel_steps"), int(travel, "max_speed"))
    else {
        return;
    };
    let timeout_s = int(travel, "move_timeout_s").unwrap_or(600);

    if speed > 0 && steps / speed >= timeout_s {
        println!(
            "cargo:warning=full travel takes about {} s at {} steps/s, longer than the {} s move timeout",
            steps / speed,
            speed,
            timeout_s
        );
    }
}
