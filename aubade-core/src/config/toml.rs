//! Simple TOML parser for blind configuration
//!
//! This is a minimal parser that handles only the subset needed for
//! `blind.toml`. It does NOT support the full TOML spec and needs no
//! allocator.
//!
//! Supported features:
//! - Key = value pairs (string, integer, boolean)
//! - [section] headers
//! - Comments (# ...), including after values
//! - Underscore digit separators in integers
//!
//! NOT supported:
//! - Arrays and tables inside values
//! - Multi-line strings
//! - Floats and datetime values

use heapless::String as HString;

use super::types::{BlindConfig, ConfigError};
use crate::clock::TimeOfDay;
use crate::motion::TravelConfig;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Value could not be parsed for its key
    InvalidValue,
    /// Required calibration key absent
    MissingKey(&'static str),
    /// Values parsed but out of range
    Invalid(ConfigError),
}

impl From<ConfigError> for ParseError {
    fn from(e: ConfigError) -> Self {
        ParseError::Invalid(e)
    }
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Schedule,
    Travel,
    Motor,
    Clock,
    Bridge,
}

/// Required keys seen so far
#[derive(Debug, Default)]
struct Required {
    full_travel_steps: bool,
    max_speed: bool,
}

/// Parse TOML configuration into BlindConfig
///
/// `travel.full_travel_steps` and `travel.max_speed` are required; every
/// other key falls back to its default. Unknown keys are ignored.
pub fn parse_config(input: &str) -> Result<BlindConfig, ParseError> {
    let mut config = BlindConfig::new(TravelConfig::new(0, 0));
    let mut required = Required::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            section = parse_section_header(line)?;
            continue;
        }

        if let Some((key, value)) = parse_key_value(line) {
            apply_value(section, key, value, &mut config, &mut required)?;
        }
    }

    if !required.full_travel_steps {
        return Err(ParseError::MissingKey("travel.full_travel_steps"));
    }
    if !required.max_speed {
        return Err(ParseError::MissingKey("travel.max_speed"));
    }

    config.validate()?;
    Ok(config)
}

/// Parse a header line like "[travel]", allowing a trailing comment
fn parse_section_header(line: &str) -> Result<Section, ParseError> {
    let end = line.find(']').ok_or(ParseError::InvalidSection)?;
    let rest = line[end + 1..].trim();
    if !rest.is_empty() && !rest.starts_with('#') {
        return Err(ParseError::InvalidSection);
    }

    match line[1..end].trim() {
        "schedule" => Ok(Section::Schedule),
        "travel" => Ok(Section::Travel),
        "motor" => Ok(Section::Motor),
        "clock" => Ok(Section::Clock),
        "bridge" => Ok(Section::Bridge),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    // Remove inline comments
    let value = if let Some(hash_pos) = value.find('#') {
        // Make sure # is not inside a string
        let quote_count = value[..hash_pos].matches('"').count();
        if quote_count % 2 == 0 {
            value[..hash_pos].trim()
        } else {
            value
        }
    } else {
        value
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> &str {
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        &value[1..value.len() - 1]
    } else {
        // Allow unquoted strings for simple values
        value
    }
}

/// Parse an integer value, allowing `_` separators
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    let mut digits: HString<24> = HString::new();
    for c in value.chars().filter(|&c| c != '_') {
        digits.push(c).map_err(|_| ParseError::InvalidValue)?;
    }
    digits.parse().map_err(|_| ParseError::InvalidValue)
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Parse a quoted "HH:MM" time
fn parse_time(value: &str) -> Result<TimeOfDay, ParseError> {
    TimeOfDay::parse(parse_string(value)).ok_or(ParseError::InvalidValue)
}

/// Parse whole seconds into milliseconds
fn parse_seconds_as_ms(value: &str) -> Result<u32, ParseError> {
    let seconds: u32 = parse_int(value)?;
    seconds.checked_mul(1000).ok_or(ParseError::InvalidValue)
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut BlindConfig,
    required: &mut Required,
) -> Result<(), ParseError> {
    match section {
        Section::Schedule => {
            let s = &mut config.schedule;
            match key {
                "open" => s.schedule.open = parse_time(value)?,
                "close" => s.schedule.close = parse_time(value)?,
                "gradual_lead_min" => s.gradual_lead_min = parse_int(value)?,
                "check_interval_s" => s.check_interval_ms = parse_seconds_as_ms(value)?,
                _ => {} // Ignore unknown keys
            }
        }
        Section::Travel => {
            let t = &mut config.travel;
            match key {
                "full_travel_steps" => {
                    t.full_travel_steps = parse_int(value)?;
                    required.full_travel_steps = true;
                }
                "max_speed" => {
                    t.max_speed_sps = parse_int(value)?;
                    required.max_speed = true;
                }
                "acceleration" => t.accel_sps2 = parse_int(value)?,
                "gradual_percent" => t.gradual_percent = parse_int(value)?,
                "gradual_speed" => t.gradual_speed_sps = Some(parse_int(value)?),
                "move_timeout_s" => t.move_timeout_ms = parse_seconds_as_ms(value)?,
                "manual_jog_steps" => t.manual_jog_steps = parse_int(value)?,
                _ => {}
            }
        }
        Section::Motor => {
            let m = &mut config.motor;
            match key {
                "steps_per_revolution" => m.steps_per_revolution = parse_int(value)?,
                "invert_direction" => m.invert_direction = parse_bool(value)?,
                "release_when_idle" => m.release_when_idle = parse_bool(value)?,
                _ => {}
            }
        }
        Section::Clock => {
            let c = &mut config.clock;
            match key {
                "utc_offset_s" => c.utc_offset_s = parse_int(value)?,
                "dst_offset_s" => c.dst_offset_s = parse_int(value)?,
                "resync_interval_s" => c.resync_interval_ms = parse_seconds_as_ms(value)?,
                _ => {}
            }
        }
        Section::Bridge => {
            let b = &mut config.bridge;
            match key {
                "baud_rate" => b.baud_rate = parse_int(value)?,
                "heartbeat_timeout_ms" => b.heartbeat_timeout_ms = parse_int(value)?,
                "status_interval_s" => b.status_interval_ms = parse_seconds_as_ms(value)?,
                _ => {}
            }
        }
        Section::Root => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_CONFIG: &str = r#"
# Living room blind
[schedule]
open = "07:03"
close = "20:30"
gradual_lead_min = 5
check_interval_s = 10

[travel]
full_travel_steps = 90_845   # measured
max_speed = 150
acceleration = 50
gradual_percent = 5
gradual_speed = 20
move_timeout_s = 600
manual_jog_steps = 1000000

[motor]
steps_per_revolution = 2048
invert_direction = false
release_when_idle = true

[clock]
utc_offset_s = 3600
dst_offset_s = 0
resync_interval_s = 3600

[bridge]
baud_rate = 115200
heartbeat_timeout_ms = 3000
status_interval_s = 30
"#;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(parse_key_value("max_speed = 150"), Some(("max_speed", "150")));
        assert_eq!(
            parse_key_value("open = \"07:00\" # morning"),
            Some(("open", "\"07:00\""))
        );
        assert_eq!(parse_key_value("key ="), None);
        assert_eq!(parse_key_value("no equals sign"), None);
    }

    #[test]
    fn test_parse_int_with_separators() {
        assert_eq!(parse_int::<u32>("90_845"), Ok(90_845));
        assert_eq!(parse_int::<i32>("-3600"), Ok(-3600));
        assert_eq!(parse_int::<u16>("70000"), Err(ParseError::InvalidValue));
        assert_eq!(parse_int::<u16>("fast"), Err(ParseError::InvalidValue));
    }

    #[test]
    fn test_parse_section_header() {
        assert_eq!(parse_section_header("[travel]"), Ok(Section::Travel));
        assert_eq!(parse_section_header("[ clock ] # tz"), Ok(Section::Clock));
        assert_eq!(
            parse_section_header("[display]"),
            Err(ParseError::InvalidSection)
        );
        assert_eq!(
            parse_section_header("[travel"),
            Err(ParseError::InvalidSection)
        );
    }

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(FULL_CONFIG).unwrap();

        assert_eq!(config.schedule.schedule.open, TimeOfDay::new(7, 3).unwrap());
        assert_eq!(config.schedule.schedule.close, TimeOfDay::new(20, 30).unwrap());
        assert_eq!(config.schedule.check_interval_ms, 10_000);

        assert_eq!(config.travel.full_travel_steps, 90_845);
        assert_eq!(config.travel.max_speed_sps, 150);
        assert_eq!(config.travel.accel_sps2, 50);
        assert_eq!(config.travel.gradual_speed_sps, Some(20));
        assert_eq!(config.travel.move_timeout_ms, 600_000);
        assert_eq!(config.travel.manual_jog_steps, 1_000_000);

        assert!(config.motor.release_when_idle);
        assert_eq!(config.clock.dst_offset_s, 0);
        assert_eq!(config.clock.resync_interval_ms, 3_600_000);
        assert_eq!(config.bridge.status_interval_ms, 30_000);
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = parse_config("[travel]\nfull_travel_steps = 70260\nmax_speed = 150\n").unwrap();
        assert_eq!(config.travel.full_travel_steps, 70_260);
        assert_eq!(config.travel.gradual_percent, 5);
        assert_eq!(config.travel.move_timeout_ms, 600_000);
        assert_eq!(config.schedule.schedule.open, TimeOfDay::new(7, 0).unwrap());
        assert_eq!(config.schedule.schedule.close, TimeOfDay::new(20, 0).unwrap());
        assert_eq!(config.clock.utc_offset_s, 3600);
    }

    #[test]
    fn test_missing_calibration() {
        assert_eq!(
            parse_config("[travel]\nmax_speed = 150\n").unwrap_err(),
            ParseError::MissingKey("travel.full_travel_steps")
        );
        assert_eq!(
            parse_config("[travel]\nfull_travel_steps = 90845\n").unwrap_err(),
            ParseError::MissingKey("travel.max_speed")
        );
    }

    #[test]
    fn test_invalid_values() {
        let bad_time = "[schedule]\nopen = \"25:00\"\n[travel]\nfull_travel_steps = 1\nmax_speed = 1\n";
        assert_eq!(parse_config(bad_time).unwrap_err(), ParseError::InvalidValue);

        let bad_bool = "[motor]\nrelease_when_idle = yes\n";
        assert_eq!(parse_config(bad_bool).unwrap_err(), ParseError::InvalidValue);
    }

    #[test]
    fn test_validation_applies() {
        let zero = "[travel]\nfull_travel_steps = 0\nmax_speed = 150\n";
        assert_eq!(
            parse_config(zero).unwrap_err(),
            ParseError::Invalid(ConfigError::ZeroTravel)
        );
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let config = "[travel]\nfull_travel_steps = 100\nmax_speed = 10\ncolour = \"blue\"\n";
        assert!(parse_config(config).is_ok());
    }
}
