//! Build script for horologe-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates clock.toml at compile time
//! - Emits the validated values as Rust constants

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Largest step count that keeps `steps * 360` inside `i32`
const MAX_STEPS_PER_REVOLUTION: i64 = (i32::MAX / 360) as i64;

/// (key, min, max) for every `[motion]` field
const MOTION_FIELDS: &[(&str, i64, i64)] = &[
    ("steps_per_revolution", 1, MAX_STEPS_PER_REVOLUTION),
    ("tick_period_us", 50, 10_000),
    ("hand_zero_delay", 0, u16::MAX as i64),
    ("offset_delay", 0, u16::MAX as i64),
];

/// (key, min, max) for every `[homing]` field
const HOMING_FIELDS: &[(&str, i64, i64)] = &[
    ("escape_degrees", -360, 360),
    ("coarse_step", 1, 360),
    ("timeout_ms", 1, i32::MAX as i64),
    ("coarse_poll_ms", 1, 60_000),
    ("backoff_poll_ms", 1, 60_000),
    ("approach_poll_ms", 1, 60_000),
    ("settle_poll_ms", 1, 60_000),
    ("twelve_coarse_poll_ms", 1, 60_000),
];

fn main() {
    setup_linker();
    let config = validate_config();
    generate_constants(&config);
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

/// Validate clock.toml and return the parsed document
fn validate_config() -> toml::Value {
    println!("cargo:rerun-if-changed=clock.toml");

    let config_path = Path::new("clock.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: clock.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a clock.toml configuration file.          ║\n\
            ║  Please create one in the horologe-firmware directory.           ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read clock.toml                                ║\n\
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
                ║  ERROR: Invalid TOML syntax in clock.toml                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_section(&config, "motion", MOTION_FIELDS, &mut errors);
    validate_section(&config, "homing", HOMING_FIELDS, &mut errors);

    // Poll intervals must fit inside the phase deadline
    if let Some(timeout) = get_int(&config, "homing", "timeout_ms") {
        for (key, _, _) in HOMING_FIELDS.iter().filter(|(k, _, _)| k.ends_with("_poll_ms")) {
            if let Some(poll) = get_int(&config, "homing", key) {
                if poll > timeout {
                    errors.push(format!("[homing] {} exceeds timeout_ms", key));
                }
            }
        }
    }

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid configuration in clock.toml                      ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=clock.toml validated successfully");
    config
}

/// Check that a section exists and every field is an integer in range
fn validate_section(
    config: &toml::Value,
    section: &str,
    fields: &[(&str, i64, i64)],
    errors: &mut Vec<String>,
) {
    let table = match config.get(section) {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push(format!("[{}] must be a table", section));
            return;
        }
        None => {
            errors.push(format!("Missing [{}] section", section));
            return;
        }
    };

    for (key, min, max) in fields {
        match table.get(*key) {
            Some(toml::Value::Integer(v)) => {
                if v < min || v > max {
                    errors.push(format!("[{}] {} must be {}-{}", section, key, min, max));
                }
            }
            Some(_) => errors.push(format!("[{}] {} must be an integer", section, key)),
            None => errors.push(format!("[{}] missing '{}'", section, key)),
        }
    }

    for key in table.keys() {
        if !fields.iter().any(|(k, _, _)| k == key) {
            errors.push(format!("[{}] unknown key '{}'", section, key));
        }
    }
}

fn get_int(config: &toml::Value, section: &str, key: &str) -> Option<i64> {
    config.get(section)?.get(key)?.as_integer()
}

/// Write clock_config.rs with the validated values
fn generate_constants(config: &toml::Value) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let mut f = File::create(out_dir.join("clock_config.rs")).unwrap();

    let field = |section: &str, key: &str| get_int(config, section, key).unwrap();

    writeln!(f, "/// Motion parameters from clock.toml").unwrap();
    writeln!(f, "pub const MOTION: MotionConfig = MotionConfig {{").unwrap();
    for (key, _, _) in MOTION_FIELDS {
        writeln!(f, "    {}: {},", key, field("motion", key)).unwrap();
    }
    writeln!(f, "}};").unwrap();

    writeln!(f, "/// Homing parameters from clock.toml").unwrap();
    writeln!(f, "pub const HOMING: HomingConfig = HomingConfig {{").unwrap();
    for (key, _, _) in HOMING_FIELDS {
        writeln!(f, "    {}: {},", key, field("homing", key)).unwrap();
    }
    writeln!(f, "}};").unwrap();
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
