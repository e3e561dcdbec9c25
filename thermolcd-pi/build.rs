//! Build script for thermolcd-pi
//!
//! Validates the embedded thermolcd.toml at compile time so a broken
//! default configuration never ships in the binary.

use std::fs;
use std::path::Path;

/// Pin numbers must fit the BCM range of the 40-pin header
const MAX_BCM_PIN: i64 = 27;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    validate_config();
}

/// Validate thermolcd.toml
fn validate_config() {
    println!("cargo:rerun-if-changed=thermolcd.toml");

    let config_path = Path::new("thermolcd.toml");
    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read thermolcd.toml", &[e.to_string()]),
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => fail(
            "Invalid TOML syntax in thermolcd.toml",
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        ),
    };

    let mut errors = Vec::new();
    validate_display(&config, &mut errors);
    validate_sensor(&config, &mut errors);
    validate_schedule(&config, &mut errors);
    validate_pages(&config, &mut errors);

    if !errors.is_empty() {
        fail("Invalid configuration in thermolcd.toml", &errors);
    }

    println!("cargo:warning=thermolcd.toml validated successfully");
}

/// Abort the build with a boxed error listing
fn fail(title: &str, lines: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        lines
            .iter()
            .map(|line| {
                let truncated = if line.chars().count() > 62 {
                    format!("{}...", line.chars().take(59).collect::<String>())
                } else {
                    line.clone()
                };
                format!("║  • {:<62} ║", truncated)
            })
            .collect::<Vec<_>>()
            .join("\n")
    );
}

fn positive(table: &toml::Value, section: &str, key: &str, errors: &mut Vec<String>) {
    match table.get(key) {
        None => {}
        Some(toml::Value::Integer(v)) if *v > 0 => {}
        Some(_) => errors.push(format!("[{}] '{}' must be a positive integer", section, key)),
    }
}

fn check_pin(value: Option<&toml::Value>, what: &str, errors: &mut Vec<String>) {
    match value {
        Some(toml::Value::Integer(pin)) if (0..=MAX_BCM_PIN).contains(pin) => {}
        Some(_) => errors.push(format!("{} must be a BCM pin 0-{}", what, MAX_BCM_PIN)),
        None => errors.push(format!("{} is missing", what)),
    }
}

fn validate_display(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(display) = config.get("display") else {
        return;
    };

    match display.get("kind").and_then(|k| k.as_str()) {
        None | Some("hd44780") => {
            if let Some(pins) = display.get("pins") {
                check_pin(pins.get("rs"), "[display.pins] 'rs'", errors);
                check_pin(pins.get("enable"), "[display.pins] 'enable'", errors);
                if pins.get("rw").is_some() {
                    check_pin(pins.get("rw"), "[display.pins] 'rw'", errors);
                }
                match pins.get("data").and_then(|d| d.as_array()) {
                    Some(data) if data.len() == 4 || data.len() == 8 => {
                        for pin in data {
                            check_pin(Some(pin), "[display.pins] 'data' entry", errors);
                        }
                    }
                    Some(_) => errors.push("[display.pins] 'data' needs 4 or 8 pins".into()),
                    None => {}
                }
            }
        }
        Some("console") => {}
        Some(other) => errors.push(format!(
            "[display] kind '{}' must be 'hd44780' or 'console'",
            other
        )),
    }

    if let Some(toml::Value::Integer(rows)) = display.get("rows") {
        if !(2..=4).contains(rows) {
            errors.push("[display] 'rows' must be 2-4".into());
        }
    }
    if let Some(toml::Value::Integer(columns)) = display.get("columns") {
        if !(1..=40).contains(columns) {
            errors.push("[display] 'columns' must be 1-40".into());
        }
    }
}

fn validate_sensor(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(sensor) = config.get("sensor") else {
        return;
    };

    match sensor.get("kind").and_then(|k| k.as_str()) {
        None | Some("dht22") => {
            if sensor.get("pin").is_some() {
                check_pin(sensor.get("pin"), "[sensor] 'pin'", errors);
            }
        }
        Some("simulated") => {}
        Some(other) => errors.push(format!(
            "[sensor] kind '{}' must be 'dht22' or 'simulated'",
            other
        )),
    }
    positive(sensor, "sensor", "retries", errors);
    positive(sensor, "sensor", "poll_ms", errors);
}

fn validate_schedule(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(schedule) = config.get("schedule") else {
        return;
    };

    for key in ["tick_ms", "scroll_ms", "refresh_ms"] {
        positive(schedule, "schedule", key, errors);
    }

    if let Some(rotation) = schedule.get("rotation") {
        let valid = rotation.as_table().is_some_and(|t| {
            t.len() == 1
                && t.iter().all(|(k, v)| {
                    matches!(k.as_str(), "after_scrolls" | "every_ms")
                        && v.as_integer().is_some_and(|n| n > 0)
                })
        });
        if !valid {
            errors.push(
                "[schedule] 'rotation' must be { after_scrolls = n } or { every_ms = n }".into(),
            );
        }
    }
}

fn validate_pages(config: &toml::Value, errors: &mut Vec<String>) {
    let pages = match config.get("page") {
        Some(toml::Value::Array(pages)) if !pages.is_empty() => pages,
        _ => {
            errors.push("Missing [[page]] section - at least one page is required".into());
            return;
        }
    };

    if pages.len() > 8 {
        errors.push("At most 8 [[page]] entries are supported".into());
    }

    for (i, page) in pages.iter().enumerate() {
        match page.get("title").and_then(|t| t.as_str()) {
            Some(title) if !title.is_empty() => {}
            _ => errors.push(format!("[[page]] #{} missing 'title'", i + 1)),
        }
        if let Some(source) = page.get("source").and_then(|s| s.as_str()) {
            if !["sensor", "system"].contains(&source) {
                errors.push(format!(
                    "[[page]] #{} source must be 'sensor' or 'system'",
                    i + 1
                ));
            }
        }
    }
}
