//! Output formatting utilities.

use colored::Colorize;

use crate::cli::OutputFormat;

/// Prints a success message.
pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Prints an error message.
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Prints a warning message.
pub fn warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

/// Outputs a single item.
pub fn output_single<T: serde::Serialize>(item: &T, format: OutputFormat) -> crate::CliResult<()> {
    match format {
        OutputFormat::Table => {
            let json = serde_json::to_value(item)?;
            print_value(&json, 0);
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(item)?;
            println!("{json}");
        }
        OutputFormat::Quiet => {}
    }
    Ok(())
}

/// Prints a JSON value as indented key/value lines.
fn print_value(value: &serde_json::Value, indent: usize) {
    let prefix = "  ".repeat(indent);

    match value {
        serde_json::Value::Array(items) => {
            for item in items {
                if item.is_object() || item.is_array() {
                    println!("{prefix}-");
                    print_value(item, indent + 1);
                } else {
                    println!("{prefix}- {}", scalar(item));
                }
            }
        }
        serde_json::Value::Object(map) => {
            for (key, val) in map {
                if val.is_object() || val.is_array() {
                    println!("{prefix}{}:", key.bold());
                    print_value(val, indent + 1);
                } else {
                    println!("{prefix}{}: {}", key.bold(), scalar(val));
                }
            }
        }
        scalar_value => println!("{prefix}{}", scalar(scalar_value)),
    }
}

fn scalar(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "-".dimmed().to_string(),
        serde_json::Value::Bool(true) => "yes".green().to_string(),
        serde_json::Value::Bool(false) => "no".yellow().to_string(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
