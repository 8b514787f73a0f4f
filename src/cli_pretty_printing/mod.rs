//! CLI Pretty Printing Module
//!
//! Every line mycnf prints outside the editor goes through this module, so
//! colours and the quiet flag are handled in one place.
//!
//! # Color Scheme
//! Colours come from [`Config::colourscheme`](crate::config::Config) roles:
//! - informational: section headers and field names
//! - warning: disabled fields, non-fatal problems
//! - success: confirmations
//! - error: failures
//! - question: prompts
//! - statement: everything else
//!
//! # Usage
//! ```rust
//! use mycnf::cli_pretty_printing::{success, warning};
//!
//! println!("{}", success("Operation completed successfully"));
//! println!("{}", warning("Please check your input"));
//! ```

#[cfg(test)]
mod tests;

use std::path::Path;

use ansi_term::Colour;
use text_io::read;

use crate::error::MycnfError;
use crate::model::ConfigModel;
use crate::schema::{FieldKind, FieldSchema, Schema, SchemaSection};
use crate::values::{display_value, FieldValue};

/// Message shown after a successful save.
pub const SAVED_MESSAGE: &str = "Configurations saved successfully.";

/// Parse RGB string in format "r,g,b" to RGB values.
///
/// Spaces around numbers are allowed.
///
/// # Examples
/// ```
/// use mycnf::cli_pretty_printing::parse_rgb;
///
/// assert_eq!(parse_rgb("255,0,0"), Some((255, 0, 0)));
/// assert_eq!(parse_rgb("0, 255, 0"), Some((0, 255, 0)));
/// assert!(parse_rgb("0,0").is_none());
/// assert!(parse_rgb("300,0,0").is_none());
/// ```
pub fn parse_rgb(rgb: &str) -> Option<(u8, u8, u8)> {
    let parts: Vec<&str> = rgb.split(',').collect();
    if parts.len() != 3 {
        return None;
    }

    let r = parts[0].trim().parse::<u8>().ok()?;
    let g = parts[1].trim().parse::<u8>().ok()?;
    let b = parts[2].trim().parse::<u8>().ok()?;

    Some((r, g, b))
}

/// Colors a string based on its role using RGB values from the config.
///
/// Falls back to the statement colour, and to plain white if that is
/// missing or malformed too.
fn color_string(text: &str, role: &str) -> String {
    let config = crate::config::get_config();

    let rgb = config
        .colourscheme
        .get(role)
        .and_then(|c| parse_rgb(c))
        .or_else(|| {
            config
                .colourscheme
                .get("statement")
                .and_then(|c| parse_rgb(c))
        });

    match rgb {
        Some((r, g, b)) => Colour::RGB(r, g, b).bold().paint(text).to_string(),
        None => Colour::White.paint(text).to_string(),
    }
}

/// Colors text based on its role, defaulting to statement color if no role is specified.
///
/// # Examples
/// ```
/// use mycnf::cli_pretty_printing::statement;
///
/// let info = statement("Status update", Some("informational"));
/// let neutral = statement("Regular text", None);
/// assert!(info.contains("Status update"));
/// assert!(neutral.contains("Regular text"));
/// ```
pub fn statement(text: &str, role: Option<&str>) -> String {
    match role {
        Some(r) => color_string(text, r),
        None => color_string(text, "statement"),
    }
}

/// Colors text using the warning color from config.
pub fn warning(text: &str) -> String {
    color_string(text, "warning")
}

/// Colors text using the success color from config.
pub fn success(text: &str) -> String {
    color_string(text, "success")
}

/// Colors text using the error color from config.
pub fn error(text: &str) -> String {
    color_string(text, "error")
}

/// Colors text using the question color from config.
fn question(text: &str) -> String {
    color_string(text, "question")
}

fn quiet() -> bool {
    crate::config::get_config().quiet
}

/// One line of `show` output, without colours.
pub(crate) fn field_line(field: &FieldSchema, value: &FieldValue, active: bool) -> String {
    let mut line = format!(
        "  {:<36} {}",
        format!("{} ({})", field.label, field.key),
        display_value(value, &field.kind)
    );
    if field.kind == FieldKind::Static {
        line = format!("  {}", field.tooltip);
    } else if !active {
        line.push_str("  [disabled]");
    } else if field.required {
        line.push_str("  [required]");
    }
    line
}

fn print_schema_section(model: &ConfigModel, section: &SchemaSection) {
    println!("{}", statement(&format!("[{}]", section.name), Some("informational")));
    for field in &section.fields {
        let value = model
            .value(&section.name, &field.key)
            .unwrap_or(FieldValue::Static);
        let active = match field.kind {
            FieldKind::Raw => value.as_bool().unwrap_or(false),
            _ => model
                .get(&section.name, &field.key)
                .map(|e| e.active || field.required)
                .unwrap_or(false),
        };
        let line = field_line(field, &value, active);
        if active || field.kind == FieldKind::Static {
            println!("{}", statement(&line, None));
        } else {
            println!("{}", warning(&line));
        }
    }
    println!();
}

/// Prints every schema field of `model`, or only those of `section`.
pub fn show_model(model: &ConfigModel, section: Option<&str>) -> Result<(), MycnfError> {
    println!(
        "{} {}\n",
        statement("Option file:", None),
        statement(&model.path().display().to_string(), Some("informational"))
    );
    match section {
        Some(name) => {
            let schema_section =
                model
                    .schema()
                    .section(name)
                    .ok_or_else(|| MycnfError::UnknownField {
                        section: name.to_string(),
                        key: "*".to_string(),
                    })?;
            print_schema_section(model, schema_section);
        }
        None => {
            for schema_section in model.schema().sections() {
                print_schema_section(model, schema_section);
            }
        }
    }
    Ok(())
}

/// Prints the model as a JSON object of section -> key -> { value, active }.
pub fn show_model_json(model: &ConfigModel) -> Result<(), MycnfError> {
    let mut root = serde_json::Map::new();
    for section in model.sections() {
        let mut entries = serde_json::Map::new();
        for entry in section.entries() {
            entries.insert(
                entry.key.clone(),
                serde_json::json!({ "value": entry.value, "active": entry.active }),
            );
        }
        root.insert(section.name().to_string(), serde_json::Value::Object(entries));
    }
    println!("{}", serde_json::to_string_pretty(&serde_json::Value::Object(root))?);
    Ok(())
}

/// Prints a single stored value, as scripts expect it: raw and uncoloured.
pub fn print_value(value: &str) {
    println!("{}", value);
}

/// Lists every field the schema declares.
pub fn print_schema(schema: &Schema) {
    for section in schema.sections() {
        let marker = if section.required { " (required)" } else { "" };
        println!(
            "{}",
            statement(&format!("[{}]{}", section.name, marker), Some("informational"))
        );
        for field in &section.fields {
            let bounds = match &field.kind {
                FieldKind::Range { min, max } => format!(" {}..={}", min, max),
                FieldKind::ByteSize { min, max } => format!(
                    " {}..={}",
                    crate::units::convert_to_ini(*min),
                    crate::units::convert_to_ini(*max)
                ),
                FieldKind::Select { options } | FieldKind::MultiSelect { options } => {
                    format!(" [{}]", options.join("|"))
                }
                _ => String::new(),
            };
            println!(
                "  {:<34} {:<12} default={:?}{}{}",
                field.key,
                field.kind.type_name(),
                field.default,
                bounds,
                if field.required { "" } else { " optional" }
            );
        }
        println!();
    }
}

/// Confirms a successful save.
pub fn saved_successfully(path: &Path) {
    if quiet() {
        return;
    }
    println!(
        "{} {}",
        success(SAVED_MESSAGE),
        statement(&format!("({})", path.display()), None)
    );
}

/// The one notification shown when anything about saving went wrong.
pub fn failed_to_save(err: &MycnfError) {
    eprintln!("{}", error(&format!("⛔️ {}", err)));
}

/// Reports an error that stops the program.
pub fn program_failed(err: &MycnfError) {
    eprintln!("{}", error(&format!("⛔️ mycnf failed: {}", err)));
}

/// Reports the new state of a toggled key.
pub fn toggled(section: &str, key: &str, active: bool) {
    if quiet() {
        return;
    }
    let state = if active { "enabled" } else { "disabled" };
    println!(
        "[{}] {} is now {}",
        section,
        statement(key, Some("informational")),
        statement(state, Some(if active { "success" } else { "warning" }))
    );
}

/// Tells the user a key is stored but commented out.
pub fn value_is_disabled(section: &str, key: &str) {
    if quiet() {
        return;
    }
    println!(
        "{}",
        warning(&format!(
            "[{}] {} is disabled; run `mycnf toggle {} {}` to enable it.",
            section, key, section, key
        ))
    );
}

/// Prints a non-fatal warning.
pub fn warning_message(message: &str) {
    if quiet() {
        return;
    }
    eprintln!("{}", warning(message));
}

/// Asks whether an existing file may be overwritten. Defaults to no.
pub fn confirm_overwrite(path: &Path) -> bool {
    println!(
        "{}",
        question(&format!(
            "{} already exists. Overwrite it with defaults? (y/N)",
            path.display()
        ))
    );
    let reply: String = read!("{}\n");
    reply.trim().to_ascii_lowercase().starts_with('y')
}
