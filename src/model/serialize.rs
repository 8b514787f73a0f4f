//! Rendering a [`ConfigModel`] back to option-file text.

use log::trace;

use super::{ConfigEntry, ConfigModel, ConfigSection};
use crate::schema::{FieldKind, SchemaSection};
use crate::values;

/// Wraps values containing a space in double quotes, unless already quoted.
pub(crate) fn quote(value: &str) -> String {
    let already_quoted = value.len() >= 2 && value.starts_with('"') && value.ends_with('"');
    if value.contains(' ') && !already_quoted {
        format!("\"{}\"", value)
    } else {
        value.to_string()
    }
}

fn entry_line(key: &str, value: &str, active: bool) -> String {
    let marker = if active { "" } else { "#" };
    format!("{}{} = {}", marker, key, quote(value))
}

fn unknown_line(entry: &ConfigEntry) -> String {
    if entry.bare && entry.value.is_empty() {
        let marker = if entry.active { "" } else { "#" };
        format!("{}{}", marker, entry.key)
    } else {
        entry_line(&entry.key, &entry.value, entry.active)
    }
}

fn push_directives(section: &ConfigSection, out: &mut String) {
    for line in section.directives() {
        out.push_str(line);
        out.push('\n');
    }
}

/// Renders the whole file: directives found before the first header, schema
/// sections in declaration order, then any unknown sections.
pub(crate) fn render(model: &ConfigModel) -> String {
    let mut out = String::new();
    let schema = model.schema();

    if !model.preamble.is_empty() {
        for line in &model.preamble {
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
    }

    for section in schema.sections() {
        let model_section = model.section(&section.name);
        render_schema_section(model, section, model_section, &mut out);
    }

    if model.keep_unknown {
        for section in model.sections() {
            if schema.section(section.name()).is_some() {
                continue;
            }
            out.push_str(&format!("[{}]\n", section.name()));
            for entry in section.entries() {
                out.push_str(&unknown_line(entry));
                out.push('\n');
            }
            push_directives(section, &mut out);
            out.push('\n');
        }
    }

    out
}

fn render_schema_section(
    model: &ConfigModel,
    section: &SchemaSection,
    model_section: Option<&ConfigSection>,
    out: &mut String,
) {
    let context = model.schema().context();
    let base_dir = model.base_dir();

    out.push_str(&format!("[{}]\n", section.name));

    for field in &section.fields {
        let entry = model_section.and_then(|s| s.get(&field.key));
        match field.kind {
            FieldKind::Static => continue,
            FieldKind::Raw => {
                let literal = field.default.trim();
                let present = entry.map(|e| values::is_truthy(&e.value)).unwrap_or(false);
                if present {
                    out.push_str(literal);
                    out.push('\n');
                } else if model_section.is_some_and(|s| s.has_disabled_raw_line(literal)) {
                    out.push('#');
                    out.push_str(literal);
                    out.push('\n');
                }
                continue;
            }
            _ => {}
        }

        let Some(entry) = entry else {
            continue;
        };

        let formatted = values::format_value(&entry.value, field, context, &base_dir);
        if !field.required {
            let default = values::format_default(field, context, &base_dir);
            if formatted.eq_ignore_ascii_case(&default) {
                trace!("Omitting {}, it matches its default", field.id);
                continue;
            }
        }

        let active = field.required || entry.active;
        out.push_str(&entry_line(&entry.key, &formatted, active));
        out.push('\n');
    }

    if model.keep_unknown {
        if let Some(model_section) = model_section {
            for entry in model_section.entries() {
                if section
                    .fields
                    .iter()
                    .any(|f| f.key.eq_ignore_ascii_case(&entry.key))
                {
                    continue;
                }
                out.push_str(&unknown_line(entry));
                out.push('\n');
            }
        }
    }
    if let Some(model_section) = model_section {
        push_directives(model_section, out);
    }

    out.push('\n');
}
