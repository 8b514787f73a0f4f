//! Typed interpretation of stored values.
//!
//! Entries keep the untyped string read from the file. The functions here
//! turn that string into a [`FieldValue`] according to the field's
//! [`FieldKind`], applying the load-time fallbacks, and format values back
//! into their on-disk form.

pub mod validation;

use std::path::Path;

use crate::placeholders::{strip_quotes, PlaceholderContext};
use crate::schema::{FieldKind, FieldSchema};
use crate::units::{convert_to_bytes, convert_to_ini, human_readable};

pub use validation::{parse_input, ValidationError};

/// A value interpreted according to its field type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Text and password fields.
    Text(String),
    /// Number and range fields.
    Number(i64),
    /// Checkbox fields, and the presence flag of raw fields.
    Bool(bool),
    /// The chosen option of a select field.
    Choice(String),
    /// The chosen options of a multi-select field, in file order.
    Multi(Vec<String>),
    /// A byte count.
    Bytes(u64),
    /// A path, absolute once interpreted from a stored value.
    Path(String),
    /// Display-only fields carry no value.
    Static,
}

impl FieldValue {
    /// The on-disk form of this value.
    ///
    /// ```
    /// use mycnf::values::FieldValue;
    /// assert_eq!(FieldValue::Bytes(8388608).to_ini_string(), "8M");
    /// assert_eq!(FieldValue::Bool(true).to_ini_string(), "True");
    /// ```
    pub fn to_ini_string(&self) -> String {
        match self {
            FieldValue::Text(s) | FieldValue::Choice(s) | FieldValue::Path(s) => s.clone(),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Bool(true) => "True".to_string(),
            FieldValue::Bool(false) => "False".to_string(),
            FieldValue::Multi(items) => items.join(","),
            FieldValue::Bytes(bytes) => convert_to_ini(*bytes),
            FieldValue::Static => String::new(),
        }
    }

    /// The boolean inside, if this is a flag.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// A short human form of `value`, as shown by the editor and `show`.
///
/// Passwords are masked and byte sizes carry a readable size.
pub fn display_value(value: &FieldValue, kind: &FieldKind) -> String {
    match (kind, value) {
        (FieldKind::Password, FieldValue::Text(s)) if !s.is_empty() => "*".repeat(8),
        (FieldKind::Raw, FieldValue::Bool(b)) => String::from(if *b { "present" } else { "absent" }),
        (_, FieldValue::Bool(b)) => String::from(if *b { "on" } else { "off" }),
        (_, FieldValue::Bytes(bytes)) => {
            format!("{} ({})", convert_to_ini(*bytes), human_readable(*bytes))
        }
        (_, FieldValue::Multi(items)) if items.is_empty() => "(none)".to_string(),
        (_, FieldValue::Multi(items)) => items.join(", "),
        (_, FieldValue::Static) => String::new(),
        (_, other) => {
            let text = other.to_ini_string();
            if text.is_empty() {
                "(empty)".to_string()
            } else {
                text
            }
        }
    }
}

/// The forgiving boolean used when reading files: anything outside the
/// true-set is false, and a bare key (empty value) is true.
pub fn is_truthy(raw: &str) -> bool {
    matches!(
        strip_quotes(raw.trim()).trim().to_lowercase().as_str(),
        "" | "1" | "true" | "yes" | "on"
    )
}

/// Interprets `raw` for `field`.
///
/// Paths are expanded with `context` and resolved against `base_dir`, the
/// directory of the option file.
pub fn interpret(
    raw: &str,
    field: &FieldSchema,
    context: &PlaceholderContext,
    base_dir: &Path,
) -> FieldValue {
    let value = strip_quotes(raw.trim()).trim();

    match &field.kind {
        FieldKind::Text | FieldKind::Password => FieldValue::Text(value.to_string()),
        FieldKind::Number => FieldValue::Number(parse_or_default(value, field)),
        FieldKind::Checkbox | FieldKind::Raw => FieldValue::Bool(is_truthy(value)),
        FieldKind::Select { options } => {
            let chosen = options
                .iter()
                .find(|o| o.eq_ignore_ascii_case(value))
                .cloned()
                .unwrap_or_else(|| field.default.clone());
            FieldValue::Choice(chosen)
        }
        FieldKind::MultiSelect { .. } => FieldValue::Multi(
            value
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        FieldKind::Range { min, max } => {
            FieldValue::Number(parse_or_default(value, field).clamp(*min, *max))
        }
        FieldKind::ByteSize { .. } => FieldValue::Bytes(
            convert_to_bytes(value)
                .or_else(|| convert_to_bytes(&field.default))
                .unwrap_or(0),
        ),
        FieldKind::Path => {
            if value.is_empty() {
                FieldValue::Path(String::new())
            } else {
                FieldValue::Path(
                    context
                        .resolve_path(value, base_dir)
                        .to_string_lossy()
                        .into_owned(),
                )
            }
        }
        FieldKind::Static => FieldValue::Static,
    }
}

fn parse_or_default(value: &str, field: &FieldSchema) -> i64 {
    value
        .parse::<i64>()
        .or_else(|_| field.default.trim().parse::<i64>())
        .unwrap_or(0)
}

/// The on-disk form of `raw` after interpretation.
pub fn format_value(
    raw: &str,
    field: &FieldSchema,
    context: &PlaceholderContext,
    base_dir: &Path,
) -> String {
    interpret(raw, field, context, base_dir).to_ini_string()
}

/// The field's default value after placeholder expansion and formatting.
pub fn format_default(field: &FieldSchema, context: &PlaceholderContext, base_dir: &Path) -> String {
    format_value(&field.default, field, context, base_dir)
}
