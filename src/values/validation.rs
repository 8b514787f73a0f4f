//! Strict parsing of values typed by a user.
//!
//! Loading a file is forgiving (bad values fall back to defaults), but input
//! from the editor or the command line is rejected with a message instead.

use std::fmt;

use crate::schema::FieldKind;
use crate::units::{convert_to_bytes, human_readable};

use super::FieldValue;

/// A rejected input value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Message shown next to the field.
    pub message: String,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Parses a boolean the way users tend to type one.
pub fn parse_bool(input: &str) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" | "enabled" => Some(true),
        "false" | "no" | "0" | "off" | "disabled" => Some(false),
        _ => None,
    }
}

fn find_option<'a>(options: &'a [String], input: &str) -> Option<&'a String> {
    options.iter().find(|o| o.eq_ignore_ascii_case(input))
}

/// Parses user input for a field of the given kind.
pub fn parse_input(input: &str, kind: &FieldKind) -> Result<FieldValue, ValidationError> {
    let input = input.trim();

    match kind {
        FieldKind::Text | FieldKind::Password => Ok(FieldValue::Text(input.to_string())),
        FieldKind::Number => input
            .parse::<i64>()
            .map(FieldValue::Number)
            .map_err(|_| ValidationError::new("Must be a whole number")),
        FieldKind::Checkbox | FieldKind::Raw => parse_bool(input)
            .map(FieldValue::Bool)
            .ok_or_else(|| ValidationError::new("Must be true/false, yes/no, on/off or 1/0")),
        FieldKind::Select { options } => find_option(options, input)
            .map(|o| FieldValue::Choice(o.clone()))
            .ok_or_else(|| ValidationError::new(format!("Must be one of: {}", options.join(", ")))),
        FieldKind::MultiSelect { options } => {
            let mut chosen = Vec::new();
            for item in input.split(',').map(str::trim).filter(|i| !i.is_empty()) {
                match find_option(options, item) {
                    Some(option) if !chosen.contains(option) => chosen.push(option.clone()),
                    Some(_) => {}
                    None => {
                        return Err(ValidationError::new(format!(
                            "Unknown option '{}'",
                            item
                        )))
                    }
                }
            }
            Ok(FieldValue::Multi(chosen))
        }
        FieldKind::Range { min, max } => {
            let n: i64 = input
                .parse()
                .map_err(|_| ValidationError::new("Must be a whole number"))?;
            if n < *min {
                return Err(ValidationError::new(format!(
                    "Value must be at least {}",
                    min
                )));
            }
            if n > *max {
                return Err(ValidationError::new(format!(
                    "Value must be at most {}",
                    max
                )));
            }
            Ok(FieldValue::Number(n))
        }
        FieldKind::ByteSize { min, max } => {
            let bytes = convert_to_bytes(input)
                .ok_or_else(|| ValidationError::new("Must be a size such as 512K, 64M or 1G"))?;
            if bytes < *min {
                return Err(ValidationError::new(format!(
                    "Value must be at least {}",
                    human_readable(*min)
                )));
            }
            if bytes > *max {
                return Err(ValidationError::new(format!(
                    "Value must be at most {}",
                    human_readable(*max)
                )));
            }
            Ok(FieldValue::Bytes(bytes))
        }
        FieldKind::Path => Ok(FieldValue::Path(input.to_string())),
        FieldKind::Static => Err(ValidationError::new("This field is read-only")),
    }
}
