//! The field schema: which sections and keys exist, their types and defaults.
//!
//! A schema is loaded once from TOML (an external file or the built-in MySQL
//! catalog) and is immutable afterwards. Fields are indexed by [`FieldId`],
//! a case-insensitive `(section, key)` pair.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use log::{debug, trace, warn};
use serde::Deserialize;

use crate::error::{MycnfError, Result};
use crate::placeholders::PlaceholderContext;

/// The MySQL catalog shipped with the binary.
const BUILTIN_SCHEMA: &str = include_str!("mysql.toml");

/// Case-insensitive identity of a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId {
    section: String,
    key: String,
}

impl FieldId {
    /// Builds an id; both parts are trimmed and lower-cased.
    ///
    /// ```
    /// use mycnf::schema::FieldId;
    /// assert_eq!(FieldId::new("MySQLD", "PORT"), FieldId::new("mysqld", "port"));
    /// ```
    pub fn new(section: &str, key: &str) -> Self {
        Self {
            section: section.trim().to_lowercase(),
            key: key.trim().to_lowercase(),
        }
    }

    /// Lower-cased section name.
    pub fn section(&self) -> &str {
        &self.section
    }

    /// Lower-cased key.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section, self.key)
    }
}

/// The type of a field, with the parameters that type needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text.
    Text,
    /// Free text, masked when displayed.
    Password,
    /// A signed integer.
    Number,
    /// A boolean flag.
    Checkbox,
    /// Exactly one of `options`.
    Select {
        /// Allowed values.
        options: Vec<String>,
    },
    /// Any subset of `options`, comma separated on disk.
    MultiSelect {
        /// Allowed values.
        options: Vec<String>,
    },
    /// An integer clamped to `[min, max]`.
    Range {
        /// Smallest allowed value.
        min: i64,
        /// Largest allowed value.
        max: i64,
    },
    /// A byte count written with a unit suffix.
    ByteSize {
        /// Smallest allowed byte count.
        min: u64,
        /// Largest allowed byte count.
        max: u64,
    },
    /// A filesystem path, resolved against the option file's directory.
    Path,
    /// Display-only text; never read from or written to the file.
    Static,
    /// A literal line (such as `no-beep`) that is either present or not.
    Raw,
}

impl FieldKind {
    /// The name used for this type in schema files.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Password => "password",
            FieldKind::Number => "number",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Select { .. } => "select",
            FieldKind::MultiSelect { .. } => "multi-select",
            FieldKind::Range { .. } => "range",
            FieldKind::ByteSize { .. } => "filesize",
            FieldKind::Path => "path",
            FieldKind::Static => "static",
            FieldKind::Raw => "raw",
        }
    }
}

/// Everything known about one field. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    /// Case-insensitive identity.
    pub id: FieldId,
    /// Section name as declared.
    pub section: String,
    /// Key as declared; used when the key is not already in the file.
    pub key: String,
    /// Short human label.
    pub label: String,
    /// Longer explanation.
    pub tooltip: String,
    /// Type and type parameters.
    pub kind: FieldKind,
    /// Default value, unexpanded. For raw fields this is the literal line.
    pub default: String,
    /// Required fields are always written and never disabled.
    pub required: bool,
}

/// A section as declared by the schema.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaSection {
    /// Section name as declared.
    pub name: String,
    /// Required sections exist in every saved file.
    pub required: bool,
    /// Fields in display and save order.
    pub fields: Vec<FieldSchema>,
}

/// The loaded field table.
#[derive(Debug, Clone)]
pub struct Schema {
    sections: Vec<SchemaSection>,
    index: HashMap<FieldId, (usize, usize)>,
    context: PlaceholderContext,
}

#[derive(Deserialize)]
struct SchemaFile {
    #[serde(rename = "section", default)]
    sections: Vec<SectionEntry>,
}

#[derive(Deserialize)]
struct SectionEntry {
    name: String,
    #[serde(default)]
    required: bool,
    #[serde(rename = "field", default)]
    fields: Vec<FieldEntry>,
}

#[derive(Deserialize)]
struct FieldEntry {
    key: String,
    label: Option<String>,
    tooltip: Option<String>,
    #[serde(rename = "type")]
    kind: String,
    default: Option<toml::Value>,
    #[serde(default = "default_required")]
    required: bool,
    #[serde(default)]
    options: Vec<String>,
    min: Option<toml::Value>,
    max: Option<toml::Value>,
}

fn default_required() -> bool {
    true
}

impl Schema {
    /// Parses a schema from TOML text. Bounds are evaluated with `context`.
    pub fn from_toml_str(text: &str, context: &PlaceholderContext) -> Result<Self> {
        let file: SchemaFile =
            toml::from_str(text).map_err(|e| MycnfError::Schema(e.to_string()))?;

        let mut sections: Vec<SchemaSection> = Vec::new();
        let mut index = HashMap::new();

        for entry in file.sections {
            let section_name = entry.name.trim().to_string();
            if section_name.is_empty() {
                return Err(MycnfError::Schema("section with an empty name".to_string()));
            }

            let existing = sections
                .iter()
                .position(|s| s.name.eq_ignore_ascii_case(&section_name));
            let section_idx = match existing {
                Some(idx) => {
                    sections[idx].required |= entry.required;
                    idx
                }
                None => {
                    sections.push(SchemaSection {
                        name: section_name.clone(),
                        required: entry.required,
                        fields: Vec::new(),
                    });
                    sections.len() - 1
                }
            };

            for field in entry.fields {
                let schema = build_field(&section_name, field, context)?;
                if index.contains_key(&schema.id) {
                    warn!("Field {} is declared twice, keeping the first", schema.id);
                    continue;
                }
                let field_idx = sections[section_idx].fields.len();
                index.insert(schema.id.clone(), (section_idx, field_idx));
                sections[section_idx].fields.push(schema);
            }
        }

        debug!(
            "Loaded schema with {} sections and {} fields",
            sections.len(),
            index.len()
        );
        Ok(Self {
            sections,
            index,
            context: context.clone(),
        })
    }

    /// Reads and parses a schema file.
    pub fn from_file(path: &Path, context: &PlaceholderContext) -> Result<Self> {
        trace!("Reading schema from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text, context)
    }

    /// The built-in MySQL catalog.
    pub fn builtin(context: &PlaceholderContext) -> Result<Self> {
        Self::from_toml_str(BUILTIN_SCHEMA, context)
    }

    /// The raw TOML of the built-in catalog.
    pub fn builtin_source() -> &'static str {
        BUILTIN_SCHEMA
    }

    /// Sections in declaration order.
    pub fn sections(&self) -> &[SchemaSection] {
        &self.sections
    }

    /// Looks a section up by name, ignoring case.
    pub fn section(&self, name: &str) -> Option<&SchemaSection> {
        let name = name.trim();
        self.sections
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Names of the sections every file must contain.
    pub fn required_sections(&self) -> impl Iterator<Item = &str> {
        self.sections
            .iter()
            .filter(|s| s.required)
            .map(|s| s.name.as_str())
    }

    /// Looks a field up by id.
    pub fn field(&self, id: &FieldId) -> Option<&FieldSchema> {
        self.index
            .get(id)
            .map(|&(section, field)| &self.sections[section].fields[field])
    }

    /// Looks a field up by section and key, ignoring case.
    pub fn lookup(&self, section: &str, key: &str) -> Option<&FieldSchema> {
        self.field(&FieldId::new(section, key))
    }

    /// Every field, in section then declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldSchema> {
        self.sections.iter().flat_map(|s| s.fields.iter())
    }

    /// Number of declared fields.
    pub fn field_count(&self) -> usize {
        self.index.len()
    }

    /// The placeholder values this schema was loaded with.
    pub fn context(&self) -> &PlaceholderContext {
        &self.context
    }
}

fn build_field(
    section: &str,
    entry: FieldEntry,
    context: &PlaceholderContext,
) -> Result<FieldSchema> {
    let key = entry.key.trim().to_string();
    if key.is_empty() {
        return Err(MycnfError::Schema(format!(
            "field with an empty key in [{}]",
            section
        )));
    }
    let id = FieldId::new(section, &key);

    let kind = match entry.kind.trim().to_lowercase().as_str() {
        "text" => FieldKind::Text,
        "password" => FieldKind::Password,
        "number" => FieldKind::Number,
        "checkbox" => FieldKind::Checkbox,
        "path" => FieldKind::Path,
        "static" => FieldKind::Static,
        "raw" => FieldKind::Raw,
        "select" => FieldKind::Select {
            options: require_options(&id, entry.options.clone())?,
        },
        "multi-select" | "multiselect" => FieldKind::MultiSelect {
            options: require_options(&id, entry.options.clone())?,
        },
        "range" => {
            let min = integer_bound(&id, "min", entry.min.as_ref(), context)?;
            let max = integer_bound(&id, "max", entry.max.as_ref(), context)?;
            if min > max {
                return Err(MycnfError::Schema(format!(
                    "{}: min {} is larger than max {}",
                    id, min, max
                )));
            }
            FieldKind::Range { min, max }
        }
        "filesize" | "bytesize" => {
            let min = byte_bound(&id, "min", entry.min.as_ref(), context)?;
            let max = byte_bound(&id, "max", entry.max.as_ref(), context)?;
            let max = if min <= max {
                max
            } else if is_expression(entry.max.as_ref()) {
                // The machine has less memory than the floor; keep the floor usable.
                warn!(
                    "{}: max {} evaluates below min {}, using min for both",
                    id, max, min
                );
                min
            } else {
                return Err(MycnfError::Schema(format!(
                    "{}: min {} is larger than max {}",
                    id, min, max
                )));
            };
            FieldKind::ByteSize { min, max }
        }
        other => {
            return Err(MycnfError::Schema(format!(
                "{}: unknown field type '{}'",
                id, other
            )))
        }
    };

    let default = entry
        .default
        .as_ref()
        .map(value_to_string)
        .unwrap_or_default();

    if let FieldKind::Select { options } = &kind {
        if !default.is_empty() && !options.iter().any(|o| o.eq_ignore_ascii_case(&default)) {
            warn!("{}: default '{}' is not one of its options", id, default);
        }
    }

    Ok(FieldSchema {
        label: entry
            .label
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| key.clone()),
        tooltip: entry
            .tooltip
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| key.clone()),
        id,
        section: section.to_string(),
        key,
        kind,
        default,
        required: entry.required,
    })
}

fn require_options(id: &FieldId, options: Vec<String>) -> Result<Vec<String>> {
    if options.is_empty() {
        Err(MycnfError::Schema(format!("{}: choice field has no options", id)))
    } else {
        Ok(options)
    }
}

fn is_expression(value: Option<&toml::Value>) -> bool {
    matches!(value, Some(toml::Value::String(s)) if s.contains('%'))
}

fn integer_bound(
    id: &FieldId,
    name: &str,
    value: Option<&toml::Value>,
    context: &PlaceholderContext,
) -> Result<i64> {
    match value {
        Some(toml::Value::Integer(n)) => Ok(*n),
        Some(toml::Value::String(s)) => context
            .resolve_bound(s)
            .and_then(|n| i64::try_from(n).ok())
            .ok_or_else(|| MycnfError::Schema(format!("{}: cannot evaluate {} '{}'", id, name, s))),
        _ => Err(MycnfError::Schema(format!("{}: missing {}", id, name))),
    }
}

fn byte_bound(
    id: &FieldId,
    name: &str,
    value: Option<&toml::Value>,
    context: &PlaceholderContext,
) -> Result<u64> {
    match value {
        Some(toml::Value::Integer(n)) => u64::try_from(*n)
            .map_err(|_| MycnfError::Schema(format!("{}: {} must not be negative", id, name))),
        Some(toml::Value::String(s)) => context
            .resolve_bound(s)
            .or_else(|| crate::units::convert_to_bytes(s))
            .ok_or_else(|| MycnfError::Schema(format!("{}: cannot evaluate {} '{}'", id, name, s))),
        _ => Err(MycnfError::Schema(format!("{}: missing {}", id, name))),
    }
}

/// Normalises a TOML default to the string stored in the option file.
fn value_to_string(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Integer(n) => n.to_string(),
        toml::Value::Float(f) => f.to_string(),
        toml::Value::Boolean(true) => "True".to_string(),
        toml::Value::Boolean(false) => "False".to_string(),
        toml::Value::Array(items) => items
            .iter()
            .map(value_to_string)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> PlaceholderContext {
        PlaceholderContext::new("/opt/mysql", 8 * 1024 * 1024 * 1024)
    }

    const SMALL: &str = r#"
[[section]]
name = "client"
required = true

[[section.field]]
key = "port"
type = "number"
default = 3306

[[section]]
name = "mysqld"
required = true

[[section.field]]
key = "Key_Buffer_Size"
label = "Key Buffer"
type = "filesize"
default = 8388608
min = 8388608
max = "%TotalRAM%/4"

[[section.field]]
key = "sql-mode"
type = "multi-select"
default = ["STRICT_TRANS_TABLES", "NO_ZERO_DATE"]
options = ["STRICT_TRANS_TABLES", "NO_ZERO_DATE", "ANSI_QUOTES"]
required = false

[[section.field]]
key = "key_buffer_size"
type = "number"
"#;

    #[test]
    fn test_parse_small_schema() {
        let schema = Schema::from_toml_str(SMALL, &ctx()).unwrap();
        assert_eq!(schema.sections().len(), 2);
        assert_eq!(schema.field_count(), 3);
        assert_eq!(
            schema.required_sections().collect::<Vec<_>>(),
            vec!["client", "mysqld"]
        );
    }

    #[test]
    fn test_lookup_ignores_case_and_keeps_spelling() {
        let schema = Schema::from_toml_str(SMALL, &ctx()).unwrap();
        let field = schema.lookup("MYSQLD", "key_buffer_size").unwrap();
        assert_eq!(field.key, "Key_Buffer_Size");
        assert_eq!(field.label, "Key Buffer");
        // Tooltip falls back to the key
        assert_eq!(field.tooltip, "Key_Buffer_Size");
    }

    #[test]
    fn test_duplicate_keeps_first() {
        let schema = Schema::from_toml_str(SMALL, &ctx()).unwrap();
        let field = schema.lookup("mysqld", "key_buffer_size").unwrap();
        assert!(matches!(field.kind, FieldKind::ByteSize { .. }));
    }

    #[test]
    fn test_bound_expression() {
        let schema = Schema::from_toml_str(SMALL, &ctx()).unwrap();
        let field = schema.lookup("mysqld", "key_buffer_size").unwrap();
        assert_eq!(
            field.kind,
            FieldKind::ByteSize {
                min: 8388608,
                max: 2 * 1024 * 1024 * 1024
            }
        );
    }

    #[test]
    fn test_array_default_and_optional_flag() {
        let schema = Schema::from_toml_str(SMALL, &ctx()).unwrap();
        let field = schema.lookup("mysqld", "sql-mode").unwrap();
        assert_eq!(field.default, "STRICT_TRANS_TABLES,NO_ZERO_DATE");
        assert!(!field.required);
        assert!(schema.lookup("client", "port").unwrap().required);
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let text = "[[section]]\nname = \"x\"\n[[section.field]]\nkey = \"a\"\ntype = \"colour\"\n";
        let err = Schema::from_toml_str(text, &ctx()).unwrap_err();
        assert!(matches!(err, MycnfError::Schema(_)));
    }

    #[test]
    fn test_select_without_options_is_rejected() {
        let text = "[[section]]\nname = \"x\"\n[[section.field]]\nkey = \"a\"\ntype = \"select\"\n";
        assert!(Schema::from_toml_str(text, &ctx()).is_err());
    }

    #[test]
    fn test_inverted_literal_range_is_rejected() {
        let text = "[[section]]\nname = \"x\"\n[[section.field]]\nkey = \"a\"\ntype = \"range\"\nmin = 5\nmax = 1\n";
        assert!(Schema::from_toml_str(text, &ctx()).is_err());
    }

    #[test]
    fn test_small_machine_clamps_expression_bound() {
        let tiny = PlaceholderContext::new("/", 1024);
        let schema = Schema::from_toml_str(SMALL, &tiny).unwrap();
        let field = schema.lookup("mysqld", "key_buffer_size").unwrap();
        assert_eq!(
            field.kind,
            FieldKind::ByteSize {
                min: 8388608,
                max: 8388608
            }
        );
    }

    #[test]
    fn test_builtin_catalog_loads() {
        let schema = Schema::builtin(&ctx()).unwrap();
        assert_eq!(
            schema.required_sections().collect::<Vec<_>>(),
            vec!["client", "mysql", "mysqld"]
        );
        let raw = schema.lookup("mysql", "no-beep").unwrap();
        assert_eq!(raw.kind, FieldKind::Raw);
        assert_eq!(raw.default, "no-beep");
        assert!(schema.lookup("mysqld", "innodb_buffer_pool_size").is_some());
        assert!(schema.lookup("mysqld", "temptable_max_ram").is_some());
    }

    #[test]
    fn test_field_id_display() {
        assert_eq!(FieldId::new(" MySQLD ", "Port").to_string(), "mysqld.port");
    }
}
