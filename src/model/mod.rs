//! The in-memory option file.
//!
//! A [`ConfigModel`] is built by [`ConfigModel::load`], which scans the file
//! and merges it with the [`Schema`] so that every declared field has a value
//! and the right active flag. It is changed through [`ConfigModel::set`],
//! [`ConfigModel::toggle_active`] and friends, and written back wholesale by
//! [`ConfigModel::save`].

mod parse;
mod serialize;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, error, info, trace, warn};
use tempfile::NamedTempFile;

use crate::encoding::{self, ChardetDetector, EncodingDetector, TextEncoding};
use crate::error::{MycnfError, Result};
use crate::schema::{FieldKind, FieldSchema, Schema};
use crate::values::{self, FieldValue};

/// One key's live state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    /// Key spelling as it appears (or will appear) in the file.
    pub key: String,
    /// Untyped value; interpreted through the field's schema.
    pub value: String,
    /// `false` means the key is commented out.
    pub active: bool,
    /// The key was written without `=` in the file.
    bare: bool,
}

impl ConfigEntry {
    /// Creates an entry with an explicit value.
    pub fn new(key: impl Into<String>, value: impl Into<String>, active: bool) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            active,
            bare: false,
        }
    }
}

/// A section: an ordered mapping from key to entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfigSection {
    name: String,
    entries: Vec<ConfigEntry>,
    raw_lines: Vec<String>,
    directives: Vec<String>,
}

impl ConfigSection {
    /// Creates an empty section.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
            raw_lines: Vec::new(),
            directives: Vec::new(),
        }
    }

    /// Section name with its original spelling.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Looks up an entry, ignoring case.
    pub fn get(&self, key: &str) -> Option<&ConfigEntry> {
        let key = key.trim();
        self.entries.iter().find(|e| e.key.eq_ignore_ascii_case(key))
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut ConfigEntry> {
        let key = key.trim();
        self.entries
            .iter_mut()
            .find(|e| e.key.eq_ignore_ascii_case(key))
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = &ConfigEntry> {
        self.entries.iter()
    }

    /// Whether `literal` appeared verbatim (trimmed) as a line of this section.
    pub fn has_raw_line(&self, literal: &str) -> bool {
        let literal = literal.trim();
        self.raw_lines.iter().any(|line| line == literal)
    }

    /// Whether `literal` appeared commented out (`#no-beep`) in this section.
    pub fn has_disabled_raw_line(&self, literal: &str) -> bool {
        let literal = literal.trim();
        self.raw_lines.iter().any(|line| {
            let uncommented = line.trim_start_matches(['#', ';']);
            uncommented.len() < line.len() && uncommented.trim() == literal
        })
    }

    /// `!include` style lines, in file order.
    pub fn directives(&self) -> &[String] {
        &self.directives
    }

    /// Inserts or replaces the entry for `entry.key`, keeping its position.
    fn upsert(&mut self, entry: ConfigEntry) {
        match self.get_mut(&entry.key) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    fn remove(&mut self, key: &str) -> Option<ConfigEntry> {
        let idx = self
            .entries
            .iter()
            .position(|e| e.key.eq_ignore_ascii_case(key.trim()))?;
        Some(self.entries.remove(idx))
    }
}

/// The whole option file, merged with its schema.
#[derive(Debug, Clone)]
pub struct ConfigModel {
    path: PathBuf,
    encoding: TextEncoding,
    schema: Arc<Schema>,
    preamble: Vec<String>,
    sections: Vec<ConfigSection>,
    keep_unknown: bool,
    dirty: bool,
}

impl ConfigModel {
    /// Loads `path`, detecting its encoding with [`ChardetDetector`].
    ///
    /// A missing or unreadable file is treated as empty, so the result holds
    /// the schema defaults.
    pub fn load(path: impl AsRef<Path>, schema: Arc<Schema>) -> Self {
        Self::load_with_detector(path, schema, &ChardetDetector)
    }

    /// Loads `path` with a custom encoding detector.
    pub fn load_with_detector(
        path: impl AsRef<Path>,
        schema: Arc<Schema>,
        detector: &dyn EncodingDetector,
    ) -> Self {
        let path = absolute(path.as_ref());
        let (text, encoding) = match fs::read(&path) {
            Ok(bytes) => {
                let (text, encoding) = encoding::decode(&bytes, detector);
                debug!("Read {} as {}", path.display(), encoding.name());
                (text, encoding)
            }
            Err(e) => {
                if e.kind() == std::io::ErrorKind::NotFound {
                    info!("{} does not exist, starting from defaults", path.display());
                } else {
                    warn!("Could not read {}: {}, starting from defaults", path.display(), e);
                }
                (String::new(), TextEncoding::platform())
            }
        };
        Self::from_text(path, &text, encoding, schema)
    }

    /// Builds a model from already decoded text.
    pub fn from_text(
        path: impl AsRef<Path>,
        text: &str,
        encoding: TextEncoding,
        schema: Arc<Schema>,
    ) -> Self {
        let (preamble, sections) = parse::scan(text);
        let mut model = Self {
            path: absolute(path.as_ref()),
            encoding,
            schema,
            preamble,
            sections,
            keep_unknown: true,
            dirty: false,
        };
        model.merge_schema();
        model
    }

    /// Fills every schema field, forces required fields active and resolves
    /// raw fields.
    fn merge_schema(&mut self) {
        let schema = Arc::clone(&self.schema);
        let base_dir = self.base_dir();
        let context = schema.context();

        for name in schema.required_sections() {
            self.section_or_create(name);
        }

        let mut inserted = 0;
        for section in schema.sections() {
            for field in &section.fields {
                match field.kind {
                    FieldKind::Static => continue,
                    FieldKind::Raw => {
                        self.merge_raw_field(field);
                        continue;
                    }
                    _ => {}
                }

                let model_section = self.section_or_create(&section.name);
                match model_section.get_mut(&field.key) {
                    Some(entry) => {
                        if field.required && !entry.active {
                            debug!("{} is required, activating it", field.id);
                            entry.active = true;
                        }
                    }
                    None => {
                        let value = match field.kind {
                            FieldKind::Path => {
                                values::format_default(field, context, &base_dir)
                            }
                            _ => context.expand(&field.default),
                        };
                        trace!("Inserting default {} = {}", field.id, value);
                        model_section.upsert(ConfigEntry::new(&field.key, value, field.required));
                        inserted += 1;
                    }
                }
            }
        }
        debug!("Inserted {} schema defaults", inserted);
    }

    fn merge_raw_field(&mut self, field: &FieldSchema) {
        let literal = field.default.trim().to_string();
        let section = self.section_or_create(&field.section);
        let present = section.has_raw_line(&literal);

        // The literal line must not also survive as an ordinary entry.
        if let Some(line) = parse::entry_line(&literal) {
            if !line.key.eq_ignore_ascii_case(&field.key) {
                section.remove(line.key);
            }
        }

        let surrogate = FieldValue::Bool(present).to_ini_string();
        section.upsert(ConfigEntry::new(&field.key, surrogate, true));
    }

    fn section_or_create(&mut self, name: &str) -> &mut ConfigSection {
        let name = name.trim();
        let idx = match self
            .sections
            .iter()
            .position(|s| s.name.eq_ignore_ascii_case(name))
        {
            Some(idx) => idx,
            None => {
                self.sections.push(ConfigSection::new(name));
                self.sections.len() - 1
            }
        };
        &mut self.sections[idx]
    }

    /// Chooses whether keys and sections outside the schema are written back.
    pub fn set_keep_unknown(&mut self, keep: bool) {
        self.keep_unknown = keep;
    }

    /// Absolute path of the option file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory relative paths are resolved against.
    pub fn base_dir(&self) -> PathBuf {
        self.path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Encoding used when saving.
    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// The schema this model was merged with.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Sections in file order, followed by sections created afterwards.
    pub fn sections(&self) -> &[ConfigSection] {
        &self.sections
    }

    /// Looks a section up, ignoring case.
    pub fn section(&self, name: &str) -> Option<&ConfigSection> {
        let name = name.trim();
        self.sections
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Whether anything changed since load or the last save.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The entry for (`section`, `key`), ignoring case.
    pub fn get(&self, section: &str, key: &str) -> Option<&ConfigEntry> {
        self.section(section)?.get(key)
    }

    /// The typed value of a schema field.
    pub fn value(&self, section: &str, key: &str) -> Option<FieldValue> {
        let field = self.schema.lookup(section, key)?;
        if field.kind == FieldKind::Static {
            return Some(FieldValue::Static);
        }
        let entry = self.get(section, key)?;
        Some(values::interpret(
            &entry.value,
            field,
            self.schema.context(),
            &self.base_dir(),
        ))
    }

    /// Sets a value.
    ///
    /// Schema fields are validated against their type and stored in their
    /// on-disk form; the active flag is left alone. Keys outside the schema
    /// are stored verbatim, creating the section if needed.
    pub fn set(&mut self, section: &str, key: &str, value: &str) -> Result<()> {
        let stored = match self.schema.lookup(section, key) {
            Some(field) => {
                let parsed = values::parse_input(value, &field.kind).map_err(|e| {
                    MycnfError::InvalidValue {
                        section: section.to_string(),
                        key: key.to_string(),
                        reason: e.message,
                    }
                })?;
                parsed.to_ini_string()
            }
            None => value.trim().to_string(),
        };

        let model_section = self.section_or_create(section);
        match model_section.get_mut(key) {
            Some(entry) => {
                if entry.value == stored && !entry.bare {
                    return Ok(());
                }
                entry.value = stored;
                entry.bare = false;
            }
            None => model_section.upsert(ConfigEntry::new(key.trim(), stored, true)),
        }
        debug!("Set [{}] {}", section, key);
        self.dirty = true;
        Ok(())
    }

    /// Activates or disables a key.
    ///
    /// Required fields cannot be disabled. Raw fields have no commented form,
    /// so for them this sets the presence of the literal line instead.
    pub fn set_active(&mut self, section: &str, key: &str, active: bool) -> Result<()> {
        if let Some(field) = self.schema.lookup(section, key) {
            if field.required && !active {
                return Err(MycnfError::RequiredField {
                    section: section.to_string(),
                    key: key.to_string(),
                });
            }
            if field.kind == FieldKind::Static {
                return Err(MycnfError::InvalidValue {
                    section: section.to_string(),
                    key: key.to_string(),
                    reason: "static fields cannot be toggled".to_string(),
                });
            }
            if field.kind == FieldKind::Raw {
                let value = FieldValue::Bool(active).to_ini_string();
                return self.set(section, key, &value);
            }
        }

        let entry = self
            .sections
            .iter_mut()
            .find(|s| s.name.eq_ignore_ascii_case(section.trim()))
            .and_then(|s| s.get_mut(key))
            .ok_or_else(|| MycnfError::UnknownField {
                section: section.to_string(),
                key: key.to_string(),
            })?;
        if entry.active != active {
            entry.active = active;
            self.dirty = true;
        }
        Ok(())
    }

    /// Flips a key between active and disabled and returns the new state.
    pub fn toggle_active(&mut self, section: &str, key: &str) -> Result<bool> {
        let current = match self.schema.lookup(section, key) {
            Some(field) if field.kind == FieldKind::Raw => self
                .value(section, key)
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
            _ => {
                self.get(section, key)
                    .ok_or_else(|| MycnfError::UnknownField {
                        section: section.to_string(),
                        key: key.to_string(),
                    })?
                    .active
            }
        };
        self.set_active(section, key, !current)?;
        Ok(!current)
    }

    /// Restores a schema field's default value. The active flag is kept.
    pub fn reset(&mut self, section: &str, key: &str) -> Result<()> {
        let field = self
            .schema
            .lookup(section, key)
            .ok_or_else(|| MycnfError::UnknownField {
                section: section.to_string(),
                key: key.to_string(),
            })?
            .clone();

        let value = match field.kind {
            FieldKind::Static => return Ok(()),
            FieldKind::Raw => FieldValue::Bool(false).to_ini_string(),
            FieldKind::Path => {
                values::format_default(&field, self.schema.context(), &self.base_dir())
            }
            _ => self.schema.context().expand(&field.default),
        };

        let model_section = self.section_or_create(&field.section);
        match model_section.get_mut(&field.key) {
            Some(entry) if entry.value == value => {}
            Some(entry) => {
                entry.value = value;
                self.dirty = true;
            }
            None => {
                model_section.upsert(ConfigEntry::new(&field.key, value, field.required));
                self.dirty = true;
            }
        }
        Ok(())
    }

    /// The file contents `save` would write.
    pub fn render(&self) -> String {
        serialize::render(self)
    }

    /// Writes the model to its own path and clears the dirty flag.
    pub fn save(&mut self) -> Result<()> {
        let path = self.path.clone();
        self.save_to(&path)?;
        self.dirty = false;
        Ok(())
    }

    /// Writes the model to `path`.
    ///
    /// The text goes to a temporary file in the target directory which then
    /// replaces `path`, so a failed save leaves the old file untouched.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let bytes = encoding::encode(&self.render(), &self.encoding);
        write_atomic(path, &bytes).map_err(|e| {
            error!("Saving {} failed: {}", path.display(), e);
            match e {
                MycnfError::Save(_) => e,
                other => MycnfError::Save(other.to_string()),
            }
        })?;
        info!("Saved {} ({})", path.display(), self.encoding.name());
        Ok(())
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let mut tmp = NamedTempFile::new_in(&dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    if let Ok(metadata) = fs::metadata(path) {
        fs::set_permissions(tmp.path(), metadata.permissions())?;
    }
    tmp.persist(path)?;
    Ok(())
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placeholders::PlaceholderContext;

    const SCHEMA: &str = r#"
[[section]]
name = "client"
required = true

[[section.field]]
key = "port"
type = "number"
default = 3306

[[section]]
name = "mysql"
required = true

[[section.field]]
key = "no-beep"
type = "raw"
default = "no-beep"
required = false

[[section]]
name = "mysqld"
required = true

[[section.field]]
key = "port"
type = "number"
default = 3306
required = false

[[section.field]]
key = "datadir"
type = "path"
default = "%AppDir%/data"

[[section.field]]
key = "key_buffer_size"
type = "filesize"
default = 8388608
min = 8388608
max = 1073741824

[[section.field]]
key = "note"
type = "static"
"#;

    fn schema() -> Arc<Schema> {
        let ctx = PlaceholderContext::new("/opt/mysql", 1 << 34);
        Arc::new(Schema::from_toml_str(SCHEMA, &ctx).unwrap())
    }

    fn model(text: &str) -> ConfigModel {
        ConfigModel::from_text("/etc/mysql/my.ini", text, TextEncoding::platform(), schema())
    }

    #[test]
    fn test_empty_file_gets_defaults() {
        let m = model("");
        assert_eq!(m.get("client", "port").unwrap().value, "3306");
        assert!(m.get("client", "port").unwrap().active);
        let optional = m.get("mysqld", "port").unwrap();
        assert!(!optional.active);
        assert_eq!(
            m.get("mysqld", "datadir").unwrap().value,
            "/opt/mysql/data"
        );
        assert!(m.get("mysqld", "note").is_none());
        assert!(!m.is_dirty());
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let m = model("[MySQLD]\nPort=3310\n");
        assert_eq!(m.get("MySQLD", "PORT"), m.get("mysqld", "port"));
        assert_eq!(m.get("mysqld", "port").unwrap().key, "Port");
        assert_eq!(m.section("mysqld").unwrap().name(), "MySQLD");
    }

    #[test]
    fn test_required_field_is_forced_active() {
        let m = model("[client]\n#port=3307\n");
        let entry = m.get("client", "port").unwrap();
        assert!(entry.active);
        assert_eq!(entry.value, "3307");
    }

    #[test]
    fn test_raw_field_presence() {
        let with = model("[mysql]\nno-beep\n");
        assert_eq!(with.value("mysql", "no-beep"), Some(FieldValue::Bool(true)));
        let without = model("[mysql]\n");
        assert_eq!(without.value("mysql", "no-beep"), Some(FieldValue::Bool(false)));
    }

    #[test]
    fn test_set_validates_schema_fields() {
        let mut m = model("");
        assert!(matches!(
            m.set("mysqld", "key_buffer_size", "1K"),
            Err(MycnfError::InvalidValue { .. })
        ));
        m.set("mysqld", "key_buffer_size", "16m").unwrap();
        assert_eq!(m.get("mysqld", "key_buffer_size").unwrap().value, "16M");
        assert!(m.is_dirty());
    }

    #[test]
    fn test_set_unknown_creates_section() {
        let mut m = model("");
        m.set("mysqldump", "quick", "").unwrap();
        assert!(m.section("mysqldump").is_some());
        assert!(m.get("mysqldump", "quick").unwrap().active);
    }

    #[test]
    fn test_toggle_optional_and_required() {
        let mut m = model("[mysqld]\nport=3307\n");
        assert_eq!(m.toggle_active("mysqld", "port").unwrap(), false);
        assert!(!m.get("mysqld", "port").unwrap().active);
        assert_eq!(m.toggle_active("mysqld", "port").unwrap(), true);

        let err = m.toggle_active("client", "port").unwrap_err();
        assert!(matches!(err, MycnfError::RequiredField { .. }));
        assert!(m.get("client", "port").unwrap().active);
    }

    #[test]
    fn test_toggle_raw_flips_presence() {
        let mut m = model("[mysql]\nno-beep\n");
        assert_eq!(m.toggle_active("mysql", "no-beep").unwrap(), false);
        assert_eq!(m.value("mysql", "no-beep"), Some(FieldValue::Bool(false)));
    }

    #[test]
    fn test_toggle_missing_key_errors() {
        let mut m = model("");
        assert!(matches!(
            m.toggle_active("mysqld", "nope"),
            Err(MycnfError::UnknownField { .. })
        ));
    }

    #[test]
    fn test_reset_restores_default() {
        let mut m = model("[mysqld]\nkey_buffer_size=64M\n");
        m.reset("mysqld", "key_buffer_size").unwrap();
        assert_eq!(m.get("mysqld", "key_buffer_size").unwrap().value, "8388608");
        assert!(m.is_dirty());
        assert!(m.reset("mysqld", "unknown").is_err());
    }

    #[test]
    fn test_static_value() {
        let m = model("");
        assert_eq!(m.value("mysqld", "note"), Some(FieldValue::Static));
    }
}
