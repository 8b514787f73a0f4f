//! mycnf is a form editor for MySQL option files (`my.ini` / `my.cnf`).
//!
//! A [`Schema`] describes which keys exist, their types, defaults and
//! whether they may be commented out. A [`ConfigModel`] holds the file's
//! sections and entries merged with that schema and writes them back with
//! defaults suppressed, disabled keys commented out and the original text
//! encoding preserved.

pub mod cli;
pub mod cli_pretty_printing;
pub mod config;
pub mod encoding;
pub mod error;
pub mod model;
pub mod placeholders;
pub mod schema;
pub mod tui;
pub mod units;
pub mod values;

use std::path::Path;
use std::sync::Arc;

pub use error::{MycnfError, Result};
pub use model::{ConfigEntry, ConfigModel, ConfigSection};
pub use placeholders::PlaceholderContext;
pub use schema::{FieldId, FieldKind, FieldSchema, Schema};
pub use values::FieldValue;

/// Loads `path` against the built-in MySQL schema.
///
/// Placeholders such as `%AppDir%` resolve against the directory of the
/// running executable.
/// ```rust,no_run
/// let model = mycnf::open_with_builtin_schema("my.ini").unwrap();
/// println!("{}", model.render());
/// ```
pub fn open_with_builtin_schema(path: impl AsRef<Path>) -> Result<ConfigModel> {
    let context = PlaceholderContext::detect(placeholders::application_dir());
    let schema = Arc::new(Schema::builtin(&context)?);
    Ok(ConfigModel::load(path, schema))
}
