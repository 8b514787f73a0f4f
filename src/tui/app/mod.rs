//! Application state for the option file editor.
//!
//! [`App`] owns the [`ConfigModel`] being edited. Key handlers call methods
//! here; file I/O is left to the run loop.

use std::collections::HashMap;

pub mod choice_list;
pub mod form;
pub mod state;

pub use state::{AppState, ChoiceListState, FieldRow};

use crate::model::ConfigModel;
use crate::schema::{FieldId, FieldKind};

/// Stored value and active flag of every schema field, used to mark edits.
type Baseline = HashMap<FieldId, (String, bool)>;

/// Main application struct managing editor state and user interactions.
#[derive(Debug)]
pub struct App {
    /// The option file being edited.
    pub model: ConfigModel,
    /// Current state of the application state machine.
    pub state: AppState,
    /// Index of the selected schema section.
    pub selected_section: usize,
    /// Index of the selected field within the section.
    pub selected_field: usize,
    /// Rejected input per field, shown under the field until fixed.
    pub validation_errors: HashMap<FieldId, String>,
    /// Flag indicating the application should exit.
    pub should_quit: bool,
    /// Flag indicating whether the help overlay is visible.
    pub show_help: bool,
    /// Optional status message for user feedback.
    pub status_message: Option<String>,
    baseline: Baseline,
}

impl App {
    /// Creates an editor over `model`, starting at the first field.
    pub fn new(model: ConfigModel) -> Self {
        let baseline = snapshot(&model);
        Self {
            model,
            state: AppState::Browsing,
            selected_section: 0,
            selected_field: 0,
            validation_errors: HashMap::new(),
            should_quit: false,
            show_help: false,
            status_message: None,
            baseline,
        }
    }

    /// Sets a status message to display to the user.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Clears the current status message.
    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// Toggles the help overlay visibility.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Quits straight away when nothing is unsaved, otherwise asks first.
    pub fn request_quit(&mut self) {
        if self.model.is_dirty() {
            self.state = AppState::ConfirmQuit;
        } else {
            self.should_quit = true;
        }
    }

    /// Leaves the quit confirmation without quitting.
    pub fn cancel_quit(&mut self) {
        if self.state == AppState::ConfirmQuit {
            self.state = AppState::Browsing;
        }
    }

    /// Records a successful save: edit markers are cleared.
    pub fn mark_saved(&mut self) {
        self.baseline = snapshot(&self.model);
    }

    /// Whether the field's value or active flag differs from the last save.
    pub fn is_modified(&self, id: &FieldId) -> bool {
        let current = self
            .model
            .get(id.section(), id.key())
            .map(|e| (e.value.clone(), e.active));
        current.as_ref() != self.baseline.get(id)
    }
}

fn snapshot(model: &ConfigModel) -> Baseline {
    model
        .schema()
        .fields()
        .filter(|f| f.kind != FieldKind::Static)
        .filter_map(|f| {
            model
                .get(&f.section, &f.key)
                .map(|e| (f.id.clone(), (e.value.clone(), e.active)))
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::encoding::TextEncoding;
    use crate::placeholders::PlaceholderContext;
    use crate::schema::Schema;

    pub(crate) const TEST_SCHEMA: &str = r#"
[[section]]
name = "mysqld"
required = true

[[section.field]]
key = "port"
label = "Port"
type = "number"
default = 3306

[[section.field]]
key = "log-bin"
label = "Binary Log"
type = "text"
default = "mysql-bin"
required = false

[[section.field]]
key = "skip-name-resolve"
type = "checkbox"
default = false
required = false

[[section.field]]
key = "note"
type = "static"
tooltip = "Logs live next to the data directory."

[[section.field]]
key = "default-storage-engine"
type = "select"
options = ["INNODB", "MyISAM", "MEMORY"]
default = "INNODB"
required = false

[[section.field]]
key = "sql_mode"
type = "multiselect"
options = ["STRICT_TRANS_TABLES", "NO_ZERO_DATE", "ONLY_FULL_GROUP_BY"]
default = "STRICT_TRANS_TABLES"
required = false

[[section.field]]
key = "sort_buffer_size"
type = "bytesize"
default = "256K"
min = "32K"
max = "1G"

[[section]]
name = "mysql"

[[section.field]]
key = "no-beep"
type = "raw"
default = "no-beep"
required = false
"#;

    pub(crate) fn test_app(text: &str) -> App {
        let context = PlaceholderContext::new("/opt/mysql", 8 * 1024 * 1024 * 1024);
        let schema = Arc::new(Schema::from_toml_str(TEST_SCHEMA, &context).unwrap());
        let model =
            ConfigModel::from_text("/etc/mysql/my.ini", text, TextEncoding::default(), schema);
        App::new(model)
    }

    #[test]
    fn test_app_starts_browsing() {
        let app = test_app("");
        assert_eq!(app.state, AppState::Browsing);
        assert_eq!(app.selected_section, 0);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_quit_without_changes_is_immediate() {
        let mut app = test_app("[mysqld]\nport = 3306\n");
        app.request_quit();
        assert!(app.should_quit);
    }

    #[test]
    fn test_quit_with_changes_asks_first() {
        let mut app = test_app("[mysqld]\nport = 3306\n");
        app.model.set("mysqld", "port", "3307").unwrap();
        app.request_quit();
        assert!(!app.should_quit);
        assert_eq!(app.state, AppState::ConfirmQuit);
        app.cancel_quit();
        assert_eq!(app.state, AppState::Browsing);
    }

    #[test]
    fn test_modified_marker_clears_on_save() {
        let mut app = test_app("[mysqld]\nport = 3306\n");
        let port = FieldId::new("mysqld", "port");
        assert!(!app.is_modified(&port));
        app.model.set("mysqld", "port", "3310").unwrap();
        assert!(app.is_modified(&port));
        app.mark_saved();
        assert!(!app.is_modified(&port));
    }
}
