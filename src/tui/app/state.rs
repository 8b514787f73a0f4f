//! State definitions for the editor.
//!
//! The editor is a small state machine: browsing the form, editing one
//! field's text, picking items of a multi-select field, or confirming a quit
//! with unsaved changes.

use crate::schema::FieldId;

use super::super::text_input::TextInput;

/// The current state of the editor.
#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    /// Moving between sections and fields.
    Browsing,
    /// Typing a new value for the selected field.
    Editing {
        /// The text being typed.
        input: TextInput,
    },
    /// The item picker of a multi-select field is open.
    ChoiceList(ChoiceListState),
    /// Quit was requested while the model has unsaved changes.
    ConfirmQuit,
}

/// State of the multi-select item picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceListState {
    /// The field being edited.
    pub field: FieldId,
    /// Label shown as the modal title.
    pub label: String,
    /// Every option the field declares.
    pub all_items: Vec<String>,
    /// Options currently chosen, in the order they were chosen.
    pub selected_items: Vec<String>,
    /// Index of the highlighted option.
    pub cursor_index: usize,
    /// First visible option.
    pub scroll_offset: usize,
}

impl ChoiceListState {
    /// Rows visible in the picker before it scrolls.
    pub const VISIBLE_HEIGHT: usize = 15;
}

/// What the form panel needs to draw one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRow {
    /// The field's label.
    pub label: String,
    /// The INI key.
    pub key: String,
    /// Value as shown to the user.
    pub value: String,
    /// Help text.
    pub tooltip: String,
    /// Whether the key is written uncommented.
    pub active: bool,
    /// Whether the field can never be disabled.
    pub required: bool,
    /// Changed since load or the last save.
    pub modified: bool,
    /// Display-only row.
    pub is_static: bool,
    /// Enter opens the item picker.
    pub opens_modal: bool,
    /// Last rejection of typed input.
    pub error: Option<String>,
}
