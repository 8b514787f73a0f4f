//! Form navigation and field editing.

use log::debug;

use crate::error::MycnfError;
use crate::schema::{FieldKind, FieldSchema, SchemaSection};
use crate::values::{display_value, FieldValue};

use super::super::text_input::TextInput;
use super::{App, AppState, ChoiceListState, FieldRow};

impl App {
    /// Number of schema sections shown in the form.
    pub fn section_count(&self) -> usize {
        self.model.schema().sections().len()
    }

    /// The selected schema section.
    pub fn current_section(&self) -> Option<&SchemaSection> {
        self.model.schema().sections().get(self.selected_section)
    }

    /// The selected field.
    pub fn current_field(&self) -> Option<FieldSchema> {
        self.current_section()?
            .fields
            .get(self.selected_field)
            .cloned()
    }

    fn field_count(&self) -> usize {
        self.current_section().map(|s| s.fields.len()).unwrap_or(0)
    }

    /// Navigates to the next section.
    pub fn next_section(&mut self) {
        let section_count = self.section_count();
        if section_count > 0 {
            self.selected_section = (self.selected_section + 1) % section_count;
            self.selected_field = 0;
        }
    }

    /// Navigates to the previous section.
    pub fn prev_section(&mut self) {
        let section_count = self.section_count();
        if section_count > 0 {
            self.selected_section = if self.selected_section == 0 {
                section_count - 1
            } else {
                self.selected_section - 1
            };
            self.selected_field = 0;
        }
    }

    /// Navigates to the next field in the current section.
    pub fn next_field(&mut self) {
        let field_count = self.field_count();
        if field_count > 0 {
            self.selected_field = (self.selected_field + 1) % field_count;
        }
    }

    /// Navigates to the previous field in the current section.
    pub fn prev_field(&mut self) {
        let field_count = self.field_count();
        if field_count > 0 {
            self.selected_field = if self.selected_field == 0 {
                field_count - 1
            } else {
                self.selected_field - 1
            };
        }
    }

    /// Acts on the selected field.
    ///
    /// Flags flip, selects move to the next option, multi-selects open the
    /// item picker and everything else starts text editing.
    pub fn edit_current_field(&mut self) {
        let Some(field) = self.current_field() else {
            return;
        };
        let value = self.model.value(&field.section, &field.key);

        match &field.kind {
            FieldKind::Static => self.set_status("This field is read-only"),
            FieldKind::Checkbox | FieldKind::Raw => {
                let current = value.and_then(|v| v.as_bool()).unwrap_or(false);
                self.apply_value(&field, &FieldValue::Bool(!current).to_ini_string());
            }
            FieldKind::Select { options } => {
                let current = match value {
                    Some(FieldValue::Choice(choice)) => choice,
                    _ => field.default.clone(),
                };
                let next = options
                    .iter()
                    .position(|o| o.eq_ignore_ascii_case(&current))
                    .map(|i| (i + 1) % options.len())
                    .unwrap_or(0);
                if let Some(option) = options.get(next) {
                    self.apply_value(&field, option);
                }
            }
            FieldKind::MultiSelect { options } => {
                let selected_items = match value {
                    Some(FieldValue::Multi(items)) => items
                        .into_iter()
                        .filter_map(|item| {
                            options.iter().find(|o| o.eq_ignore_ascii_case(&item)).cloned()
                        })
                        .collect(),
                    _ => Vec::new(),
                };
                self.state = AppState::ChoiceList(ChoiceListState {
                    field: field.id.clone(),
                    label: field.label.clone(),
                    all_items: options.clone(),
                    selected_items,
                    cursor_index: 0,
                    scroll_offset: 0,
                });
            }
            _ => {
                let mut input = TextInput::new();
                input.set_text(value.map(|v| v.to_ini_string()).unwrap_or_default());
                self.state = AppState::Editing { input };
            }
        }
    }

    /// Validates `text` and stores it for `field`.
    ///
    /// Rejections are remembered per field and shown by the form.
    pub(crate) fn apply_value(&mut self, field: &FieldSchema, text: &str) -> bool {
        match self.model.set(&field.section, &field.key, text) {
            Ok(()) => {
                self.validation_errors.remove(&field.id);
                true
            }
            Err(MycnfError::InvalidValue { reason, .. }) => {
                debug!("Rejected {} for {}: {}", text, field.id, reason);
                self.validation_errors.insert(field.id.clone(), reason);
                false
            }
            Err(e) => {
                self.set_status(e.to_string());
                false
            }
        }
    }

    /// Leaves text editing without storing anything.
    pub fn cancel_field_edit(&mut self) {
        if matches!(self.state, AppState::Editing { .. }) {
            if let Some(field) = self.current_field() {
                self.validation_errors.remove(&field.id);
            }
            self.state = AppState::Browsing;
        }
    }

    /// Stores the typed text. Invalid input keeps the editor open.
    pub fn confirm_field_edit(&mut self) {
        let text = match &self.state {
            AppState::Editing { input } => input.get_text().to_string(),
            _ => return,
        };
        let Some(field) = self.current_field() else {
            self.state = AppState::Browsing;
            return;
        };
        if self.apply_value(&field, &text) {
            self.state = AppState::Browsing;
        }
    }

    /// Inserts a character in the text being edited.
    pub fn input_char(&mut self, c: char) {
        if let AppState::Editing { input } = &mut self.state {
            input.insert_char(c);
        }
    }

    /// Deletes the character before the cursor.
    pub fn input_backspace(&mut self) {
        if let AppState::Editing { input } = &mut self.state {
            input.backspace();
        }
    }

    /// Moves the text cursor one character left.
    pub fn input_cursor_left(&mut self) {
        if let AppState::Editing { input } = &mut self.state {
            input.move_cursor_left();
        }
    }

    /// Moves the text cursor one character right.
    pub fn input_cursor_right(&mut self) {
        if let AppState::Editing { input } = &mut self.state {
            input.move_cursor_right();
        }
    }

    /// Flips the selected field between written and commented out.
    pub fn toggle_current_field(&mut self) {
        let Some(field) = self.current_field() else {
            return;
        };
        match self.model.toggle_active(&field.section, &field.key) {
            Ok(true) => self.set_status(format!("{} enabled", field.key)),
            Ok(false) => self.set_status(format!("{} disabled", field.key)),
            Err(e) => self.set_status(e.to_string()),
        }
    }

    /// Restores the selected field's default value.
    pub fn reset_current_field(&mut self) {
        let Some(field) = self.current_field() else {
            return;
        };
        if field.kind == FieldKind::Static {
            return;
        }
        match self.model.reset(&field.section, &field.key) {
            Ok(()) => {
                self.validation_errors.remove(&field.id);
                self.set_status(format!("{} restored to its default", field.key));
            }
            Err(e) => self.set_status(e.to_string()),
        }
    }

    /// Rows for every field of the selected section.
    pub fn field_rows(&self) -> Vec<FieldRow> {
        let Some(section) = self.current_section() else {
            return Vec::new();
        };
        section.fields.iter().map(|f| self.field_row(f)).collect()
    }

    fn field_row(&self, field: &FieldSchema) -> FieldRow {
        let is_static = field.kind == FieldKind::Static;
        let value = self
            .model
            .value(&field.section, &field.key)
            .unwrap_or(FieldValue::Static);
        let active = match field.kind {
            FieldKind::Static => true,
            FieldKind::Raw => value.as_bool().unwrap_or(false),
            _ => {
                field.required
                    || self
                        .model
                        .get(&field.section, &field.key)
                        .map(|e| e.active)
                        .unwrap_or(false)
            }
        };

        FieldRow {
            label: field.label.clone(),
            key: field.key.clone(),
            value: display_value(&value, &field.kind),
            tooltip: field.tooltip.clone(),
            active,
            required: field.required,
            modified: !is_static && self.is_modified(&field.id),
            is_static,
            opens_modal: matches!(field.kind, FieldKind::MultiSelect { .. }),
            error: self.validation_errors.get(&field.id).cloned(),
        }
    }
}
