//! Item picker for multi-select fields.

use super::{App, AppState, ChoiceListState};

impl App {
    /// Moves the cursor up in the item picker.
    pub fn choice_list_cursor_up(&mut self) {
        if let AppState::ChoiceList(list) = &mut self.state {
            if list.cursor_index > 0 {
                list.cursor_index -= 1;
                if list.cursor_index < list.scroll_offset {
                    list.scroll_offset = list.cursor_index;
                }
            }
        }
    }

    /// Moves the cursor down in the item picker.
    pub fn choice_list_cursor_down(&mut self) {
        if let AppState::ChoiceList(list) = &mut self.state {
            if list.cursor_index < list.all_items.len().saturating_sub(1) {
                list.cursor_index += 1;
                let visible = ChoiceListState::VISIBLE_HEIGHT;
                if list.cursor_index >= list.scroll_offset + visible {
                    list.scroll_offset = list.cursor_index.saturating_sub(visible - 1);
                }
            }
        }
    }

    /// Chooses or drops the highlighted option.
    pub fn choice_list_toggle_item(&mut self) {
        if let AppState::ChoiceList(list) = &mut self.state {
            if let Some(item) = list.all_items.get(list.cursor_index) {
                if list.selected_items.contains(item) {
                    list.selected_items.retain(|x| x != item);
                } else {
                    list.selected_items.push(item.clone());
                }
            }
        }
    }

    /// Chooses every option.
    pub fn choice_list_select_all(&mut self) {
        if let AppState::ChoiceList(list) = &mut self.state {
            list.selected_items = list.all_items.clone();
        }
    }

    /// Drops every option.
    pub fn choice_list_select_none(&mut self) {
        if let AppState::ChoiceList(list) = &mut self.state {
            list.selected_items.clear();
        }
    }

    /// Closes the item picker, storing the chosen options when `apply` is set.
    pub fn close_choice_list(&mut self, apply: bool) {
        let state = std::mem::replace(&mut self.state, AppState::Browsing);
        let AppState::ChoiceList(list) = state else {
            self.state = state;
            return;
        };
        if !apply {
            return;
        }
        let field = self
            .model
            .schema()
            .field(&list.field)
            .cloned();
        if let Some(field) = field {
            self.apply_value(&field, &list.selected_items.join(","));
        }
    }
}
