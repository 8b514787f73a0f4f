//! Keyboard input handling for the editor.
//!
//! Handlers only change [`App`] state. Anything that touches the disk is
//! returned as an [`Action`] for the run loop to perform.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{App, AppState};

/// Actions the run loop performs after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Nothing to do.
    None,
    /// Write the option file.
    Save,
    /// Write the option file, then quit if that worked.
    SaveAndQuit,
}

/// Handles a key press and returns what the run loop should do next.
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return Action::None;
    }

    if app.show_help {
        app.show_help = false;
        return Action::None;
    }

    match app.state {
        AppState::Browsing => handle_browsing_keys(app, key),
        AppState::Editing { .. } => handle_editing_keys(app, key),
        AppState::ChoiceList(_) => handle_choice_list_keys(app, key),
        AppState::ConfirmQuit => handle_confirm_quit_keys(app, key),
    }
}

fn is_save(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('s') | KeyCode::Char('S'))
}

fn handle_browsing_keys(app: &mut App, key: KeyEvent) -> Action {
    if is_save(&key) {
        return Action::Save;
    }
    app.clear_status();

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.request_quit(),
        KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => app.next_section(),
        KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => app.prev_section(),
        KeyCode::Down | KeyCode::Char('j') => app.next_field(),
        KeyCode::Up | KeyCode::Char('k') => app.prev_field(),
        KeyCode::Enter | KeyCode::Char(' ') => app.edit_current_field(),
        KeyCode::Char('d') => app.toggle_current_field(),
        KeyCode::Char('r') => app.reset_current_field(),
        KeyCode::Char('?') => app.toggle_help(),
        _ => {}
    }
    Action::None
}

fn handle_editing_keys(app: &mut App, key: KeyEvent) -> Action {
    if is_save(&key) {
        app.confirm_field_edit();
        return if app.state == AppState::Browsing {
            Action::Save
        } else {
            Action::None
        };
    }

    match key.code {
        KeyCode::Esc => app.cancel_field_edit(),
        KeyCode::Enter => app.confirm_field_edit(),
        KeyCode::Backspace => app.input_backspace(),
        KeyCode::Left => app.input_cursor_left(),
        KeyCode::Right => app.input_cursor_right(),
        KeyCode::Home | KeyCode::End | KeyCode::Delete => {
            if let AppState::Editing { input } = &mut app.state {
                match key.code {
                    KeyCode::Home => input.move_cursor_home(),
                    KeyCode::End => input.move_cursor_end(),
                    _ => input.delete(),
                }
            }
        }
        KeyCode::Char(c) => app.input_char(c),
        _ => {}
    }
    Action::None
}

fn handle_choice_list_keys(app: &mut App, key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.choice_list_cursor_up(),
        KeyCode::Down | KeyCode::Char('j') => app.choice_list_cursor_down(),
        KeyCode::Char(' ') => app.choice_list_toggle_item(),
        KeyCode::Char('a') => app.choice_list_select_all(),
        KeyCode::Char('n') => app.choice_list_select_none(),
        KeyCode::Enter => app.close_choice_list(true),
        KeyCode::Esc => app.close_choice_list(false),
        _ => {}
    }
    Action::None
}

fn handle_confirm_quit_keys(app: &mut App, key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Char('y') | KeyCode::Char('Y') => {
            Action::SaveAndQuit
        }
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Char('n') | KeyCode::Char('N') => {
            app.should_quit = true;
            Action::None
        }
        KeyCode::Esc => {
            app.cancel_quit();
            Action::None
        }
        _ => Action::None,
    }
}
