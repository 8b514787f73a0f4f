//! Drawing the editor.

use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph, Wrap};

use super::app::{App, AppState};
use super::colors::TuiColors;
use super::widgets::{render_form_screen, ChoiceList};

/// Help overlay width as a percentage of the screen.
const HELP_WIDTH_PERCENT: u16 = 60;
/// Help overlay height as a percentage of the screen.
const HELP_HEIGHT_PERCENT: u16 = 70;

/// Renders the whole editor for the current state.
pub fn draw(frame: &mut Frame, app: &App, colors: &TuiColors) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(12), Constraint::Length(1)])
        .split(area);

    let file_name = app
        .model
        .path()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| app.model.path().display().to_string());
    let sections: Vec<String> = app
        .model
        .schema()
        .sections()
        .iter()
        .map(|s| s.name.clone())
        .collect();
    let rows = app.field_rows();
    let editing = match &app.state {
        AppState::Editing { input } => Some(input),
        _ => None,
    };

    render_form_screen(
        chunks[0],
        frame.buffer_mut(),
        &file_name,
        app.model.is_dirty(),
        &sections,
        app.selected_section,
        &rows,
        app.selected_field,
        editing,
        colors,
    );

    draw_status_line(frame, chunks[1], app, colors);

    match &app.state {
        AppState::ChoiceList(list) => {
            ChoiceList::new().render(area, frame.buffer_mut(), list, colors);
        }
        AppState::ConfirmQuit => draw_confirm_quit(frame, area, colors),
        AppState::Browsing | AppState::Editing { .. } => {}
    }

    if app.show_help {
        draw_help_overlay(frame, area, colors);
    }
}

fn draw_status_line(frame: &mut Frame, area: Rect, app: &App, colors: &TuiColors) {
    let line = match &app.status_message {
        Some(message) => Line::from(Span::styled(message.as_str(), colors.success)),
        None => Line::from(Span::styled(
            app.model.path().display().to_string(),
            colors.muted,
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_confirm_quit(frame: &mut Frame, area: Rect, colors: &TuiColors) {
    let modal_area = centered_rect(area, 50, 25);
    frame.render_widget(Clear, modal_area);

    let block = Block::default()
        .title(" Unsaved changes ")
        .title_style(colors.highlight)
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(colors.accent)
        .padding(Padding::new(2, 2, 1, 1));

    let inner = block.inner(modal_area);
    frame.render_widget(block, modal_area);

    let lines = vec![
        Line::from(Span::styled(
            "The option file has changes that are not saved.",
            colors.text,
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(
                " [S] ",
                colors
                    .success
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::REVERSED),
            ),
            Span::styled(" Save and quit  ", colors.muted),
            Span::styled(
                " [Q] ",
                colors
                    .error
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::REVERSED),
            ),
            Span::styled(" Discard  ", colors.muted),
            Span::styled(" [Esc] ", colors.accent.add_modifier(Modifier::BOLD)),
            Span::styled(" Back", colors.muted),
        ]),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false }),
        inner,
    );
}

fn draw_help_overlay(frame: &mut Frame, area: Rect, colors: &TuiColors) {
    let popup_area = centered_rect(area, HELP_WIDTH_PERCENT, HELP_HEIGHT_PERCENT);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" Help ")
        .title_style(colors.title)
        .borders(Borders::ALL)
        .border_style(colors.accent);

    let inner_area = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let keybindings: [(&str, &str); 17] = [
        ("Navigation", ""),
        ("Tab / Shift+Tab", "Cycle through sections"),
        ("← / h, → / l", "Previous / next section"),
        ("↑ / k, ↓ / j", "Previous / next field"),
        ("", ""),
        ("Editing", ""),
        ("Enter / Space", "Edit, flip or cycle the field"),
        ("d", "Enable or comment out the field"),
        ("r", "Restore the default value"),
        ("Esc", "Cancel the edit"),
        ("", ""),
        ("File", ""),
        ("Ctrl+S", "Save the option file"),
        ("q / Esc", "Quit, asking first if unsaved"),
        ("Ctrl+C", "Quit without saving"),
        ("", ""),
        ("?", "Close this help"),
    ];

    let mut lines = vec![
        Line::from(Span::styled(
            "Keybindings",
            colors.highlight.add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    for (key, description) in keybindings {
        if key.is_empty() && description.is_empty() {
            lines.push(Line::from(""));
        } else if description.is_empty() {
            lines.push(Line::from(Span::styled(
                key,
                colors.label.add_modifier(Modifier::BOLD),
            )));
        } else {
            lines.push(Line::from(vec![
                Span::styled(format!("{:16}", key), colors.accent),
                Span::styled(description, colors.text),
            ]));
        }
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner_area);
}

/// Creates a rectangle centred in `area`, sized as a percentage of it.
pub fn centered_rect(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let popup_width = area.width * percent_x / 100;
    let popup_height = area.height * percent_y / 100;

    let x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_height)) / 2;

    Rect::new(x, y, popup_width, popup_height)
}
