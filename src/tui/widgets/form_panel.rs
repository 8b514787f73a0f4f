//! Form panel widget.
//!
//! Draws the section list on the left and the fields of the selected section
//! on the right, keeping the selected field scrolled into view.

use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Padding, Paragraph};

use crate::tui::app::FieldRow;
use crate::tui::colors::TuiColors;
use crate::tui::text_input::TextInput;

/// Form panel widget for rendering the option file form.
#[derive(Debug, Default)]
pub struct FormPanel;

impl FormPanel {
    /// Creates a new form panel widget.
    pub fn new() -> Self {
        Self
    }

    /// Renders the form panel.
    ///
    /// # Arguments
    ///
    /// * `sections` - Names of all sections, in schema order
    /// * `selected_section` - Index of the selected section
    /// * `rows` - Fields of the selected section
    /// * `selected_field` - Index of the selected field
    /// * `editing` - The text being typed for the selected field, if any
    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &self,
        area: Rect,
        buf: &mut Buffer,
        sections: &[String],
        selected_section: usize,
        rows: &[FieldRow],
        selected_field: usize,
        editing: Option<&TextInput>,
        colors: &TuiColors,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(22), Constraint::Min(40)])
            .split(area);

        self.render_sections_list(chunks[0], buf, sections, selected_section, colors);

        let title = sections
            .get(selected_section)
            .map(|s| format!(" [{}] ", s))
            .unwrap_or_default();
        self.render_fields(chunks[1], buf, &title, rows, selected_field, editing, colors);
    }

    fn render_sections_list(
        &self,
        area: Rect,
        buf: &mut Buffer,
        sections: &[String],
        selected_section: usize,
        colors: &TuiColors,
    ) {
        let block = Block::default()
            .title(" Sections ")
            .title_style(colors.title)
            .borders(Borders::ALL)
            .border_style(colors.border);

        let inner = block.inner(area);
        block.render(area, buf);

        for (i, name) in sections.iter().enumerate() {
            if i >= inner.height as usize {
                break;
            }
            let is_selected = i == selected_section;
            let style = if is_selected {
                colors
                    .accent
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::REVERSED)
            } else {
                colors.text
            };
            let prefix = if is_selected { "> " } else { "  " };
            let span = Span::styled(format!("{}{}", prefix, name), style);
            buf.set_span(inner.x, inner.y + i as u16, &span, inner.width);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn render_fields(
        &self,
        area: Rect,
        buf: &mut Buffer,
        title: &str,
        rows: &[FieldRow],
        selected_field: usize,
        editing: Option<&TextInput>,
        colors: &TuiColors,
    ) {
        let block = Block::default()
            .title(title.to_string())
            .title_style(colors.title)
            .borders(Borders::ALL)
            .border_style(colors.border)
            .padding(Padding::horizontal(1));

        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines: Vec<Line> = Vec::new();
        let mut selected_span = (0, 0);

        for (i, row) in rows.iter().enumerate() {
            let is_selected = i == selected_field;
            let start = lines.len();
            lines.extend(self.field_lines(row, is_selected, editing.filter(|_| is_selected), colors));
            if is_selected {
                selected_span = (start, lines.len());
            }
        }

        let offset = scroll_offset(selected_span, inner.height as usize);
        let visible: Vec<Line> = lines
            .into_iter()
            .skip(offset)
            .take(inner.height as usize)
            .collect();
        Paragraph::new(visible).render(inner, buf);
    }

    fn field_lines<'a>(
        &self,
        row: &'a FieldRow,
        is_selected: bool,
        editing: Option<&TextInput>,
        colors: &TuiColors,
    ) -> Vec<Line<'a>> {
        let mut lines = Vec::new();
        let prefix = if is_selected { "> " } else { "  " };

        if row.is_static {
            let style = if is_selected { colors.accent } else { colors.info };
            lines.push(Line::from(Span::styled(
                format!("{}{}", prefix, row.tooltip),
                style,
            )));
            lines.push(Line::from(""));
            return lines;
        }

        let label_style = match (is_selected, row.error.is_some()) {
            (true, true) => colors.error.add_modifier(Modifier::BOLD),
            (true, false) => colors.accent.add_modifier(Modifier::BOLD),
            (false, true) => colors.error,
            (false, false) => colors.label,
        };
        let mut label = vec![
            Span::styled(format!("{}{}", prefix, row.label), label_style),
            Span::styled(format!(" ({})", row.key), colors.muted),
        ];
        if row.modified {
            label.push(Span::styled(" *", colors.accent));
        }
        label.push(Span::styled(state_marker(row), state_style(row, colors)));
        lines.push(Line::from(label));

        match editing {
            Some(input) => {
                let (before, after) = input.split_at_cursor();
                lines.push(Line::from(Span::styled(
                    format!("    {}|{}", before, after),
                    colors.highlight,
                )));
            }
            None => {
                let style = if row.opens_modal {
                    colors.info
                } else if row.active {
                    colors.text
                } else {
                    colors.muted
                };
                let hint = if row.opens_modal { "  [Enter to choose]" } else { "" };
                lines.push(Line::from(Span::styled(
                    format!("    {}{}", row.value, hint),
                    style,
                )));
            }
        }

        if let Some(error) = &row.error {
            lines.push(Line::from(Span::styled(
                format!("    Error: {}", error),
                colors.error,
            )));
        }

        lines.push(Line::from(Span::styled(
            format!("    {}", row.tooltip),
            colors.muted,
        )));
        lines.push(Line::from(""));
        lines
    }
}

fn state_marker(row: &FieldRow) -> &'static str {
    if row.required {
        "  [required]"
    } else if row.active {
        "  [on]"
    } else {
        "  [off]"
    }
}

fn state_style(row: &FieldRow, colors: &TuiColors) -> Style {
    if row.required {
        colors.muted
    } else if row.active {
        colors.success
    } else {
        colors.warning
    }
}

/// First line to draw so that the lines `start..end` fit in `height`.
fn scroll_offset((start, end): (usize, usize), height: usize) -> usize {
    if height == 0 || end <= height {
        0
    } else if end - start >= height {
        start
    } else {
        end - height
    }
}

/// Renders the form screen: outer frame, form panel and key hints.
#[allow(clippy::too_many_arguments)]
pub fn render_form_screen(
    area: Rect,
    buf: &mut Buffer,
    file_name: &str,
    has_changes: bool,
    sections: &[String],
    selected_section: usize,
    rows: &[FieldRow],
    selected_field: usize,
    editing: Option<&TextInput>,
    colors: &TuiColors,
) {
    let title = if has_changes {
        format!(" {} (modified) ", file_name)
    } else {
        format!(" {} ", file_name)
    };

    let outer_block = Block::default()
        .title(title)
        .title_style(colors.title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(colors.accent);

    let inner = outer_block.inner(area);
    outer_block.render(area, buf);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(1)])
        .split(inner);

    FormPanel::new().render(
        chunks[0],
        buf,
        sections,
        selected_section,
        rows,
        selected_field,
        editing,
        colors,
    );

    let hints: &[(&str, &str)] = if editing.is_some() {
        &[("[Enter]", " Store  "), ("[Esc]", " Cancel")]
    } else {
        &[
            ("[Tab]", " Section  "),
            ("[Up/Down]", " Field  "),
            ("[Enter]", " Edit  "),
            ("[d]", " On/Off  "),
            ("[r]", " Reset  "),
            ("[Ctrl+S]", " Save  "),
            ("[?]", " Help  "),
            ("[q]", " Quit"),
        ]
    };
    let footer: Vec<Span> = hints
        .iter()
        .flat_map(|(key, what)| {
            [
                Span::styled(*key, colors.accent),
                Span::styled(*what, colors.muted),
            ]
        })
        .collect();
    Paragraph::new(Line::from(footer)).render(chunks[1], buf);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(required: bool, active: bool) -> FieldRow {
        FieldRow {
            label: "Port".to_string(),
            key: "port".to_string(),
            value: "3306".to_string(),
            tooltip: "TCP/IP Port".to_string(),
            active,
            required,
            modified: false,
            is_static: false,
            opens_modal: false,
            error: None,
        }
    }

    #[test]
    fn test_state_marker() {
        assert_eq!(state_marker(&row(true, true)), "  [required]");
        assert_eq!(state_marker(&row(false, true)), "  [on]");
        assert_eq!(state_marker(&row(false, false)), "  [off]");
    }

    #[test]
    fn test_scroll_keeps_selection_visible() {
        assert_eq!(scroll_offset((0, 4), 10), 0);
        assert_eq!(scroll_offset((20, 24), 10), 14);
        assert_eq!(scroll_offset((20, 40), 10), 20);
        assert_eq!(scroll_offset((5, 9), 0), 0);
    }

    #[test]
    fn test_error_line_rendered() {
        let mut r = row(false, true);
        r.error = Some("Must be a whole number".to_string());
        let lines = FormPanel::new().field_lines(&r, true, None, &TuiColors::default());
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[2].to_string(), "    Error: Must be a whole number");
    }

    #[test]
    fn test_render_into_buffer() {
        let area = Rect::new(0, 0, 80, 20);
        let mut buf = Buffer::empty(area);
        render_form_screen(
            area,
            &mut buf,
            "my.ini",
            true,
            &["mysqld".to_string()],
            0,
            &[row(true, true)],
            0,
            None,
            &TuiColors::default(),
        );
        let text: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("my.ini (modified)"));
        assert!(text.contains("> Port"));
    }
}
