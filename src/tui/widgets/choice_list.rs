//! Item picker modal for multi-select fields.
//!
//! Options are fixed by the schema; they can only be chosen or dropped.

use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph};

use crate::tui::app::ChoiceListState;
use crate::tui::colors::TuiColors;

/// Picker widget for choosing options of a multi-select field.
#[derive(Debug, Default)]
pub struct ChoiceList;

impl ChoiceList {
    /// Creates a new picker widget.
    pub fn new() -> Self {
        Self
    }

    /// Renders the picker as a modal centred in `area`.
    pub fn render(&self, area: Rect, buf: &mut Buffer, list: &ChoiceListState, colors: &TuiColors) {
        let modal_area = crate::tui::ui::centered_rect(area, 60, 80);
        Clear.render(modal_area, buf);

        let block = Block::default()
            .title(format!(" {} ", list.label))
            .title_style(colors.title)
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(colors.accent)
            .padding(Padding::horizontal(1));

        let inner = block.inner(modal_area);
        block.render(modal_area, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(5),
                Constraint::Length(2),
            ])
            .split(inner);

        Paragraph::new(Span::styled(summary(list), colors.label))
            .alignment(Alignment::Center)
            .render(chunks[0], buf);

        self.render_items(chunks[1], buf, list, colors);

        Paragraph::new(Line::from(vec![
            Span::styled("[Space]", colors.accent),
            Span::styled(" Toggle  ", colors.muted),
            Span::styled("[a]", colors.accent),
            Span::styled(" All  ", colors.muted),
            Span::styled("[n]", colors.accent),
            Span::styled(" None  ", colors.muted),
            Span::styled("[Enter]", colors.accent),
            Span::styled(" Apply  ", colors.muted),
            Span::styled("[Esc]", colors.accent),
            Span::styled(" Cancel", colors.muted),
        ]))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);
    }

    fn render_items(&self, area: Rect, buf: &mut Buffer, list: &ChoiceListState, colors: &TuiColors) {
        let block = Block::default()
            .title(" Options ")
            .title_style(colors.label)
            .borders(Borders::ALL)
            .border_style(colors.border);

        let inner = block.inner(area);
        block.render(area, buf);

        let visible_height = inner.height as usize;
        for (item_idx, item) in list
            .all_items
            .iter()
            .enumerate()
            .skip(list.scroll_offset)
            .take(visible_height)
        {
            let display_idx = item_idx - list.scroll_offset;
            let is_cursor = item_idx == list.cursor_index;
            let is_checked = list.selected_items.contains(item);

            let checkbox = if is_checked { "[x]" } else { "[ ]" };
            let prefix = if is_cursor { "> " } else { "  " };
            let style = if is_cursor {
                colors
                    .accent
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::REVERSED)
            } else if is_checked {
                colors.success
            } else {
                colors.muted
            };

            let span = Span::styled(format!("{}{} {}", prefix, checkbox, item), style);
            buf.set_span(inner.x, inner.y + display_idx as u16, &span, inner.width);
        }

        if list.scroll_offset > 0 && inner.width > 2 {
            let up = Span::styled("^", colors.accent);
            buf.set_span(inner.x + inner.width - 2, inner.y, &up, 1);
        }
        if list.scroll_offset + visible_height < list.all_items.len() && inner.width > 2 && inner.height > 0 {
            let down = Span::styled("v", colors.accent);
            buf.set_span(inner.x + inner.width - 2, inner.y + inner.height - 1, &down, 1);
        }
    }
}

fn summary(list: &ChoiceListState) -> String {
    let chosen = list.selected_items.len();
    if chosen == 0 {
        "Nothing chosen".to_string()
    } else if chosen == list.all_items.len() {
        format!("All {} options chosen", chosen)
    } else {
        format!("{} of {} options chosen", chosen, list.all_items.len())
    }
}
