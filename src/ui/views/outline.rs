//! Outline view - text-mode tree of the visible roots

use super::task_color;
use crate::app::App;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

/// Render the visible roots as indented trees, one block per root
pub fn render_outline(f: &mut Frame, app: &App, area: Rect) {
    let selected = app.selected_root();
    let mut items: Vec<ListItem> = Vec::new();
    let mut state = ListState::default();

    for (i, block) in app.outline().into_iter().enumerate() {
        if i > 0 {
            items.push(ListItem::new(Line::from(Span::styled(
                "─".repeat(area.width.saturating_sub(2) as usize),
                Style::default().fg(Color::DarkGray),
            ))));
        }
        let is_selected = block.first().map(|l| &l.id) == selected.as_ref();
        if is_selected {
            state.select(Some(items.len()));
        }

        for line in block {
            let mut title_style = Style::default().fg(task_color(line.status, line.priority));
            if line.depth == 0 {
                title_style = title_style.add_modifier(Modifier::BOLD);
            }
            items.push(ListItem::new(Line::from(vec![
                Span::styled(line.guide.clone(), Style::default().fg(Color::DarkGray)),
                Span::styled(line.label(), title_style),
                Span::styled(
                    format!("  {}", line.priority),
                    Style::default().fg(Color::DarkGray),
                ),
            ])));
        }
    }

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Outline"))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    f.render_stateful_widget(list, area, &mut state);
}
