//! UI Views - flowchart cards, text outline, header and footer

pub mod flowchart;
pub mod outline;

pub use flowchart::{render_flowchart, Viewport};
pub use outline::render_outline;

use crate::app::{App, DisplayMode};
use crate::core::{Point, Priority, TaskStatus};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::rc::Rc;

fn split_screen(area: Rect) -> Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(5),    // Body
            Constraint::Length(3), // Footer
        ])
        .split(area)
}

/// Area between header and footer
pub fn body_area(screen: Rect) -> Rect {
    split_screen(screen)[1]
}

/// Layout point under a screen cell, if the flowchart is drawn there
pub fn plane_point(app: &App, screen: Rect, column: u16, row: u16) -> Option<Point> {
    if app.mode != DisplayMode::Cards {
        return None;
    }
    let layout = app.layout();
    let (inner, viewport) = flowchart::viewport_for(app, &layout, body_area(screen));
    viewport.to_plane(inner, column, row)
}

/// Render the whole screen
pub fn render(f: &mut Frame, app: &App) {
    let chunks = split_screen(f.area());

    render_header(f, app, chunks[0]);
    if app.visible_roots().is_empty() {
        let empty = Paragraph::new(app.view.empty_message())
            .block(Block::default().borders(Borders::ALL))
            .style(Style::default().fg(Color::DarkGray));
        f.render_widget(empty, chunks[1]);
    } else {
        match app.mode {
            DisplayMode::Cards => render_flowchart(f, app, chunks[1]),
            DisplayMode::Text => render_outline(f, app, chunks[1]),
        }
    }
    render_footer(f, app, chunks[2]);
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let roots = app.visible_roots().len();
    let line = Line::from(vec![
        Span::styled(
            "flowtask",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            " | view: {} | sort: {} | {} | zoom {}% | {} | {} root(s)",
            app.view,
            app.sort,
            app.mode,
            app.zoom.percent(),
            app.convention,
            roots
        )),
    ]);

    let header = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let footer = match (&app.status, app.dragging()) {
        (_, Some(id)) => Paragraph::new(format!(
            "Moving {}: release on another root to swap",
            id.short()
        ))
        .style(Style::default().fg(Color::Cyan)),
        (Some(status), None) => {
            Paragraph::new(status.as_str()).style(Style::default().fg(Color::Yellow))
        }
        (None, None) => Paragraph::new(
            "q: Quit | Tab: View | s: Sort | m: Mode | c: Axes | +/-: Zoom | ←/→: Pan | \
             [/]: Priority | Shift+↑/↓ or drag: Swap | d: Done | z: Stash | x: Delete",
        )
        .style(Style::default().fg(Color::DarkGray)),
    };
    f.render_widget(footer.block(Block::default().borders(Borders::ALL)), area);
}

/// Display colour for a task. Active tasks are banded by priority.
pub(crate) fn task_color(status: TaskStatus, priority: Priority) -> Color {
    match status {
        TaskStatus::Active => match priority.value() {
            i64::MIN..=1 => Color::Red,
            2..=3 => Color::LightRed,
            4..=5 => Color::Yellow,
            _ => Color::White,
        },
        TaskStatus::Done => Color::Green,
        TaskStatus::Stashed => Color::DarkGray,
    }
}
