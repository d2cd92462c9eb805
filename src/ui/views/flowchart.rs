//! Flowchart view - task cards and connectors on a braille canvas

use super::task_color;
use crate::app::App;
use crate::core::{Layout, Marker, Point, Rect as CardRect};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    symbols,
    text::Line,
    widgets::{
        canvas::{Canvas, Line as CanvasLine, Rectangle},
        Block, Borders,
    },
    Frame,
};

/// Layout units covered by one terminal column
const UNITS_PER_COLUMN: f64 = 8.0;
/// Layout units covered by one terminal row
const UNITS_PER_ROW: f64 = 16.0;

/// Visible window of the layout plane, in layout units (y grows down)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// Window for `cols` x `rows` cells, scrolled just enough to show `focus`.
    /// `pan_x` scrolls further right when it is past the focus.
    pub fn follow(cols: u16, rows: u16, focus: Option<CardRect>, pan_x: f64) -> Self {
        let width = f64::from(cols) * UNITS_PER_COLUMN;
        let height = f64::from(rows) * UNITS_PER_ROW;
        let x = match focus {
            Some(card) if card.right() > width => (card.x - UNITS_PER_COLUMN).max(0.0),
            _ => 0.0,
        };
        let y = match focus {
            Some(card) if card.bottom() > height => (card.y - UNITS_PER_ROW).max(0.0),
            _ => 0.0,
        };
        Self {
            x: x.max(pan_x),
            y,
            width,
            height,
        }
    }

    /// Layout point at the centre of the cell at `column`, `row` in `inner`
    pub fn to_plane(&self, inner: Rect, column: u16, row: u16) -> Option<Point> {
        let inside = (inner.x..inner.right()).contains(&column)
            && (inner.y..inner.bottom()).contains(&row);
        if !inside {
            return None;
        }
        Some(Point::new(
            self.x + (f64::from(column - inner.x) + 0.5) * UNITS_PER_COLUMN,
            self.y + (f64::from(row - inner.y) + 0.5) * UNITS_PER_ROW,
        ))
    }

    /// Canvas bounds; the canvas y axis points up
    fn x_bounds(&self) -> [f64; 2] {
        [self.x, self.x + self.width]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-(self.y + self.height), -self.y]
    }
}

struct Card {
    rect: CardRect,
    title: String,
    detail: String,
    color: Color,
    /// Tree heads get a bold title
    head: bool,
}

/// Canvas cells inside `area` and the window they show
pub fn viewport_for(app: &App, layout: &Layout, area: Rect) -> (Rect, Viewport) {
    let focus = app.selected_root().and_then(|id| layout.rect(&id));
    let inner = Block::default().borders(Borders::ALL).inner(area);
    let viewport = Viewport::follow(inner.width, inner.height, focus, app.pan_x);
    (inner, viewport)
}

/// Render the visible roots as a flowchart
pub fn render_flowchart(f: &mut Frame, app: &App, area: Rect) {
    let layout = app.layout();
    let selected = app.selected_root();
    let (_, viewport) = viewport_for(app, &layout, area);

    let cards: Vec<Card> = layout
        .placements
        .iter()
        .filter_map(|p| {
            let task = app.store.get(&p.id)?;
            let color = if selected.as_ref() == Some(&p.id) {
                Color::Cyan
            } else {
                task_color(task.status(), task.priority)
            };
            let cols = (p.rect.width / UNITS_PER_COLUMN) as usize;
            Some(Card {
                rect: p.rect,
                title: fit(&format!("{} {}", task.status().icon(), task.title), cols.saturating_sub(2)),
                detail: fit(
                    &format!("{}  {}", task.priority, task.id.short()),
                    cols.saturating_sub(2),
                ),
                color,
                head: p.depth == 0,
            })
        })
        .collect();

    let canvas = Canvas::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Flowchart ({} cards)", layout.len())),
        )
        .marker(symbols::Marker::Braille)
        .x_bounds(viewport.x_bounds())
        .y_bounds(viewport.y_bounds())
        .paint(|ctx| {
            for connector in &layout.connectors {
                for (a, b) in connector.segments() {
                    ctx.draw(&CanvasLine {
                        x1: a.x,
                        y1: -a.y,
                        x2: b.x,
                        y2: -b.y,
                        color: Color::DarkGray,
                    });
                }
                if let Some(end) = connector.end() {
                    let glyph = match connector.marker {
                        Marker::Arrow => "▶",
                        Marker::Joint => "●",
                    };
                    ctx.print(end.x - UNITS_PER_COLUMN, -end.y, glyph);
                }
            }

            for card in &cards {
                let r = card.rect;
                ctx.draw(&Rectangle {
                    x: r.x,
                    y: -r.bottom(),
                    width: r.width,
                    height: r.height,
                    color: card.color,
                });
                let text_x = r.x + UNITS_PER_COLUMN;
                let mut style = Style::default().fg(card.color);
                if card.head {
                    style = style.add_modifier(Modifier::BOLD);
                }
                ctx.print(
                    text_x,
                    -(r.y + UNITS_PER_ROW),
                    Line::styled(card.title.clone(), style),
                );
                ctx.print(text_x, -(r.y + UNITS_PER_ROW * 2.0), card.detail.clone());
            }
        });

    f.render_widget(canvas, area);
}

/// Truncate to at most `width` characters, marking the cut
fn fit(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}
