//! UI layer - terminal setup and the interactive loop

pub mod views;

use crate::app::App;
use anyhow::Result;
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind, MouseButton, MouseEvent,
        MouseEventKind,
    },
    execute,
    terminal::{self, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::io;

/// Main TUI controller. Restores the terminal when dropped.
pub struct TUI {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TUI {
    /// Create a new TUI
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self { terminal })
    }

    /// Draw and dispatch input until the app asks to quit
    pub fn run(&mut self, app: &mut App) -> Result<()> {
        while !app.should_quit {
            self.terminal.draw(|f| views::render(f, app))?;

            if App::should_poll_input()? {
                match App::read_event()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                    Event::Mouse(mouse) => handle_mouse(app, mouse)?,
                    _ => {}
                }
            }
        }
        log::info!("Leaving interactive view");
        Ok(())
    }
}

/// Left-button drag between root cards swaps their priorities
fn handle_mouse(app: &mut App, mouse: MouseEvent) -> Result<()> {
    let (width, height) = terminal::size()?;
    let screen = Rect::new(0, 0, width, height);
    let point = views::plane_point(app, screen, mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if let Some(point) = point {
                app.press_at(point);
            }
        }
        MouseEventKind::Up(MouseButton::Left) => app.release_at(point),
        _ => {}
    }
    Ok(())
}

impl Drop for TUI {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        );
        let _ = self.terminal.show_cursor();
    }
}
