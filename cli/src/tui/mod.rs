pub mod app;
pub mod ui;

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tasklist_core::{KeyValueStorage, TaskStore};
use tracing::info;

use crate::tui::app::{App, InputMode};

pub fn run<S: KeyValueStorage>(store: &mut TaskStore<S>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    info!("terminal ui started");
    let mut app = App::new(store);
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: Backend, S: KeyValueStorage>(terminal: &mut Terminal<B>, app: &mut App<'_, S>) -> io::Result<()> {
    loop {
        terminal
            .draw(|f| ui::draw(f, app))
            .map_err(|e| io::Error::other(e.to_string()))?;

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match app.input_mode {
            InputMode::Normal => match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::Char(' ') | KeyCode::Enter => app.toggle_selected(),
                KeyCode::Char('d') | KeyCode::Delete => app.remove_selected(),
                KeyCode::Char('a') => app.enter_add_mode(),
                KeyCode::Char('/') => app.enter_search_mode(),
                KeyCode::Char('f') => app.cycle_filter(),
                KeyCode::Char('s') => app.toggle_sort(),
                _ => {}
            },
            InputMode::Adding | InputMode::Searching => match key.code {
                KeyCode::Enter => app.submit_input(),
                KeyCode::Esc => app.exit_input_mode(),
                KeyCode::Char(c) => app.input_char(c),
                KeyCode::Backspace => app.delete_char(),
                KeyCode::Left => app.move_cursor_left(),
                KeyCode::Right => app.move_cursor_right(),
                _ => {}
            },
        }
    }
}
