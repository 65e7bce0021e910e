use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

use crate::bank::{self, Feed};
use crate::cache::Cache;
use crate::config::Config;
use crate::db::Database;
use crate::import::ImportSummary;
use crate::ui::app::{App, InputMode, Screen, View};
use crate::ui::commands::{self, switch_screen};
use crate::ui::util::{scroll_down, scroll_to_bottom, scroll_to_top, scroll_up};

pub(crate) fn as_tui(config: &Config, cache: &dyn Cache, db: &mut Database) -> Result<()> {
    let mut app = App::new();
    app.refresh_all(db)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, config, cache, db);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        tracing::error!(error = ?e, "Admin UI exited with an error");
        eprintln!("Error: {e:?}");
    }

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    config: &Config,
    cache: &dyn Cache,
    db: &mut Database,
) -> Result<()> {
    while app.running {
        terminal.draw(|f| {
            // 1 tab + 1 status + 1 command bar
            let content_height = f.area().height.saturating_sub(3) as usize;
            app.visible_rows = content_height.max(1);
            crate::ui::render::render(f, app);
        })?;

        // The "Importing..." frame is already on screen
        if let Some(feed) = app.pending_import.take() {
            let outcome = import_now(feed, config, cache, db);
            app.finish_import(feed, outcome, db)?;
            continue;
        }

        if let Event::Key(key) = event::read()? {
            if app.show_help {
                app.show_help = false;
                continue;
            }
            match app.input_mode {
                InputMode::Normal => handle_normal_input(key, app, db)?,
                InputMode::Command => handle_command_input(key, app, db)?,
                InputMode::Search => handle_search_input(key, app, db)?,
            }
        }
    }
    Ok(())
}

/// Connects lazily so a TUI session without credentials can still browse.
fn import_now(
    feed: Feed,
    config: &Config,
    cache: &dyn Cache,
    db: &mut Database,
) -> Result<ImportSummary> {
    let source = bank::connect(config, None)?;
    tracing::info!(%feed, policy = %config.cache_policy, "Import requested from admin UI");
    super::import_feed(feed, source.as_ref(), cache, config.cache_policy, db)
}

// ── Input handlers ───────────────────────────────────────────

fn handle_normal_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Char(':') => {
            app.input_mode = InputMode::Command;
            app.command_input.clear();
        }
        KeyCode::Char('/') => {
            app.input_mode = InputMode::Search;
            app.view = View::List;
            app.search_input.clear();
        }
        KeyCode::Char('q') | KeyCode::Char('c')
            if key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            app.running = false;
        }
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            for _ in 0..app.page() / 2 {
                handle_move_down(app);
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            for _ in 0..app.page() / 2 {
                handle_move_up(app);
            }
        }
        KeyCode::Char('j') | KeyCode::Down => handle_move_down(app),
        KeyCode::Char('k') | KeyCode::Up => handle_move_up(app),
        KeyCode::Char('g') | KeyCode::Home => {
            let (index, scroll) = app.cursor_mut();
            scroll_to_top(index, scroll);
        }
        KeyCode::Char('G') | KeyCode::End => {
            let (len, page) = (app.current_len(), app.page());
            let (index, scroll) = app.cursor_mut();
            scroll_to_bottom(index, scroll, len, page);
        }
        KeyCode::Char('1') => switch_screen(app, db, Screen::CardStatements)?,
        KeyCode::Char('2') => switch_screen(app, db, Screen::AccountStatements)?,
        KeyCode::Tab | KeyCode::BackTab => {
            // Two screens, so both directions land on the other one
            let screens = Screen::all();
            let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
            let next = (idx + 1) % screens.len();
            switch_screen(app, db, screens[next])?;
        }
        KeyCode::Char('i') => app.request_import(),
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Enter => {
            if app.view == View::List && app.current_len() > 0 {
                app.view = View::Detail;
            } else {
                app.view = View::List;
            }
        }
        KeyCode::Esc => handle_escape(app, db)?,
        _ => {}
    }
    Ok(())
}

fn handle_command_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let input = app.command_input.clone();
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
            // A failed command should not take the whole session down
            if let Err(e) = commands::handle_command(&input, app, db) {
                tracing::warn!(command = %input, error = ?e, "Command failed");
                app.set_status(format!("Error: {e}"));
            }
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
        }
        KeyCode::Backspace => {
            app.command_input.pop();
            if app.command_input.is_empty() {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.command_input.clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let trimmed = app.command_input.trim_end();
            if let Some(pos) = trimmed.rfind(' ') {
                app.command_input.truncate(pos + 1);
            } else {
                app.command_input.clear();
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char(c) => {
            app.command_input.push(c);
        }
        _ => {}
    }
    Ok(())
}

fn handle_search_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.search_input.clear();
            app.reset_cursor();
            app.refresh_current(db)?;
        }
        KeyCode::Backspace => {
            app.search_input.pop();
            app.reset_cursor();
            app.refresh_current(db)?;
        }
        KeyCode::Char(c) => {
            app.search_input.push(c);
            app.reset_cursor();
            app.refresh_current(db)?;
        }
        _ => {}
    }
    Ok(())
}

// ── Navigation ───────────────────────────────────────────────

fn handle_move_down(app: &mut App) {
    if app.view == View::Detail {
        return;
    }
    let (len, page) = (app.current_len(), app.page());
    let (index, scroll) = app.cursor_mut();
    scroll_down(index, scroll, len, page);
}

fn handle_move_up(app: &mut App) {
    if app.view == View::Detail {
        return;
    }
    let (index, scroll) = app.cursor_mut();
    scroll_up(index, scroll);
}

/// Detail view closes first, then an active search is cleared.
fn handle_escape(app: &mut App, db: &mut Database) -> Result<()> {
    if app.view == View::Detail {
        app.view = View::List;
    } else if !app.search_input.is_empty() {
        app.search_input.clear();
        app.reset_cursor();
        app.refresh_current(db)?;
        app.set_status("Search cleared");
    } else {
        app.status_message.clear();
    }
    Ok(())
}
