//! Terminal setup and the editor's event loop.

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{error, info};
use ratatui::prelude::*;

use crate::cli_pretty_printing::SAVED_MESSAGE;
use crate::config::Config;
use crate::model::ConfigModel;

use super::app::App;
use super::colors::TuiColors;
use super::input::{handle_key_event, Action};
use super::ui::draw;

/// Result type for TUI operations.
pub type TuiResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Tick rate for UI updates (in milliseconds).
const TICK_RATE_MS: u64 = 100;

/// Opens the form editor on `model` and runs it until the user quits.
///
/// # Errors
///
/// Returns an error if the terminal cannot be put into raw mode or the
/// alternate screen cannot be entered. Save failures are shown in the
/// editor and do not end it.
pub fn run_editor(model: ConfigModel, config: &Config) -> TuiResult<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(model);
    let colors = TuiColors::from_config(config);

    let result = run_event_loop(&mut terminal, &mut app, &colors);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    colors: &TuiColors,
) -> TuiResult<()> {
    let tick_rate = Duration::from_millis(TICK_RATE_MS);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|frame| draw(frame, app, colors))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match handle_key_event(app, key) {
                        Action::Save => {
                            save(app);
                        }
                        Action::SaveAndQuit => {
                            if save(app) {
                                app.should_quit = true;
                            } else {
                                app.cancel_quit();
                            }
                        }
                        Action::None => {}
                    }
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Saves the model, reporting the outcome in the status line.
fn save(app: &mut App) -> bool {
    match app.model.save() {
        Ok(()) => {
            info!("Saved {}", app.model.path().display());
            app.mark_saved();
            app.set_status(SAVED_MESSAGE);
            true
        }
        Err(e) => {
            error!("{}", e);
            app.set_status(e.to_string());
            false
        }
    }
}
