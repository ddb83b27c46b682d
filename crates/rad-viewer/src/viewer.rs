use anyhow::Result;
use ratatui::{
    crossterm::event::{self, Event},
    DefaultTerminal,
};

use crate::{Action, ViewerApp, ViewerState};

/// Take over the terminal and run the viewer until the user quits.
/// The terminal is restored on every exit path.
pub fn run(state: ViewerState) -> Result<()> {
    let mut terminal = ratatui::init();
    let result = run_loop(&mut terminal, state);
    ratatui::restore();
    result
}

fn run_loop(terminal: &mut DefaultTerminal, mut state: ViewerState) -> Result<()> {
    terminal.clear()?;
    let app = ViewerApp {};

    while !state.exit {
        terminal.draw(|frame| frame.render_stateful_widget(&app, frame.area(), &mut state))?;
        handle_events(&mut state)?;
    }

    tracing::debug!(record = state.index(), "viewer closed");
    Ok(())
}

fn handle_events(state: &mut ViewerState) -> Result<()> {
    // crossterm also emits key release and repeat events on Windows;
    // `Action::from_key` only accepts presses.
    if let Event::Key(key) = event::read()? {
        if let Some(action) = Action::from_key(key) {
            state.apply(action);
        }
    }
    Ok(())
}
