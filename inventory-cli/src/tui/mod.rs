pub mod apps;
pub mod resource;
pub mod theme;
pub mod widgets;

pub use resource::Resource;
pub use theme::Theme;

use anyhow::{Context as _, Result};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io;

use apps::images;

/// Run the images manager until the operator quits.
///
/// Logs go to the log file while the alternate screen is active.
pub async fn run() -> Result<()> {
    let manager = crate::client_manager()?;
    let session = crate::global_config()?
        .current_session()
        .await?
        .map(|stored| stored.token);

    let ctx = images::Context {
        query: manager.query_service(),
        images: manager.image_service(),
    };
    let state = images::State::new(session);

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(e).context("Failed to enter alternate screen");
    }

    let result = match Terminal::new(CrosstermBackend::new(io::stdout())) {
        Ok(mut terminal) => {
            let result = images::run(&mut terminal, ctx, state).await;
            let _ = terminal.show_cursor();
            result
        }
        Err(e) => Err(e.into()),
    };

    restore_terminal();
    result
}

fn restore_terminal() {
    if let Err(e) = disable_raw_mode() {
        log::warn!("Failed to disable raw mode: {}", e);
    }
    if let Err(e) = execute!(io::stdout(), LeaveAlternateScreen) {
        log::warn!("Failed to leave alternate screen: {}", e);
    }
}
