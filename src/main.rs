//! Resonate ID - terminal client for the Resonate co-op account portal
//!
//! A Ratatui-based TUI for logging in, joining, managing account settings,
//! OAuth apps, profiles and membership against the account backend.

mod api;
mod app;
mod config;
mod form;
mod platform;
mod state;
mod ui;

use anyhow::Result;
use app::App;
use config::PortalConfig;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::{Duration, Instant};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Log to stderr so the alternate screen stays clean. `RUST_LOG` overrides
/// the default filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("resonate_id_tui=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn enter_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(io::stdout()))?)
}

fn leave_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = PortalConfig::load()?;
    tracing::info!("using account backend at {}", config.api_address());
    let mut app = App::connect(config)?;

    let mut terminal = enter_terminal()?;
    let result = run_app(&mut terminal, &mut app).await;
    leave_terminal(&mut terminal)?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<()> {
    loop {
        let term_size = terminal.size()?;
        app.terminal_size = Some((term_size.height, term_size.width));

        // Redraw only when a machine transition or input asked for it
        if app.needs_redraw() {
            terminal.draw(|frame| ui::draw(frame, app))?;
        }

        // Handle crossterm events
        if event::poll(POLL_INTERVAL)? {
            match event::read()? {
                Event::Key(key) => app.handle_key(key),
                Event::Resize(_width, _height) => app.request_redraw(),
                _ => {}
            }
        }

        // Let spawned requests make progress between polls
        tokio::task::yield_now().await;
        app.drain_tasks();
        app.tick(Instant::now());

        // Check if app wants to quit
        if app.should_quit() {
            return Ok(());
        }
    }
}
