use std::io::stdout;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use ratatui::DefaultTerminal;
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};

use codeassist::ai::cache::SuggestionCache;
use codeassist::ai::client::SuggestionClient;
use codeassist::ai::worker;
use codeassist::app::App;
use codeassist::error::AssistError;
use codeassist::{config, settings};

/// Interactive AI-powered code assistant
#[derive(Parser, Debug)]
#[command(
    version,
    about = "Interactive code editor with AI-generated continuations"
)]
struct Args {
    /// File to load into the editor on startup
    input: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Writes to /tmp/codeassist-debug.log at DEBUG level
    #[cfg(debug_assertions)]
    {
        use std::io::Write;

        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open("/tmp/codeassist-debug.log")
            .expect("Failed to open /tmp/codeassist-debug.log");

        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Debug)
            .target(env_logger::Target::Pipe(Box::new(log_file)))
            .format(|buf, record| {
                use std::time::SystemTime;
                let datetime: chrono::DateTime<chrono::Local> = SystemTime::now().into();
                writeln!(
                    buf,
                    "[{}] [{}] {}",
                    datetime.format("%Y-%m-%dT%H:%M:%S%.3f"),
                    record.level(),
                    record.args()
                )
            })
            .init();

        log::debug!("=== CODEASSIST DEBUG SESSION STARTED ===");
    }

    color_eyre::install()?;

    // Load config early to avoid defaults during app initialization
    let config_result = config::load_config();

    let args = Args::parse();

    let settings = settings::load_settings();

    // Construct the client before touching the terminal: a missing
    // credential must fail fast, not at the first fetch
    let ai_config = &config_result.config.ai;
    let cache = SuggestionCache::new(
        ai_config.cache_max_size,
        Duration::from_secs(ai_config.cache_ttl_seconds),
    );
    let client = SuggestionClient::new(ai_config, cache)?;

    let initial_text = match &args.input {
        Some(path) => Some(std::fs::read_to_string(path).map_err(|source| {
            AssistError::FileRead {
                path: path.display().to_string(),
                source,
            }
        })?),
        None => None,
    };

    let terminal = init_terminal()?;

    let mut app = App::new(&config_result.config, settings, initial_text);
    if let Some(warning) = config_result.warning {
        app.set_status(warning);
    }

    // Wire up the suggestion worker
    let (request_tx, request_rx) = std::sync::mpsc::channel();
    let (response_tx, response_rx) = std::sync::mpsc::channel();
    app.trigger.set_channels(request_tx, response_rx);
    worker::spawn_worker(client, request_rx, response_tx);

    let result = run(terminal, app);

    restore_terminal()?;
    result?;

    #[cfg(debug_assertions)]
    log::debug!("=== CODEASSIST DEBUG SESSION ENDED ===");

    Ok(())
}

/// Initialize terminal with raw mode and the alternate screen
fn init_terminal() -> Result<DefaultTerminal> {
    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = execute!(stdout(), LeaveAlternateScreen);
        let _ = disable_raw_mode();
        hook(info);
    }));

    enable_raw_mode()?;

    // If any subsequent operations fail, ensure raw mode is disabled
    if let Err(e) = execute!(stdout(), EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(e.into());
    }

    match ratatui::Terminal::new(ratatui::backend::CrosstermBackend::new(stdout())) {
        Ok(terminal) => Ok(terminal),
        Err(e) => {
            let _ = execute!(stdout(), LeaveAlternateScreen);
            let _ = disable_raw_mode();
            Err(e.into())
        }
    }
}

/// Restore terminal to normal state
fn restore_terminal() -> Result<()> {
    let _ = execute!(stdout(), LeaveAlternateScreen);
    disable_raw_mode()?;
    Ok(())
}

fn run(mut terminal: DefaultTerminal, mut app: App) -> Result<()> {
    loop {
        if app.should_render() {
            terminal.draw(|frame| app.render(frame))?;
            app.clear_dirty();
        }

        app.handle_events()?;
        app.tick();

        if app.should_quit() {
            break;
        }
    }

    Ok(())
}
