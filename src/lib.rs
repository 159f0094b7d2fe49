use std::fs;
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::crossterm::event::{
    self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    Event, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, SetTitle, disable_raw_mode, enable_raw_mode,
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

mod ai;
mod app;
mod config;
mod keybinds;
mod theme;
mod types;
mod ui;
mod util;
use ai::OpenAiClient;
use app::App;
use config::{config_dir, load_ai_config};
use ui::draw;

const LOG_ENV: &str = "AINOTEPAD_LOG";
const LOG_FILE: &str = "ainotepad.log";

/// Installs the file logger. The terminal belongs to the UI, so nothing is
/// written to stdout or stderr.
fn init_logging() -> Option<WorkerGuard> {
    let dir = config_dir()?;
    if let Err(err) = fs::create_dir_all(&dir) {
        eprintln!("ainotepad: logging disabled ({}: {err})", dir.display());
        return None;
    }
    let appender = tracing_appender::rolling::never(&dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()
        .map(|()| guard)
}

fn print_help() {
    println!("Usage: ainotepad [OPTIONS] [PATH]");
    println!();
    println!("Arguments:");
    println!("  [PATH]    Text file to open at startup");
    println!();
    println!("Options:");
    println!("  --help, -h       Show this help message");
    println!("  --version, -V    Show the version");
    println!();
    println!("Environment:");
    println!("  OPENAI_API_KEY   API key for the AI commands (see config.json api_key_env)");
    println!("  {LOG_ENV}    Log filter, e.g. debug (log file: {LOG_FILE} in the config dir)");
}

pub fn run() -> io::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("ainotepad {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    let start_path = args.iter().find(|a| !a.starts_with('-')).map(PathBuf::from);

    let _log_guard = init_logging();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting");

    let config = load_ai_config();
    tracing::info!(
        model = config.model.as_str(),
        endpoint = %config.endpoint,
        timeout = ?config.timeout,
        has_key = config.api_key.is_some(),
        "AI settings"
    );
    let mut app = App::new(&config, Arc::new(OpenAiClient::new(&config)));
    if let Some(path) = start_path {
        app.open_file(path);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;

    let enhanced_keys =
        ratatui::crossterm::terminal::supports_keyboard_enhancement().unwrap_or(false);
    if enhanced_keys {
        let _ = execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        );
    }

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing::error!(%info, "panic");
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
        let _ = execute!(
            io::stdout(),
            LeaveAlternateScreen,
            DisableMouseCapture,
            DisableBracketedPaste
        );
        original_hook(info);
    }));

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    let result = run_app(terminal, app);

    disable_raw_mode()?;
    let mut stdout = io::stdout();
    if enhanced_keys {
        let _ = execute!(stdout, PopKeyboardEnhancementFlags);
    }
    execute!(
        stdout,
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;

    if let Err(err) = &result {
        tracing::error!(%err, "exited with error");
    } else {
        tracing::info!("exited");
    }
    result
}

fn run_app(mut terminal: Terminal<CrosstermBackend<Stdout>>, mut app: App) -> io::Result<()> {
    let mut shown_title = String::new();
    loop {
        app.poll_assist();
        if app.title != shown_title {
            execute!(terminal.backend_mut(), SetTitle(&app.title))?;
            shown_title = app.title.clone();
        }
        terminal.draw(|f| draw(&mut app, f))?;
        if app.quit {
            return Ok(());
        }
        if event::poll(Duration::from_millis(100))? {
            // Drain queued events before redrawing.
            loop {
                let ev = event::read()?;
                let handled = match ev {
                    Event::Key(key) => app.handle_key(key),
                    Event::Mouse(mouse) => app.handle_mouse(mouse),
                    Event::Paste(text) => {
                        app.handle_paste(text);
                        Ok(())
                    }
                    _ => Ok(()),
                };
                if let Err(err) = handled {
                    tracing::error!(%err, "action failed");
                    app.set_status(format!("Action failed: {err}"));
                }
                if app.quit {
                    return Ok(());
                }
                if !event::poll(Duration::ZERO)? {
                    break;
                }
            }
        }
    }
}
