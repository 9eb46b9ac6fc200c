use clap::{error::ErrorKind, CommandFactory, Parser};
use codetyper::{
    app::{App, AppContext},
    app_dirs::AppDirs,
    catalog,
    clock::SystemClock,
    config::{ConfigStore, FileConfigStore},
    generate::{GeminiClient, GeminiConfig},
    history::{self, FileKeyValueStore, HistoryStore},
    runtime::{CrosstermEventSource, EventSource, FixedTicker, Runner, Ticker},
    ui,
};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const TICK_RATE_MS: u64 = 100;

/// typing practice for programmers, with AI-generated code challenges
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A typing TUI for programmers: practise on freshly generated code snippets, track speed and accuracy over time, and get coaching on your progress."
)]
pub struct Cli {
    /// language of the challenge (javascript, python, typescript, java, go, rust, html)
    #[clap(short = 'l', long)]
    language: Option<String>,

    /// custom challenge text to type instead of a generated one
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// start in focus mode
    #[clap(long)]
    focus: bool,

    /// keep config, history and logs in this directory
    #[clap(long)]
    data_dir: Option<PathBuf>,

    /// export typing history to a CSV file and exit
    #[clap(long, value_name = "PATH")]
    export_csv: Option<PathBuf>,

    /// delete typing history and exit
    #[clap(long)]
    clear_history: bool,

    /// log at debug level
    #[clap(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let language = match cli.language.as_deref() {
        Some(id) => match catalog::find(id) {
            Some(language) => Some(language),
            None => {
                let mut cmd = Cli::command();
                cmd.error(
                    ErrorKind::InvalidValue,
                    format!("unsupported language '{id}'"),
                )
                .exit();
            }
        },
        None => None,
    };

    let dirs = AppDirs::resolve(cli.data_dir.as_deref());
    init_logging(&dirs.log_path(), cli.verbose);

    let mut history = HistoryStore::load(Box::new(FileKeyValueStore::new(dirs.data_dir())));

    if cli.clear_history {
        history.clear()?;
        println!("Typing history cleared.");
        return Ok(());
    }
    if let Some(path) = &cli.export_csv {
        history::export_csv(history.all(), path)?;
        println!("Exported {} sessions to {}", history.len(), path.display());
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let config_store = FileConfigStore::with_path(dirs.config_path());
    let mut config = config_store.load();
    if let Some(language) = language {
        config.language = language.id.to_string();
    }
    if cli.focus {
        config.focus_mode = true;
    }

    let gemini = GeminiConfig::from_env(&config.model, config.request_timeout_secs);
    if gemini.is_none() {
        warn!("no API key configured, challenges and analysis will use fallbacks");
    }
    let generator = Arc::new(GeminiClient::new(gemini));

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let ctx = AppContext {
        generator,
        events: runner.sender(),
        clock: Box::new(SystemClock),
    };
    let mut app = App::new(config, history, ctx, cli.prompt.clone());

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    if let Err(e) = config_store.save(&app.config) {
        warn!(path = %config_store.path().display(), error = %e, "failed to save config");
    }
    info!(sessions = app.history.len(), "exiting");

    result
}

fn start_tui<B: Backend, E: EventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    app.request_challenge();
    terminal.draw(|f| ui::screen::draw(app, f))?;

    while !app.should_quit {
        let event = runner.step();
        if app.handle_event(event) && !app.should_quit {
            terminal.draw(|f| ui::screen::draw(app, f))?;
        }
    }

    Ok(())
}

/// Log to a file so the terminal UI stays clean. Failing to open the log
/// file leaves logging off.
fn init_logging(path: &Path, verbose: bool) {
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };

    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("codetyper={default_level}")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}
