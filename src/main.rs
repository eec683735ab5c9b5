mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};
use tracing::{info, warn};

use tapspeed::{
    app_dirs::AppDirs,
    clock::{Clock, SystemClock},
    config::{Config, ConfigStore, FileConfigStore},
    logging,
    personal_best::{FilePersonalBestStore, PersonalBestStore},
    runtime::{AppEvent, ChannelEvents, Runner},
    texts::{Corpus, EmbeddedTexts, FileTexts, FixedText, TextProvider},
    Difficulty, KeyInput, Mode, SessionController, SessionSettings,
};

use crate::ui::Screen;

const TICK_RATE_MS: u64 = 100;

/// typing speed test with timed and passage modes
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A typing speed test for the terminal. Type the passage shown, watch wpm and accuracy live, and chase your personal best."
)]
pub struct Cli {
    /// session mode (defaults to the config file, then timed)
    #[clap(short = 'm', long, value_enum)]
    mode: Option<Mode>,

    /// passage difficulty (defaults to the config file, then easy)
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// json corpus to draw passages from instead of the built-in one
    #[clap(short = 't', long)]
    texts: Option<PathBuf>,

    /// custom prompt to use for every session
    #[clap(short = 'p', long)]
    prompt: Option<String>,
}

impl Cli {
    fn settings(&self, config: &Config) -> SessionSettings {
        SessionSettings {
            mode: self.mode.unwrap_or(config.mode),
            difficulty: self.difficulty.unwrap_or(config.difficulty),
            seed: None,
        }
    }

    fn text_provider(&self, config: &Config) -> Box<dyn TextProvider> {
        if let Some(ref prompt) = self.prompt {
            return Box::new(FixedText::new(prompt.clone()));
        }

        if let Some(path) = self.texts.as_ref().or(config.texts.as_ref()) {
            return Box::new(FileTexts::new(path));
        }

        match EmbeddedTexts::load() {
            Ok(texts) => Box::new(texts),
            Err(err) => {
                // an empty corpus makes every reset use the built-in passages
                warn!(error = %err, "embedded corpus unavailable");
                Box::new(Corpus::default())
            }
        }
    }
}

pub struct App {
    pub controller: SessionController<Screen>,
}

impl App {
    pub fn new(
        settings: SessionSettings,
        provider: Box<dyn TextProvider>,
        store: Box<dyn PersonalBestStore>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            controller: SessionController::new(
                settings,
                provider,
                store,
                clock,
                Screen::default(),
            ),
        }
    }

    /// Applies a key press. Returns false when the app should exit.
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        if key.kind == KeyEventKind::Release {
            return true;
        }

        match key.code {
            KeyCode::Esc => return false,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return false,
            KeyCode::Tab => self.controller.reset(),
            KeyCode::Left => {
                let prev = self.controller.difficulty().prev();
                self.controller.change_difficulty(prev);
            }
            KeyCode::Right => {
                let next = self.controller.difficulty().next();
                self.controller.change_difficulty(next);
            }
            KeyCode::Up | KeyCode::Down => {
                let toggled = self.controller.mode().toggle();
                self.controller.change_mode(toggled);
            }
            _ => {
                if let Some(input) = KeyInput::from_key_event(&key) {
                    self.controller.handle_input(input);
                }
            }
        }
        true
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    // stderr is still ours until raw mode starts
    let _log_guard = match AppDirs::log_dir().map(|dir| logging::init(&dir)) {
        Some(Ok(guard)) => Some(guard),
        Some(Err(e)) => {
            eprintln!("tapspeed: logging disabled: {e}");
            None
        }
        None => {
            eprintln!("tapspeed: logging disabled: no state directory");
            None
        }
    };
    let config = FileConfigStore::new().load();
    info!(?cli, ?config, "starting");

    let mut app = App::new(
        cli.settings(&config),
        cli.text_provider(&config),
        Box::new(FilePersonalBestStore::new()),
        Box::new(SystemClock),
    );

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let mut runner = Runner::new(
        ChannelEvents::terminal(),
        Duration::from_millis(TICK_RATE_MS),
    );
    let clock = SystemClock;

    loop {
        terminal.draw(|f| ui(app, f))?;

        match runner.step() {
            AppEvent::Tick | AppEvent::Resize => {}
            AppEvent::Key(key) => {
                if !app.on_key(key) {
                    break;
                }
            }
            AppEvent::Closed => return Err("terminal input closed".into()),
        }

        runner.sync_timer(&mut app.controller, clock.now());
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}
