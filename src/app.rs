use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, info, warn};

use crate::catalog::{self, Language};
use crate::clock::Clock;
use crate::config::Config;
use crate::generate::TextGenerator;
use crate::history::{HistoryStore, TypingSession};
use crate::progress::{self, Period, MIN_SESSIONS_FOR_ANALYSIS};
use crate::runtime::AppEvent;
use crate::snippet::generate_code_snippet;
use crate::typing::Typer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppScreen {
    Typing,
    Progress,
}

/// Collaborators the app talks to
pub struct AppContext {
    pub generator: Arc<dyn TextGenerator>,
    pub events: Sender<AppEvent>,
    pub clock: Box<dyn Clock>,
}

/// All interactive state of the program
pub struct App {
    pub config: Config,
    pub language: &'static Language,
    pub typer: Typer,
    pub history: HistoryStore,
    pub screen: AppScreen,
    pub focus_mode: bool,
    /// a challenge fetch is in flight
    pub loading: bool,
    pub period: Period,
    pub analysis: Option<String>,
    pub analyzing: bool,
    pub should_quit: bool,
    /// id of the latest analysis request; older replies are dropped
    analysis_request: u64,
    custom_prompt: Option<String>,
    ctx: AppContext,
}

impl App {
    pub fn new(
        config: Config,
        history: HistoryStore,
        ctx: AppContext,
        custom_prompt: Option<String>,
    ) -> Self {
        let language = catalog::find(&config.language).unwrap_or_else(catalog::default_language);

        Self {
            focus_mode: config.focus_mode,
            config,
            language,
            typer: Typer::new(language.name, ""),
            history,
            screen: AppScreen::Typing,
            loading: false,
            period: Period::default(),
            analysis: None,
            analyzing: false,
            should_quit: false,
            analysis_request: 0,
            custom_prompt,
            ctx,
        }
    }

    /// Load a new challenge. Generated challenges arrive later as
    /// [`AppEvent::ChallengeReady`]; overlapping fetches resolve in arrival order.
    pub fn request_challenge(&mut self) {
        if let Some(prompt) = &self.custom_prompt {
            self.typer.reset(prompt.clone());
            self.loading = false;
            return;
        }

        self.loading = true;
        self.typer.reset(String::new());

        let generator = Arc::clone(&self.ctx.generator);
        let events = self.ctx.events.clone();
        let language = self.language.name;
        info!(language, "requesting challenge");

        thread::spawn(move || {
            let text = generate_code_snippet(generator.as_ref(), language);
            let _ = events.send(AppEvent::ChallengeReady(text));
        });
    }

    pub fn restart(&mut self) {
        let challenge = self.typer.challenge().to_string();
        self.typer.reset(challenge);
    }

    pub fn select_language(&mut self, language: &'static Language) {
        self.language = language;
        self.config.language = language.id.to_string();
        self.typer.set_language(language.name);
        self.request_challenge();
    }

    pub fn toggle_focus(&mut self) {
        self.focus_mode = !self.focus_mode;
        self.config.focus_mode = self.focus_mode;
    }

    /// Sessions shown in the progress view for the selected period
    pub fn period_sessions(&self) -> Vec<TypingSession> {
        progress::filter_sessions(self.history.all(), self.period, &self.ctx.clock.now())
    }

    pub fn open_progress(&mut self) {
        self.screen = AppScreen::Progress;
        self.analysis = None;
    }

    pub fn set_period(&mut self, period: Period) {
        if self.period != period {
            self.period = period;
            self.discard_analysis();
        }
    }

    /// Forget the shown analysis and any reply still in flight
    fn discard_analysis(&mut self) {
        self.analysis = None;
        self.analyzing = false;
        self.analysis_request += 1;
    }

    /// Ask for a progress analysis of the current period
    pub fn analyze(&mut self) {
        if self.analyzing {
            return;
        }
        let sessions = self.period_sessions();

        if sessions.len() < MIN_SESSIONS_FOR_ANALYSIS {
            // answered locally, the service is not involved
            self.analysis = Some(progress::analyze_typing_progress(
                self.ctx.generator.as_ref(),
                &sessions,
            ));
            return;
        }

        self.discard_analysis();
        self.analyzing = true;
        let request = self.analysis_request;
        let generator = Arc::clone(&self.ctx.generator);
        let events = self.ctx.events.clone();
        info!(sessions = sessions.len(), request, "requesting progress analysis");

        thread::spawn(move || {
            let text = progress::analyze_typing_progress(generator.as_ref(), &sessions);
            let _ = events.send(AppEvent::AnalysisReady { request, text });
        });
    }

    pub fn clear_history(&mut self) {
        if let Err(e) = self.history.clear() {
            warn!(error = %e, "failed to persist cleared history");
        }
        self.discard_analysis();
        info!("history cleared");
    }

    /// Apply one event. Returns true when the screen should be redrawn.
    ///
    /// The sampler is polled on every event, not only on ticks, so a steady
    /// stream of keys cannot hold back the live metrics.
    pub fn handle_event(&mut self, event: AppEvent) -> bool {
        let changed = self.apply_event(event);
        let sampled = self.typer.on_tick(self.ctx.clock.now_ms());
        changed || sampled
    }

    fn apply_event(&mut self, event: AppEvent) -> bool {
        match event {
            AppEvent::Tick => false,
            AppEvent::Resize => true,
            AppEvent::ChallengeReady(text) => {
                self.typer.reset(text);
                self.loading = false;
                true
            }
            AppEvent::AnalysisReady { request, .. } if request != self.analysis_request => {
                debug!(request, "dropping stale analysis");
                false
            }
            AppEvent::AnalysisReady { text, .. } => {
                self.analysis = Some(text);
                self.analyzing = false;
                true
            }
            AppEvent::Key(key) => {
                self.on_key(key);
                true
            }
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.screen {
            AppScreen::Typing => self.on_typing_key(key, ctrl),
            AppScreen::Progress => self.on_progress_key(key, ctrl),
        }
    }

    fn on_typing_key(&mut self, key: KeyEvent, ctrl: bool) {
        match key.code {
            KeyCode::Esc => {
                if self.focus_mode {
                    self.toggle_focus();
                } else {
                    self.should_quit = true;
                }
            }
            KeyCode::Char('f') if ctrl => self.toggle_focus(),
            KeyCode::Char('p') if ctrl => self.open_progress(),
            KeyCode::Char('r') if ctrl => self.restart(),
            KeyCode::Char('n') if ctrl => self.request_challenge(),
            KeyCode::Left => self.restart(),
            KeyCode::Right => self.request_challenge(),
            KeyCode::Up => self.select_language(catalog::cycle(self.language, -1)),
            KeyCode::Down => self.select_language(catalog::cycle(self.language, 1)),
            _ if self.loading || ctrl => {}
            _ if self.typer.has_finished() => match key.code {
                KeyCode::Char('r') => self.restart(),
                KeyCode::Char('n') | KeyCode::Enter => self.request_challenge(),
                KeyCode::Char('p') => self.open_progress(),
                _ => {}
            },
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::ALT) => self.type_char(c),
            KeyCode::Enter => self.type_char('\n'),
            KeyCode::Tab => self.type_char('\t'),
            KeyCode::Backspace => {
                let mut value = self.typer.user_input().to_string();
                if value.pop().is_some() {
                    self.submit_input(&value);
                }
            }
            _ => {}
        }
    }

    fn type_char(&mut self, c: char) {
        // input is capped at the challenge length
        if self.typer.cursor_pos() >= self.typer.challenge_len() {
            return;
        }
        let mut value = self.typer.user_input().to_string();
        value.push(c);
        self.submit_input(&value);
    }

    fn submit_input(&mut self, value: &str) {
        let now = self.ctx.clock.now_ms();
        if let Some(session) = self.typer.on_input_changed(value, now) {
            info!(
                language = %session.language,
                wpm = session.wpm,
                accuracy = session.accuracy,
                "challenge completed"
            );
            if let Err(e) = self.history.append(session) {
                warn!(error = %e, "failed to persist session");
            }
        }
    }

    fn on_progress_key(&mut self, key: KeyEvent, ctrl: bool) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.screen = AppScreen::Typing,
            KeyCode::Char('p') if ctrl => self.screen = AppScreen::Typing,
            KeyCode::Char('t') => self.set_period(Period::Today),
            KeyCode::Char('w') => self.set_period(Period::Week),
            KeyCode::Tab => self.set_period(self.period.toggle()),
            KeyCode::Char('a') => self.analyze(),
            KeyCode::Char('c') => self.clear_history(),
            _ => debug!(?key, "unhandled key on progress screen"),
        }
    }
}
