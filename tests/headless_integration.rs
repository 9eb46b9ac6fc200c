use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Duration;

use codetyper::app::{App, AppContext, AppScreen};
use codetyper::clock::ManualClock;
use codetyper::config::Config;
use codetyper::generate::{GenerateError, TextGenerator};
use codetyper::history::{HistoryStore, MemoryKeyValueStore};
use codetyper::runtime::{AppEvent, FixedTicker, Runner, TestEventSource};
use codetyper::typing::TypingStatus;
use codetyper::ui;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{backend::TestBackend, Terminal};

const T0: i64 = 1_715_783_400_000;

struct Canned(&'static str);

impl TextGenerator for Canned {
    fn generate(&self, _prompt: &str) -> Result<String, GenerateError> {
        Ok(self.0.to_string())
    }
}

fn build(
    generator: Canned,
    prompt: Option<&str>,
) -> (App, Runner<TestEventSource, FixedTicker>, ManualClock) {
    let runner = Runner::new(
        TestEventSource::new(),
        FixedTicker::new(Duration::from_millis(5)),
    );
    let clock = ManualClock::new(T0);
    let app = App::new(
        Config::default(),
        HistoryStore::load(Box::new(MemoryKeyValueStore::default())),
        AppContext {
            generator: Arc::new(generator),
            events: runner.sender(),
            clock: Box::new(clock.clone()),
        },
        prompt.map(str::to_string),
    );
    (app, runner, clock)
}

fn send_keys(tx: &Sender<AppEvent>, text: &str) {
    for c in text.chars() {
        let code = if c == '\n' { KeyCode::Enter } else { KeyCode::Char(c) };
        tx.send(AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
            .unwrap();
    }
}

fn screen_text(terminal: &Terminal<TestBackend>) -> String {
    terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|cell| cell.symbol())
        .collect()
}

// Drives the runner until the predicate holds or the step budget runs out
fn run_until(
    app: &mut App,
    runner: &Runner<TestEventSource, FixedTicker>,
    clock: &ManualClock,
    done: impl Fn(&App) -> bool,
) {
    for _ in 0..500u32 {
        clock.advance(50);
        let event = runner.step();
        app.handle_event(event);
        if done(app) {
            return;
        }
    }
}

#[test]
fn headless_custom_prompt_flow_records_a_session() {
    let (mut app, runner, clock) = build(Canned("unused"), Some("fn a() {\n}"));
    app.request_challenge();

    send_keys(&runner.sender(), "fn a() {\n}");
    run_until(&mut app, &runner, &clock, |a| a.typer.has_finished());

    assert_eq!(app.typer.status(), TypingStatus::Finished);
    assert_eq!(app.history.len(), 1);
    let session = &app.history.all()[0];
    assert_eq!(session.language, "JavaScript");
    assert_eq!(session.accuracy, 100.0);
    assert!(session.wpm > 0.0);
    assert!(!app.typer.sampler().is_armed());
}

#[test]
fn headless_generated_challenge_arrives_through_the_runner() {
    let (mut app, runner, clock) = build(Canned("```go\nx := 1\n```"), None);
    app.request_challenge();
    assert!(app.loading);

    run_until(&mut app, &runner, &clock, |a| !a.loading);

    assert!(!app.loading);
    assert_eq!(app.typer.challenge(), "x := 1");
}

#[test]
fn headless_mistakes_lower_accuracy() {
    let (mut app, runner, clock) = build(Canned("unused"), Some("abcd"));
    app.request_challenge();

    send_keys(&runner.sender(), "abxd");
    run_until(&mut app, &runner, &clock, |a| a.typer.has_finished());

    assert_eq!(app.history.all()[0].accuracy, 75.0);
}

#[test]
fn headless_render_typing_and_progress_screens() {
    let (mut app, runner, clock) = build(Canned("unused"), Some("ab"));
    app.request_challenge();
    let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();

    terminal.draw(|f| ui::screen::draw(&app, f)).unwrap();
    let typing = screen_text(&terminal);
    assert!(typing.contains("CodeTyper"));
    assert!(typing.contains("Rust"));

    send_keys(&runner.sender(), "ab");
    run_until(&mut app, &runner, &clock, |a| a.typer.has_finished());
    app.handle_event(AppEvent::Key(KeyEvent::new(
        KeyCode::Char('p'),
        KeyModifiers::NONE,
    )));
    assert_eq!(app.screen, AppScreen::Progress);

    terminal.draw(|f| ui::screen::draw(&app, f)).unwrap();
    let progress = screen_text(&terminal);
    assert!(progress.contains("Your Progress"));
    assert!(progress.contains("Complete at least 2 sessions"));
}

#[test]
fn headless_steady_keys_still_sample_metrics() {
    let challenge = "a".repeat(60);
    let (mut app, runner, clock) = build(Canned("unused"), Some(&challenge));
    app.request_challenge();

    // every step here is a key, so the runner never yields a tick
    send_keys(&runner.sender(), &"a".repeat(30));
    run_until(&mut app, &runner, &clock, |a| a.typer.user_input().len() == 30);

    assert_eq!(app.typer.status(), TypingStatus::Typing);
    assert!(!app.typer.wpm_samples().is_empty());
    assert!(app.typer.stats().time >= 1.0);
    assert!(app.typer.stats().wpm > 0.0);
}
