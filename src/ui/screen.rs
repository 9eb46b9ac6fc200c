use ratatui::Frame;

use crate::app::{App, AppScreen};
use crate::ui::{progress::ProgressView, TypingView};

/// A UI screen boundary
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

pub struct TypingScreen;

impl Screen for TypingScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(TypingView(app), f.area());
    }
}

pub struct ProgressScreen;

impl Screen for ProgressScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(ProgressView(app), f.area());
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(screen: AppScreen) -> Box<dyn Screen> {
    match screen {
        AppScreen::Typing => Box::new(TypingScreen),
        AppScreen::Progress => Box::new(ProgressScreen),
    }
}

/// Draw whatever screen the app is on
pub fn draw(app: &App, f: &mut Frame) {
    current_screen(app.screen).render(app, f);
}
