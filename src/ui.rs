pub mod charting;
pub mod progress;
pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span, Text},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Tabs, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::app::App;
use crate::catalog::{self, PROGRAMMING_LANGUAGES};
use crate::typing::{CharState, Typer, TypingStats};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;
const RESULT_CHART_HEIGHT: u16 = 10;

/// Typing screen: language picker, live metrics and the challenge text
pub struct TypingView<'a>(pub &'a App);

impl Widget for TypingView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let app = self.0;
        let typer = &app.typer;

        if app.focus_mode {
            let challenge_area = centered_challenge_area(typer, area);
            render_challenge(app, challenge_area, buf);
            return;
        }

        let show_chart = typer.has_finished() && !typer.wpm_samples().is_empty();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(2), // title
                Constraint::Length(1), // languages
                Constraint::Length(1), // padding
                Constraint::Length(1), // metrics
                Constraint::Length(1), // padding
                Constraint::Min(3),    // challenge
                Constraint::Length(if show_chart { RESULT_CHART_HEIGHT } else { 0 }),
                Constraint::Length(1), // legend
            ])
            .split(area);

        render_title(chunks[0], buf);
        render_languages(app, chunks[1], buf);
        render_metrics(typer.stats(), typer.has_finished(), chunks[3], buf);
        render_challenge(app, centered_challenge_area(typer, chunks[5]), buf);
        if show_chart {
            render_wpm_chart(typer, chunks[6], buf);
        }
        render_legend(app, chunks[7], buf);
    }
}

fn render_title(area: Rect, buf: &mut Buffer) {
    let title = Text::from(vec![
        Line::from(Span::styled(
            "CodeTyper",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Sharpen your coding fingers with AI-generated challenges.",
            Style::default().fg(Color::Gray),
        )),
    ]);
    Paragraph::new(title)
        .alignment(Alignment::Center)
        .render(area, buf);
}

fn render_languages(app: &App, area: Rect, buf: &mut Buffer) {
    let titles: Vec<Line> = PROGRAMMING_LANGUAGES
        .iter()
        .map(|l| Line::from(l.name))
        .collect();

    Tabs::new(titles)
        .select(catalog::index_of(app.language))
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        )
        .divider(" ")
        .render(centered(area, tabs_width(), area.height), buf);
}

fn tabs_width() -> u16 {
    // one space of padding on either side plus a divider between tabs
    PROGRAMMING_LANGUAGES
        .iter()
        .map(|l| l.name.width() as u16 + 3)
        .sum()
}

fn render_metrics(stats: TypingStats, finished: bool, area: Rect, buf: &mut Buffer) {
    let label = Style::default().fg(Color::Gray);
    let value = Style::default()
        .fg(if finished { Color::Green } else { Color::Blue })
        .add_modifier(Modifier::BOLD);

    let line = Line::from(vec![
        Span::styled("WPM ", label),
        Span::styled(format!("{:.0}", stats.wpm), value),
        Span::styled("   Accuracy ", label),
        Span::styled(format!("{:.0}%", stats.accuracy), value),
        Span::styled("   Time ", label),
        Span::styled(format!("{:.0}s", stats.time), value),
    ]);
    Paragraph::new(line)
        .alignment(Alignment::Center)
        .render(area, buf);
}

/// Width needed for the widest challenge line, including the newline marker
fn challenge_width(typer: &Typer) -> u16 {
    typer
        .challenge()
        .lines()
        .map(|l| l.width() + 1)
        .max()
        .unwrap_or(0) as u16
}

fn centered_challenge_area(typer: &Typer, area: Rect) -> Rect {
    let width = challenge_width(typer).saturating_add(4).min(area.width);
    let height = (typer.challenge().lines().count() as u16)
        .saturating_add(2)
        .min(area.height);
    centered(area, width.max(30).min(area.width), height.max(3).min(area.height))
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn render_challenge(app: &App, area: Rect, buf: &mut Buffer) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    if app.loading {
        Paragraph::new(Span::styled(
            format!("Generating a {} challenge...", app.language.name),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .block(block)
        .render(area, buf);
        return;
    }

    Paragraph::new(challenge_lines(&app.typer, app.focus_mode))
        .wrap(Wrap { trim: false })
        .block(block)
        .render(area, buf);
}

/// Challenge text coloured by correctness, with the cursor underlined
pub fn challenge_lines(typer: &Typer, focus_mode: bool) -> Vec<Line<'static>> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let correct = bold.fg(Color::Green);
    let incorrect = bold.fg(Color::Red).bg(Color::Rgb(60, 20, 20));
    let untyped = Style::default().fg(Color::DarkGray);

    let cursor = typer.cursor_pos();
    let current_line = typer.current_line();
    let show_cursor = !typer.has_finished();

    let mut lines = vec![];
    let mut spans: Vec<Span> = vec![];
    let mut line_idx = 0;

    for (idx, (expected, state)) in typer.char_states().into_iter().enumerate() {
        let mut style = match state {
            CharState::Correct => correct,
            CharState::Incorrect => incorrect,
            CharState::Untyped => untyped,
        };
        if show_cursor && idx == cursor {
            style = style
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED);
        }
        if focus_mode && line_idx != current_line {
            style = style.add_modifier(Modifier::DIM);
        }

        let shown = match (expected, state) {
            ('\n', _) => "↵".to_owned(),
            ('\t', _) => "⇥   ".to_owned(),
            (' ', CharState::Incorrect) => "·".to_owned(),
            (c, _) => c.to_string(),
        };
        spans.push(Span::styled(shown, style));

        if expected == '\n' {
            lines.push(Line::from(std::mem::take(&mut spans)));
            line_idx += 1;
        }
    }
    lines.push(Line::from(spans));

    lines
}

fn render_wpm_chart(typer: &Typer, area: Rect, buf: &mut Buffer) {
    let (duration, highest_wpm) = charting::compute_chart_params(typer.wpm_samples());
    let points: Vec<(f64, f64)> = typer.wpm_samples().iter().map(|s| (s.t, s.wpm)).collect();

    let datasets = vec![Dataset::default()
        .marker(Marker::Braille)
        .style(Style::default().fg(Color::Magenta))
        .graph_type(GraphType::Line)
        .data(&points)];

    let dim = Style::default().add_modifier(Modifier::DIM);
    Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title(Span::styled("seconds", dim))
                .bounds([1.0, duration])
                .labels(vec![
                    Span::styled("1", dim),
                    Span::styled(charting::format_label(duration), dim),
                ]),
        )
        .y_axis(
            Axis::default()
                .title(Span::styled("wpm", dim))
                .bounds([0.0, highest_wpm])
                .labels(vec![
                    Span::styled("0", dim),
                    Span::styled(charting::format_label(highest_wpm), dim),
                ]),
        )
        .render(area, buf);
}

fn render_legend(app: &App, area: Rect, buf: &mut Buffer) {
    let text = if app.typer.has_finished() {
        "(r)estart (n)ew (p)rogress   ↑/↓ language   ctrl+f focus   (esc) quit"
    } else {
        "← restart   → new   ↑/↓ language   ctrl+p progress   ctrl+f focus   (esc) quit"
    };

    Paragraph::new(Span::styled(
        text,
        Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(area, buf);
}
