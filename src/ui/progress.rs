use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{BarChart, BarGroup, Block, Borders, Paragraph, Tabs, Widget, Wrap},
};

use crate::app::App;
use crate::history::TypingSession;
use crate::progress::{self, Period, PeriodSummary, MIN_SESSIONS_FOR_ANALYSIS};
use crate::ui::charting::session_bars;

const HORIZONTAL_MARGIN: u16 = 3;
const ANALYSIS_HEIGHT: u16 = 7;

/// Progress screen for the selected period
pub struct ProgressView<'a>(pub &'a App);

impl Widget for ProgressView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let app = self.0;
        let sessions = app.period_sessions();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(1)
            .constraints([
                Constraint::Length(1), // title
                Constraint::Length(1), // period tabs
                Constraint::Length(1), // summary
                Constraint::Min(6),    // charts
                Constraint::Length(ANALYSIS_HEIGHT),
                Constraint::Length(1), // legend
            ])
            .split(area);

        Paragraph::new(Span::styled(
            "Your Progress",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

        render_period_tabs(app.period, chunks[1], buf);

        Paragraph::new(summary_line(progress::summarize(&sessions).as_ref()))
            .alignment(Alignment::Center)
            .render(chunks[2], buf);

        if sessions.is_empty() {
            Paragraph::new(Span::styled(
                "No data for this period.",
                Style::default().fg(Color::DarkGray),
            ))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL))
            .render(chunks[3], buf);
        } else {
            render_charts(&sessions, chunks[3], buf);
        }

        render_analysis(app, sessions.len(), chunks[4], buf);

        Paragraph::new(Span::styled(
            "(t)oday (w)eek (a)nalyze (c)lear history   (esc) back",
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .render(chunks[5], buf);
    }
}

fn render_period_tabs(period: Period, area: Rect, buf: &mut Buffer) {
    let periods = [Period::Today, Period::Week];
    let selected = periods.iter().position(|p| *p == period).unwrap_or(0);

    Tabs::new(periods.iter().map(|p| Line::from(p.to_string())))
        .select(selected)
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        )
        .render(area, buf);
}

pub fn summary_line(summary: Option<&PeriodSummary>) -> Line<'static> {
    let Some(s) = summary else {
        return Line::default();
    };
    let dim = Style::default().fg(Color::Gray);
    let bold = Style::default().add_modifier(Modifier::BOLD);

    Line::from(vec![
        Span::styled(format!("{}", s.sessions), bold),
        Span::styled(" sessions   avg ", dim),
        Span::styled(format!("{:.0}", s.avg_wpm), bold),
        Span::styled(" wpm   best ", dim),
        Span::styled(format!("{:.0}", s.best_wpm), bold),
        Span::styled(" wpm   ", dim),
        Span::styled(format!("{:.0}%", s.avg_accuracy), bold),
        Span::styled(" accuracy   ", dim),
        Span::styled(format!("{}", s.languages), bold),
        Span::styled(" languages", dim),
    ])
}

fn render_charts(sessions: &[TypingSession], area: Rect, buf: &mut Buffer) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    bar_chart("WPM", session_bars(sessions, |s| s.wpm), Color::Cyan, None)
        .render(halves[0], buf);
    bar_chart(
        "Accuracy %",
        session_bars(sessions, |s| s.accuracy),
        Color::Green,
        Some(100),
    )
    .render(halves[1], buf);
}

fn bar_chart<'a>(
    title: &'a str,
    bars: Vec<ratatui::widgets::Bar<'a>>,
    color: Color,
    max: Option<u64>,
) -> BarChart<'a> {
    let chart = BarChart::default()
        .block(Block::default().title(title).borders(Borders::ALL))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .bar_style(Style::default().fg(color))
        .value_style(Style::default().fg(Color::Black).bg(color))
        .data(BarGroup::default().bars(&bars));

    match max {
        Some(m) => chart.max(m),
        None => chart,
    }
}

fn render_analysis(app: &App, session_count: usize, area: Rect, buf: &mut Buffer) {
    let block = Block::default()
        .title("AI Coach")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let text = if app.analyzing {
        Text::from(Span::styled(
            "Analyzing your performance...",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),
        ))
    } else if let Some(analysis) = &app.analysis {
        Text::from(analysis.as_str())
    } else {
        let mut lines = vec![Line::styled(
            "Press (a) for an analysis of this period.",
            Style::default().fg(Color::Gray),
        )];
        if session_count < MIN_SESSIONS_FOR_ANALYSIS {
            lines.push(Line::styled(
                "Complete at least 2 sessions in this period for analysis.",
                Style::default().fg(Color::DarkGray),
            ));
        }
        Text::from(lines)
    };

    Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .block(block)
        .render(area, buf);
}
