use ratatui::{text::Line, widgets::Bar};

use crate::history::TypingSession;
use crate::typing::WpmSample;

/// Compute X (seconds) and Y (WPM) bounds for the live WPM chart
pub fn compute_chart_params(samples: &[WpmSample]) -> (f64, f64) {
    let highest_wpm = samples.iter().map(|s| s.wpm).fold(0.0, f64::max);
    let overall_duration = samples.last().map_or(1.0, |s| s.t).max(1.0);

    (overall_duration, highest_wpm.ceil().max(1.0))
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}

/// Short bar label for a session: the first four chars of its language
pub fn session_label(session: &TypingSession) -> String {
    session.language.chars().take(4).collect()
}

/// One bar per session using `metric`, in history order
pub fn session_bars(
    sessions: &[TypingSession],
    metric: impl Fn(&TypingSession) -> f64,
) -> Vec<Bar<'static>> {
    sessions
        .iter()
        .map(|s| {
            let value = metric(s).max(0.0).round();
            Bar::default()
                .label(Line::from(session_label(s)))
                .value(value as u64)
                .text_value(format!("{value:.0}"))
        })
        .collect()
}
