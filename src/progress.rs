use crate::generate::TextGenerator;
use crate::history::TypingSession;
use chrono::{DateTime, Datelike, TimeZone, Timelike};
use itertools::Itertools;
use serde::Serialize;
use tracing::warn;

/// Most recent sessions shown for a period
pub const MAX_PERIOD_SESSIONS: usize = 10;

/// Fewest sessions worth sending for analysis
pub const MIN_SESSIONS_FOR_ANALYSIS: usize = 2;

pub const NOT_ENOUGH_DATA: &str =
    "Not enough data to analyze. Complete a few more sessions to see your progress analysis.";

pub const ANALYSIS_UNAVAILABLE: &str =
    "Could not analyze progress at the moment. Please try again later.";

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum_macros::Display)]
pub enum Period {
    #[default]
    Today,
    #[strum(to_string = "This Week")]
    Week,
}

impl Period {
    pub fn toggle(self) -> Self {
        match self {
            Period::Today => Period::Week,
            Period::Week => Period::Today,
        }
    }
}

/// Unix ms of local midnight for the day containing `now`
pub fn start_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> i64 {
    let midnight = now.date_naive().and_hms_opt(0, 0, 0);
    match midnight.and_then(|m| now.timezone().from_local_datetime(&m).earliest()) {
        Some(dt) => dt.timestamp_millis(),
        // midnight skipped by a DST jump
        None => now.timestamp_millis() - i64::from(now.num_seconds_from_midnight()) * 1000,
    }
}

/// Unix ms at which `period` begins. Weeks start on Sunday.
pub fn period_start<Tz: TimeZone>(period: Period, now: &DateTime<Tz>) -> i64 {
    let today = start_of_day(now);
    match period {
        Period::Today => today,
        Period::Week => today - i64::from(now.weekday().num_days_from_sunday()) * DAY_MS,
    }
}

/// Sessions inside `period`, keeping only the most recent ones in
/// chronological order
pub fn filter_sessions<Tz: TimeZone>(
    sessions: &[TypingSession],
    period: Period,
    now: &DateTime<Tz>,
) -> Vec<TypingSession> {
    let start = period_start(period, now);
    let in_period: Vec<&TypingSession> =
        sessions.iter().filter(|s| s.timestamp >= start).collect();
    let skip = in_period.len().saturating_sub(MAX_PERIOD_SESSIONS);

    in_period.into_iter().skip(skip).cloned().collect()
}

/// Aggregate numbers shown above the progress charts
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodSummary {
    pub sessions: usize,
    pub languages: usize,
    pub avg_wpm: f64,
    pub avg_accuracy: f64,
    pub best_wpm: f64,
}

pub fn summarize(sessions: &[TypingSession]) -> Option<PeriodSummary> {
    if sessions.is_empty() {
        return None;
    }
    let count = sessions.len() as f64;

    Some(PeriodSummary {
        sessions: sessions.len(),
        languages: sessions.iter().map(|s| s.language.as_str()).unique().count(),
        avg_wpm: sessions.iter().map(|s| s.wpm).sum::<f64>() / count,
        avg_accuracy: sessions.iter().map(|s| s.accuracy).sum::<f64>() / count,
        best_wpm: sessions.iter().map(|s| s.wpm).fold(0.0, f64::max),
    })
}

#[derive(Serialize)]
struct SessionSample<'a> {
    wpm: f64,
    accuracy: f64,
    language: &'a str,
}

fn analysis_prompt(sessions: &[TypingSession]) -> String {
    let samples = sessions
        .iter()
        .map(|s| SessionSample {
            wpm: s.wpm,
            accuracy: s.accuracy,
            language: &s.language,
        })
        .collect_vec();
    let data = serde_json::to_string_pretty(&samples).unwrap_or_else(|_| "[]".to_string());

    format!(
        "Act as an expert typing coach. Analyze the following typing practice sessions data. \
         The data is a JSON array with wpm, accuracy, and language.\n\n\
         Data:\n{data}\n\n\
         Based on this data, provide a brief, encouraging analysis of the user's progress in 2-4 sentences.\n\
         - Identify trends in speed (WPM) and accuracy.\n\
         - Mention if there's improvement, decline, or consistency.\n\
         - Offer one simple, actionable tip.\n\
         - Keep the tone positive and motivational. Format as a single block of text, without markdown."
    )
}

/// Natural-language summary of `sessions`.
///
/// With fewer than [`MIN_SESSIONS_FOR_ANALYSIS`] sessions the generator is
/// never called.
pub fn analyze_typing_progress(generator: &dyn TextGenerator, sessions: &[TypingSession]) -> String {
    if sessions.len() < MIN_SESSIONS_FOR_ANALYSIS {
        return NOT_ENOUGH_DATA.to_string();
    }

    match generator.generate(&analysis_prompt(sessions)) {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            warn!(error = %e, "progress analysis failed");
            ANALYSIS_UNAVAILABLE.to_string()
        }
    }
}
