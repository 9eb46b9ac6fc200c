use crate::history::TypingSession;
use tracing::debug;

/// How often live stats are resampled while typing
pub const SAMPLE_INTERVAL_MS: i64 = 1000;

const CHARS_PER_WORD: f64 = 5.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TypingStatus {
    #[default]
    Waiting,
    Typing,
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TypingStats {
    pub wpm: f64,
    pub accuracy: f64,
    /// seconds since the first keystroke
    pub time: f64,
}

impl Default for TypingStats {
    fn default() -> Self {
        Self {
            wpm: 0.0,
            accuracy: 100.0,
            time: 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WpmSample {
    pub t: f64,
    pub wpm: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharState {
    Correct,
    Incorrect,
    Untyped,
}

/// Handle for the once-per-second stats sampler.
///
/// Armed while the run is in progress; every other state keeps it cancelled.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SamplerHandle {
    next_due_ms: Option<i64>,
}

impl SamplerHandle {
    fn arm(&mut self, now_ms: i64) {
        self.next_due_ms = Some(now_ms + SAMPLE_INTERVAL_MS);
    }

    fn cancel(&mut self) {
        self.next_due_ms = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next_due_ms.is_some()
    }

    /// Consumes one firing if due, rescheduling on the original cadence.
    /// Missed firings collapse into one.
    fn take_due(&mut self, now_ms: i64) -> bool {
        match self.next_due_ms {
            Some(due) if now_ms >= due => {
                let mut next = due + SAMPLE_INTERVAL_MS;
                while next <= now_ms {
                    next += SAMPLE_INTERVAL_MS;
                }
                self.next_due_ms = Some(next);
                true
            }
            _ => false,
        }
    }
}

/// Count of positions where the typed char matches the target char
pub fn correct_chars(input: &str, target: &str) -> usize {
    input
        .chars()
        .zip(target.chars())
        .filter(|(typed, expected)| typed == expected)
        .count()
}

pub fn accuracy(input: &str, target: &str) -> f64 {
    let typed = input.chars().count();
    if typed == 0 {
        return 100.0;
    }
    correct_chars(input, target) as f64 / typed as f64 * 100.0
}

/// Gross words per minute, a word being five characters
pub fn wpm(chars_typed: usize, elapsed_secs: f64) -> f64 {
    if chars_typed == 0 || elapsed_secs <= 0.0 {
        return 0.0;
    }
    (chars_typed as f64 / CHARS_PER_WORD) / (elapsed_secs / 60.0)
}

/// A single typing run against one challenge text
#[derive(Debug, Clone)]
pub struct Typer {
    language: String,
    challenge: String,
    challenge_len: usize,
    user_input: String,
    status: TypingStatus,
    started_at_ms: Option<i64>,
    stats: TypingStats,
    sampler: SamplerHandle,
    wpm_samples: Vec<WpmSample>,
}

impl Typer {
    pub fn new(language: impl Into<String>, challenge: impl Into<String>) -> Self {
        let challenge = challenge.into();
        Self {
            language: language.into(),
            challenge_len: challenge.chars().count(),
            challenge,
            user_input: String::new(),
            status: TypingStatus::Waiting,
            started_at_ms: None,
            stats: TypingStats::default(),
            sampler: SamplerHandle::default(),
            wpm_samples: vec![],
        }
    }

    /// Start over, either with a fresh challenge or the same one again
    pub fn reset(&mut self, challenge: impl Into<String>) {
        let challenge = challenge.into();
        self.challenge_len = challenge.chars().count();
        self.challenge = challenge;
        self.user_input.clear();
        self.status = TypingStatus::Waiting;
        self.started_at_ms = None;
        self.stats = TypingStats::default();
        self.sampler.cancel();
        self.wpm_samples.clear();
    }

    pub fn set_language(&mut self, language: impl Into<String>) {
        self.language = language.into();
    }

    /// Feed the complete current input buffer.
    ///
    /// Returns the finished session record exactly once, on the snapshot
    /// whose length matches the challenge.
    pub fn on_input_changed(&mut self, value: &str, now_ms: i64) -> Option<TypingSession> {
        if self.status == TypingStatus::Finished {
            return None;
        }

        let typed = value.chars().count();
        if self.status == TypingStatus::Waiting && typed > 0 {
            self.status = TypingStatus::Typing;
            self.started_at_ms = Some(now_ms);
            self.sampler.arm(now_ms);
            debug!(language = %self.language, "typing started");
        }

        self.user_input.clear();
        self.user_input.push_str(value);
        self.stats.accuracy = accuracy(value, &self.challenge);

        if typed > 0 && typed == self.challenge_len {
            return Some(self.finish(typed, now_ms));
        }

        None
    }

    fn finish(&mut self, typed: usize, now_ms: i64) -> TypingSession {
        self.status = TypingStatus::Finished;
        self.sampler.cancel();

        let elapsed = (now_ms - self.started_at_ms.unwrap_or(now_ms)) as f64 / 1000.0;
        self.stats.time = elapsed.max(0.0);
        self.stats.wpm = wpm(typed, elapsed);

        debug!(
            wpm = self.stats.wpm,
            accuracy = self.stats.accuracy,
            time = self.stats.time,
            "typing finished"
        );

        TypingSession {
            id: now_ms.max(0) as u64,
            language: self.language.clone(),
            wpm: self.stats.wpm,
            accuracy: self.stats.accuracy,
            time: self.stats.time,
            timestamp: now_ms,
        }
    }

    /// Drive the sampler. Returns true when a sample was taken.
    pub fn on_tick(&mut self, now_ms: i64) -> bool {
        if self.status != TypingStatus::Typing {
            self.sampler.cancel();
            return false;
        }
        let Some(started) = self.started_at_ms else {
            return false;
        };
        if !self.sampler.take_due(now_ms) {
            return false;
        }

        let elapsed = (now_ms - started) as f64 / 1000.0;
        let typed = self.user_input.chars().count();
        self.stats = TypingStats {
            wpm: wpm(typed, elapsed),
            accuracy: accuracy(&self.user_input, &self.challenge),
            time: elapsed.max(0.0),
        };
        self.wpm_samples.push(WpmSample {
            t: self.stats.time,
            wpm: self.stats.wpm,
        });
        true
    }

    pub fn status(&self) -> TypingStatus {
        self.status
    }

    pub fn stats(&self) -> TypingStats {
        self.stats
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn challenge(&self) -> &str {
        &self.challenge
    }

    pub fn user_input(&self) -> &str {
        &self.user_input
    }

    pub fn started_at_ms(&self) -> Option<i64> {
        self.started_at_ms
    }

    pub fn sampler(&self) -> &SamplerHandle {
        &self.sampler
    }

    pub fn wpm_samples(&self) -> &[WpmSample] {
        &self.wpm_samples
    }

    pub fn challenge_len(&self) -> usize {
        self.challenge_len
    }

    /// Cursor position in chars
    pub fn cursor_pos(&self) -> usize {
        self.user_input.chars().count()
    }

    /// Zero-based line of the challenge the cursor is on
    pub fn current_line(&self) -> usize {
        self.challenge
            .chars()
            .take(self.cursor_pos())
            .filter(|&c| c == '\n')
            .count()
    }

    pub fn has_started(&self) -> bool {
        self.status != TypingStatus::Waiting
    }

    pub fn has_finished(&self) -> bool {
        self.status == TypingStatus::Finished
    }

    /// Correctness of every challenge char, in order
    pub fn char_states(&self) -> Vec<(char, CharState)> {
        let mut typed = self.user_input.chars();
        self.challenge
            .chars()
            .map(|expected| {
                let state = match typed.next() {
                    Some(c) if c == expected => CharState::Correct,
                    Some(_) => CharState::Incorrect,
                    None => CharState::Untyped,
                };
                (expected, state)
            })
            .collect()
    }
}
