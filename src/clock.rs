use chrono::{DateTime, Local, TimeZone};
use std::cell::Cell;
use std::rc::Rc;

/// Source of "now" for the typing session and the history filters
pub trait Clock {
    fn now(&self) -> DateTime<Local>;

    fn now_ms(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    ms: Rc<Cell<i64>>,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            ms: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn set(&self, ms: i64) {
        self.ms.set(ms);
    }

    pub fn advance(&self, ms: i64) {
        self.ms.set(self.ms.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        Local
            .timestamp_millis_opt(self.ms.get())
            .single()
            .unwrap_or_else(Local::now)
    }

    fn now_ms(&self) -> i64 {
        self.ms.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new(1_000);
        let other = clock.clone();

        other.advance(500);
        assert_eq!(clock.now_ms(), 1_500);

        clock.set(42);
        assert_eq!(other.now_ms(), 42);
        assert_eq!(other.now().timestamp_millis(), 42);
    }
}
