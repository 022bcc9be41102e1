//! In-game calendar. Day 0 is a Monday.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

pub const DAYS_PER_WEEK: u32 = 7;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clock {
    pub elapsed_days: u32,
}

impl Clock {
    pub fn new(elapsed_days: u32) -> Self {
        Self { elapsed_days }
    }

    pub fn weekday(&self) -> Weekday {
        weekday_of(self.elapsed_days)
    }

    /// Whether finishing the current day crosses a week boundary.
    pub fn closes_week(&self) -> bool {
        (self.elapsed_days + 1) % DAYS_PER_WEEK == 0
    }

    pub fn advance(&mut self) {
        self.elapsed_days = self.elapsed_days.saturating_add(1);
    }
}

/// Weekday of an elapsed-day count.
pub fn weekday_of(day: u32) -> Weekday {
    (0..day % DAYS_PER_WEEK).fold(Weekday::Mon, |d, _| d.succ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekdays_cycle_from_monday() {
        assert_eq!(weekday_of(0), Weekday::Mon);
        assert_eq!(weekday_of(4), Weekday::Fri);
        assert_eq!(weekday_of(6), Weekday::Sun);
        assert_eq!(weekday_of(7), Weekday::Mon);
        assert_eq!(weekday_of(23), Weekday::Wed);
    }

    #[test]
    fn week_closes_on_sunday() {
        let mut c = Clock::default();
        let mut closing = Vec::new();
        for _ in 0..15 {
            if c.closes_week() {
                closing.push(c.elapsed_days);
            }
            c.advance();
        }
        assert_eq!(closing, vec![6, 13]);
        assert_eq!(Clock::new(6).weekday(), Weekday::Sun);
    }
}
