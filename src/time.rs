//! Day/year calendar for the world simulation.
//!
//! Each year has a configurable number of days. The calendar advances one
//! day at a time and reports year rollovers so yearly batch processing can
//! run exactly once per wrap.

use std::fmt;
use serde::{Serialize, Deserialize};

/// A specific date in the world calendar (day within year + year).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldDate {
    /// Day of the year, starting at 1.
    pub day: u32,
    /// Year, starting at 1.
    pub year: u32,
}

impl WorldDate {
    pub fn new(day: u32, year: u32) -> Self {
        Self { day, year }
    }

    /// The very first date: Day 1, Year 1.
    pub fn origin() -> Self {
        Self { day: 1, year: 1 }
    }

    /// Advance by one day. Returns `true` when the year rolled over.
    pub fn advance(&mut self, days_per_year: u32) -> bool {
        self.day += 1;
        if self.day > days_per_year {
            self.day = 1;
            self.year += 1;
            return true;
        }
        false
    }

    /// Total days elapsed since the origin (Day 1, Year 1 = 0).
    pub fn total_days(&self, days_per_year: u32) -> u64 {
        (self.year as u64 - 1) * days_per_year as u64 + (self.day as u64 - 1)
    }

    /// Number of full years between two dates.
    pub fn years_since(&self, other: &WorldDate) -> i64 {
        self.year as i64 - other.year as i64
    }
}

impl Default for WorldDate {
    fn default() -> Self {
        Self::origin()
    }
}

impl Ord for WorldDate {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.year, self.day).cmp(&(other.year, other.day))
    }
}

impl PartialOrd for WorldDate {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for WorldDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Day {}, Year {}", self.day, self.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_within_year() {
        let mut d = WorldDate::origin();
        assert!(!d.advance(100));
        assert_eq!(d, WorldDate::new(2, 1));
    }

    #[test]
    fn test_advance_wraps_year() {
        let mut d = WorldDate::new(100, 3);
        assert!(d.advance(100));
        assert_eq!(d, WorldDate::new(1, 4));
    }

    #[test]
    fn test_ordering() {
        assert!(WorldDate::new(99, 1) < WorldDate::new(1, 2));
        assert!(WorldDate::new(5, 2) < WorldDate::new(6, 2));
    }

    #[test]
    fn test_total_days() {
        assert_eq!(WorldDate::origin().total_days(100), 0);
        assert_eq!(WorldDate::new(1, 2).total_days(100), 100);
        assert_eq!(WorldDate::new(51, 3).total_days(100), 250);
    }
}
