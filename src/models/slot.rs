//! Weekly time grid.
//!
//! A week is seven days, each split into numbered teaching periods.
//! A `TimeSlot` is one (day, period) cell of that grid; sections occupy
//! sets of cells and two sections conflict on every cell they share.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of days in the weekly grid.
pub const DAYS_PER_WEEK: usize = 7;

/// Highest valid period number (periods are 1-based).
pub const MAX_PERIOD: u8 = 16;

/// Day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    /// All days, Monday first.
    pub const ALL: [Day; DAYS_PER_WEEK] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    /// Zero-based index (Monday = 0).
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Day for a zero-based index, if in range.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
        };
        f.write_str(name)
    }
}

/// One cell of the weekly grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Day of the week.
    pub day: Day,
    /// Teaching period (1-based).
    pub period: u8,
}

impl TimeSlot {
    /// Creates a new time slot.
    pub fn new(day: Day, period: u8) -> Self {
        Self { day, period }
    }

    /// Whether the period lies within `1..=MAX_PERIOD`.
    #[inline]
    pub fn is_valid(&self) -> bool {
        (1..=MAX_PERIOD).contains(&self.period)
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.day, self.period)
    }
}
