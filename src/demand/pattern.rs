//! Weekly demand patterns.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::models::ShiftType;

/// Required headcount for each shift of one weekday.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayDemand {
    /// Morning headcount.
    #[serde(default)]
    pub morning: u32,
    /// Afternoon headcount.
    #[serde(default)]
    pub afternoon: u32,
    /// Night headcount.
    #[serde(default)]
    pub night: u32,
}

impl DayDemand {
    /// Headcount for one shift type.
    pub fn for_shift(&self, shift_type: ShiftType) -> u32 {
        match shift_type {
            ShiftType::Morning => self.morning,
            ShiftType::Afternoon => self.afternoon,
            ShiftType::Night => self.night,
        }
    }
}

/// A 7 × 3 table of required headcount by weekday and shift type.
///
/// # Example
///
/// ```
/// use shift_allocator::demand::WeeklyPattern;
/// use shift_allocator::models::ShiftType;
/// use chrono::Weekday;
///
/// let mut pattern = WeeklyPattern::uniform(3);
/// pattern.sunday.night = 1;
///
/// assert_eq!(pattern.required(Weekday::Sun, ShiftType::Night), 1);
/// assert_eq!(pattern.required(Weekday::Wed, ShiftType::Morning), 3);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyPattern {
    /// Monday headcounts.
    #[serde(default)]
    pub monday: DayDemand,
    /// Tuesday headcounts.
    #[serde(default)]
    pub tuesday: DayDemand,
    /// Wednesday headcounts.
    #[serde(default)]
    pub wednesday: DayDemand,
    /// Thursday headcounts.
    #[serde(default)]
    pub thursday: DayDemand,
    /// Friday headcounts.
    #[serde(default)]
    pub friday: DayDemand,
    /// Saturday headcounts.
    #[serde(default)]
    pub saturday: DayDemand,
    /// Sunday headcounts.
    #[serde(default)]
    pub sunday: DayDemand,
}

impl WeeklyPattern {
    /// A pattern requiring `count` people on every shift of every day.
    pub fn uniform(count: u32) -> Self {
        let day = DayDemand {
            morning: count,
            afternoon: count,
            night: count,
        };
        Self {
            monday: day,
            tuesday: day,
            wednesday: day,
            thursday: day,
            friday: day,
            saturday: day,
            sunday: day,
        }
    }

    /// Builds a pattern from rows ordered Monday to Sunday, columns
    /// ordered morning, afternoon, night.
    pub fn from_table(table: [[u32; 3]; 7]) -> Self {
        let day = |row: [u32; 3]| DayDemand {
            morning: row[0],
            afternoon: row[1],
            night: row[2],
        };
        Self {
            monday: day(table[0]),
            tuesday: day(table[1]),
            wednesday: day(table[2]),
            thursday: day(table[3]),
            friday: day(table[4]),
            saturday: day(table[5]),
            sunday: day(table[6]),
        }
    }

    /// The demand of one weekday.
    pub fn day(&self, weekday: Weekday) -> &DayDemand {
        match weekday {
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
            Weekday::Sun => &self.sunday,
        }
    }

    /// Required headcount for a weekday and shift type.
    pub fn required(&self, weekday: Weekday, shift_type: ShiftType) -> u32 {
        self.day(weekday).for_shift(shift_type)
    }
}
