// 📅 Calendar Quarters
// Labels like "2008q2" are the shared vocabulary of the GDP sheet and the
// quarterly housing table, so they get a real ordered type.

use crate::error::PipelineError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Quarter {
    // Field order matters: derived Ord is chronological
    year: i32,
    quarter: u8,
}

impl Quarter {
    /// Build a quarter for constants; panics (at compile time in const
    /// context) if `quarter` is outside 1..=4
    pub const fn at(year: i32, quarter: u8) -> Self {
        assert!(quarter >= 1 && quarter <= 4, "quarter must be in 1..=4");
        Quarter { year, quarter }
    }

    pub fn new(year: i32, quarter: u8) -> Option<Self> {
        (1..=4).contains(&quarter).then_some(Quarter { year, quarter })
    }

    /// Quarter containing the given date (Jan-Mar → q1 ... Oct-Dec → q4)
    pub fn from_date(date: NaiveDate) -> Self {
        Quarter {
            year: date.year(),
            quarter: (date.month0() / 3 + 1) as u8,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn quarter(&self) -> u8 {
        self.quarter
    }

    pub fn previous(self) -> Self {
        if self.quarter == 1 {
            Quarter {
                year: self.year - 1,
                quarter: 4,
            }
        } else {
            Quarter {
                year: self.year,
                quarter: self.quarter - 1,
            }
        }
    }

    pub fn next(self) -> Self {
        if self.quarter == 4 {
            Quarter {
                year: self.year + 1,
                quarter: 1,
            }
        } else {
            Quarter {
                year: self.year,
                quarter: self.quarter + 1,
            }
        }
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}q{}", self.year, self.quarter)
    }
}

impl FromStr for Quarter {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PipelineError::InvalidQuarter(s.to_string());

        let trimmed = s.trim();
        let (year, quarter) = trimmed
            .split_once(|c: char| c == 'q' || c == 'Q')
            .ok_or_else(invalid)?;

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let quarter: u8 = quarter.parse().map_err(|_| invalid())?;

        Quarter::new(year, quarter).ok_or_else(invalid)
    }
}

impl TryFrom<String> for Quarter {
    type Error = PipelineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Quarter> for String {
    fn from(q: Quarter) -> Self {
        q.to_string()
    }
}

/// Parse a monthly column header such as "2000-01" into the first day of
/// that month. Non-month headers ("RegionName", "SizeRank") yield None.
pub fn parse_month_column(header: &str) -> Option<NaiveDate> {
    let header = header.trim();
    if header.len() != 7 {
        return None;
    }
    NaiveDate::parse_from_str(&format!("{}-01", header), "%Y-%m-%d").ok()
}
