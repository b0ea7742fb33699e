//! Date of birth validation and age arithmetic.

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{HearthError, Result};

/// Minimum age for an adult account.
pub const ADULT_AGE: i32 = 18;

const MIN_BIRTH_YEAR: i32 = 1900;

/// A calendar date of birth as exchanged with the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateOfBirth {
    pub day: u32,
    pub month: u32,
    pub year: i32,
}

impl DateOfBirth {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self { day, month, year }
    }

    /// Parses form input, checking ranges against `today`.
    pub fn parse(year: &str, month: &str, day: &str, today: NaiveDate) -> Result<Self> {
        let (Ok(year), Ok(month), Ok(day)) = (
            year.trim().parse::<i32>(),
            month.trim().parse::<u32>(),
            day.trim().parse::<u32>(),
        ) else {
            return Err(HearthError::validation("Please enter a valid date"));
        };

        let dob = Self::new(year, month, day);
        dob.validate(today)?;
        Ok(dob)
    }

    /// Checks field ranges and that the date exists on the calendar.
    pub fn validate(&self, today: NaiveDate) -> Result<()> {
        if !(1..=12).contains(&self.month) {
            return Err(HearthError::validation("Month must be between 1 and 12"));
        }
        if !(1..=31).contains(&self.day) {
            return Err(HearthError::validation("Day must be between 1 and 31"));
        }
        let current_year = today.year();
        if self.year < MIN_BIRTH_YEAR || self.year > current_year {
            return Err(HearthError::validation(format!(
                "Year must be between {} and {}",
                MIN_BIRTH_YEAR, current_year
            )));
        }
        if self.to_naive_date().is_none() {
            return Err(HearthError::validation("Please enter a valid date"));
        }
        Ok(())
    }

    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }
}

/// Whole years between `dob` and `today`.
///
/// The birthday counts on its calendar day; before it in the current year
/// the age is one less.
pub fn calculate_age_on(dob: &DateOfBirth, today: NaiveDate) -> i32 {
    let mut age = today.year() - dob.year;
    if (today.month(), today.day()) < (dob.month, dob.day) {
        age -= 1;
    }
    age
}

/// Age as of the local calendar date.
pub fn calculate_age(dob: &DateOfBirth) -> i32 {
    calculate_age_on(dob, Local::now().date_naive())
}

pub fn is_adult_on(dob: &DateOfBirth, today: NaiveDate) -> bool {
    calculate_age_on(dob, today) >= ADULT_AGE
}

pub fn is_adult(dob: &DateOfBirth) -> bool {
    calculate_age(dob) >= ADULT_AGE
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dob_of(date: NaiveDate) -> DateOfBirth {
        DateOfBirth::new(date.year(), date.month(), date.day())
    }

    #[test]
    fn test_birthday_boundary() {
        let today = date(2026, 10, 19);
        assert_eq!(calculate_age_on(&DateOfBirth::new(2000, 10, 19), today), 26);
        assert_eq!(calculate_age_on(&DateOfBirth::new(2000, 10, 20), today), 25);
        assert_eq!(calculate_age_on(&DateOfBirth::new(2000, 9, 30), today), 26);
    }

    #[test]
    fn test_earlier_birth_year_adds_exactly_one_year() {
        let today = date(2026, 3, 1);
        for (y, m, d) in [(1990, 1, 1), (1990, 3, 1), (1990, 3, 2), (2004, 12, 31)] {
            let dob = DateOfBirth::new(y, m, d);
            let older = DateOfBirth::new(y - 1, m, d);
            assert_eq!(calculate_age_on(&older, today), calculate_age_on(&dob, today) + 1);
        }
    }

    #[test]
    fn test_adult_threshold_is_exact() {
        let today = date(2026, 10, 19);
        let eighteen_years_ago = date(2008, 10, 19);
        assert!(is_adult_on(&dob_of(eighteen_years_ago), today));

        let one_day_short = eighteen_years_ago + Duration::days(1);
        assert!(!is_adult_on(&dob_of(one_day_short), today));
    }

    #[test]
    fn test_leap_day_birthday() {
        let dob = DateOfBirth::new(2008, 2, 29);
        assert_eq!(calculate_age_on(&dob, date(2026, 2, 28)), 17);
        assert_eq!(calculate_age_on(&dob, date(2026, 3, 1)), 18);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        let today = date(2026, 10, 19);
        let err = DateOfBirth::parse("abc", "1", "1", today).unwrap_err();
        assert_eq!(err, HearthError::validation("Please enter a valid date"));

        let err = DateOfBirth::parse("2000", "13", "1", today).unwrap_err();
        assert_eq!(err, HearthError::validation("Month must be between 1 and 12"));

        let err = DateOfBirth::parse("2000", "1", "32", today).unwrap_err();
        assert_eq!(err, HearthError::validation("Day must be between 1 and 31"));

        let err = DateOfBirth::parse("1899", "1", "1", today).unwrap_err();
        assert_eq!(err, HearthError::validation("Year must be between 1900 and 2026"));

        let err = DateOfBirth::parse("2001", "2", "30", today).unwrap_err();
        assert_eq!(err, HearthError::validation("Please enter a valid date"));
    }

    #[test]
    fn test_parse_accepts_valid_input() {
        let dob = DateOfBirth::parse(" 1985 ", "07", "4", date(2026, 1, 1)).unwrap();
        assert_eq!(dob, DateOfBirth::new(1985, 7, 4));
    }
}
