//! Age derivation from a birth date.

use chrono::{Datelike, NaiveDate};

/// Whole years between `birth` and `today`.
///
/// The year difference is reduced by one while this year's birthday has not
/// been reached yet. A 29 February birthday therefore counts on 1 March in
/// non-leap years.
#[must_use]
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    if today.month() < birth.month()
        || (today.month() == birth.month() && today.day() < birth.day())
    {
        age -= 1;
    }
    age
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_age_on_birthday() {
        let today = date(2024, 6, 15);
        for n in [0, 1, 18, 65, 120] {
            assert_eq!(age_on(date(2024 - n, 6, 15), today), n);
        }
    }

    #[test]
    fn test_age_day_before_birthday() {
        let today = date(2024, 6, 15);
        for n in [1, 18, 65, 120] {
            assert_eq!(age_on(date(2024 - n, 6, 16), today), n - 1);
        }
    }

    #[test]
    fn test_age_later_month_not_reached() {
        assert_eq!(age_on(date(1950, 12, 1), date(2024, 11, 30)), 73);
    }

    #[test]
    fn test_age_earlier_month_already_passed() {
        assert_eq!(age_on(date(1950, 1, 31), date(2024, 2, 1)), 74);
    }

    #[test]
    fn test_leap_day_birthday() {
        let birth = date(2000, 2, 29);
        assert_eq!(age_on(birth, date(2023, 2, 28)), 22);
        assert_eq!(age_on(birth, date(2023, 3, 1)), 23);
        assert_eq!(age_on(birth, date(2024, 2, 29)), 24);
    }

    #[test]
    fn test_future_birth_date_is_negative() {
        assert_eq!(age_on(date(2030, 1, 1), date(2024, 1, 1)), -6);
    }
}
