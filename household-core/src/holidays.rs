//! Public holidays shown read-only in the calendar.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use serde::Serialize;

use crate::time::format_timestamp;

/// Supported holiday calendars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Country {
    Cz,
    Us,
}

impl Country {
    /// `cz` maps to Czechia; every other language gets US holidays.
    pub fn for_language(language: &str) -> Self {
        if language == "cz" {
            Country::Cz
        } else {
            Country::Us
        }
    }
}

/// One holiday as a whole-day calendar entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Holiday {
    /// `holiday-<epoch millis of the day start>`
    pub id: String,
    pub name: String,
    pub date: NaiveDate,
    #[serde(serialize_with = "as_wire_timestamp")]
    pub start: DateTime<Utc>,
    #[serde(serialize_with = "as_wire_timestamp")]
    pub end: DateTime<Utc>,
    pub is_holiday: bool,
}

fn as_wire_timestamp<S: serde::Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format_timestamp(dt))
}

impl Holiday {
    fn new(date: NaiveDate, name: &str) -> Self {
        let start = date.and_time(chrono::NaiveTime::MIN).and_utc();
        let end = start + Duration::days(1) - Duration::milliseconds(1);

        Holiday {
            id: format!("holiday-{}", start.timestamp_millis()),
            name: name.to_string(),
            date,
            start,
            end,
            is_holiday: true,
        }
    }
}

/// Where holidays come from.
pub trait HolidaySource {
    fn holidays_in(&self, year: i32) -> Vec<Holiday>;

    /// Holidays of `today`'s year and the next one, in date order.
    fn around(&self, today: NaiveDate) -> Vec<Holiday> {
        let mut holidays = self.holidays_in(today.year());
        holidays.extend(self.holidays_in(today.year() + 1));
        holidays.sort_by_key(|h| h.date);
        holidays
    }
}

/// Built-in table of public holidays. Good Friday is left out.
#[derive(Debug, Clone, Copy)]
pub struct PublicHolidays {
    country: Country,
}

impl PublicHolidays {
    pub fn new(country: Country) -> Self {
        PublicHolidays { country }
    }

    pub fn for_language(language: &str) -> Self {
        Self::new(Country::for_language(language))
    }
}

impl HolidaySource for PublicHolidays {
    fn holidays_in(&self, year: i32) -> Vec<Holiday> {
        let days = match self.country {
            Country::Cz => czech(year),
            Country::Us => american(year),
        };
        days.into_iter()
            .filter_map(|(date, name)| Some(Holiday::new(date?, name)))
            .collect()
    }
}

fn czech(year: i32) -> Vec<(Option<NaiveDate>, &'static str)> {
    let on = |m, d| NaiveDate::from_ymd_opt(year, m, d);
    vec![
        (on(1, 1), "Den obnovy samostatného českého státu"),
        (
            easter_sunday(year).map(|d| d + Duration::days(1)),
            "Velikonoční pondělí",
        ),
        (on(5, 1), "Svátek práce"),
        (on(5, 8), "Den vítězství"),
        (on(7, 5), "Den slovanských věrozvěstů Cyrila a Metoděje"),
        (on(7, 6), "Den upálení mistra Jana Husa"),
        (on(9, 28), "Den české státnosti"),
        (on(10, 28), "Den vzniku samostatného československého státu"),
        (on(11, 17), "Den boje za svobodu a demokracii"),
        (on(12, 24), "Štědrý den"),
        (on(12, 25), "1. svátek vánoční"),
        (on(12, 26), "2. svátek vánoční"),
    ]
}

fn american(year: i32) -> Vec<(Option<NaiveDate>, &'static str)> {
    let on = |m, d| NaiveDate::from_ymd_opt(year, m, d);
    let nth = |m, weekday, n| NaiveDate::from_weekday_of_month_opt(year, m, weekday, n);
    vec![
        (on(1, 1), "New Year's Day"),
        (nth(1, Weekday::Mon, 3), "Martin Luther King Jr. Day"),
        (nth(2, Weekday::Mon, 3), "Washington's Birthday"),
        (last_weekday_of_month(year, 5, Weekday::Mon), "Memorial Day"),
        (on(6, 19), "Juneteenth"),
        (on(7, 4), "Independence Day"),
        (nth(9, Weekday::Mon, 1), "Labor Day"),
        (nth(10, Weekday::Mon, 2), "Columbus Day"),
        (on(11, 11), "Veterans Day"),
        (nth(11, Weekday::Thu, 4), "Thanksgiving Day"),
        (on(12, 25), "Christmas Day"),
    ]
}

fn last_weekday_of_month(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let mut day = next_month.pred_opt()?;
    while day.weekday() != weekday {
        day = day.pred_opt()?;
    }
    Some(day)
}

/// Gregorian Easter Sunday (anonymous Gregorian algorithm).
fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;

    NaiveDate::from_ymd_opt(year, u32::try_from(month).ok()?, u32::try_from(day).ok()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn easter_dates() {
        assert_eq!(easter_sunday(2024), Some(date(2024, 3, 31)));
        assert_eq!(easter_sunday(2025), Some(date(2025, 4, 20)));
        assert_eq!(easter_sunday(2026), Some(date(2026, 4, 5)));
    }

    #[test]
    fn language_picks_the_country() {
        assert_eq!(Country::for_language("cz"), Country::Cz);
        assert_eq!(Country::for_language("en"), Country::Us);
        assert_eq!(Country::for_language(""), Country::Us);
    }

    #[test]
    fn czech_holidays_include_easter_monday_but_not_good_friday() {
        let holidays = PublicHolidays::new(Country::Cz).holidays_in(2024);
        let dates: Vec<_> = holidays.iter().map(|h| h.date).collect();

        assert_eq!(holidays.len(), 12);
        assert!(dates.contains(&date(2024, 4, 1)), "Easter Monday");
        assert!(!dates.contains(&date(2024, 3, 29)), "Good Friday");
    }

    #[test]
    fn us_floating_holidays() {
        let dates: Vec<_> = PublicHolidays::new(Country::Us)
            .holidays_in(2024)
            .into_iter()
            .map(|h| (h.name, h.date))
            .collect();

        assert!(dates.contains(&("Martin Luther King Jr. Day".into(), date(2024, 1, 15))));
        assert!(dates.contains(&("Memorial Day".into(), date(2024, 5, 27))));
        assert!(dates.contains(&("Thanksgiving Day".into(), date(2024, 11, 28))));
    }

    #[test]
    fn holiday_spans_the_whole_day() {
        let holiday = Holiday::new(date(2024, 12, 25), "Christmas Day");

        assert_eq!(holiday.id, format!("holiday-{}", holiday.start.timestamp_millis()));
        assert_eq!(format_timestamp(&holiday.start), "2024-12-25T00:00:00.000Z");
        assert_eq!(format_timestamp(&holiday.end), "2024-12-25T23:59:59.999Z");

        let json = serde_json::to_value(&holiday).unwrap();
        assert_eq!(json["isHoliday"], true);
    }

    #[test]
    fn around_covers_this_year_and_next() {
        let holidays = PublicHolidays::new(Country::Us).around(date(2024, 6, 1));

        assert_eq!(holidays.len(), 22);
        assert_eq!(holidays.first().unwrap().date, date(2024, 1, 1));
        assert_eq!(holidays.last().unwrap().date, date(2025, 12, 25));
    }
}
