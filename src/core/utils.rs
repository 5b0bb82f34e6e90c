use chrono::{DateTime, FixedOffset, NaiveDate};

/// Business timezone of the shop (WIB, +0700).
pub fn business_offset() -> FixedOffset {
    FixedOffset::east_opt(7 * 60 * 60).unwrap() // +0700
}

pub fn datetime_to_string(datetime: DateTime<FixedOffset>) -> String {
    datetime
        .with_timezone(&business_offset())
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

pub fn datetime_to_string_opt(datetime: Option<DateTime<FixedOffset>>) -> Option<String> {
    datetime.map(datetime_to_string)
}

/// Calendar day of `datetime` in the shop's timezone.
pub fn business_date(datetime: &DateTime<FixedOffset>) -> NaiveDate {
    datetime.with_timezone(&business_offset()).date_naive()
}

pub fn date_to_string(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Midnight of `date` in the shop's timezone.
pub fn start_of_business_day(date: NaiveDate) -> Option<DateTime<FixedOffset>> {
    date.and_hms_opt(0, 0, 0)?
        .and_local_timezone(business_offset())
        .single()
}

/// Parse `YYYY-MM-DD`.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::*;

    #[test]
    fn test_business_date_rolls_over_at_local_midnight() {
        // 17:30 UTC is already the next day in +0700
        let utc = Utc
            .with_ymd_and_hms(2024, 3, 9, 17, 30, 0)
            .unwrap()
            .fixed_offset();
        assert_eq!(
            business_date(&utc),
            NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
        );
        let utc = Utc
            .with_ymd_and_hms(2024, 3, 9, 16, 59, 0)
            .unwrap()
            .fixed_offset();
        assert_eq!(
            business_date(&utc),
            NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
        );
    }

    #[test]
    fn test_datetime_to_string() {
        let utc = Utc
            .with_ymd_and_hms(2024, 3, 9, 1, 2, 3)
            .unwrap()
            .fixed_offset();
        assert_eq!(datetime_to_string(utc), "2024-03-09 08:02:03".to_string());
        assert_eq!(datetime_to_string_opt(None), None);
    }

    #[test]
    fn test_start_of_business_day() {
        let start = start_of_business_day(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()).unwrap();
        assert_eq!(
            start,
            Utc.with_ymd_and_hms(2024, 3, 9, 17, 0, 0).unwrap().fixed_offset()
        );
        assert_eq!(business_date(&start), NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-12-31"),
            NaiveDate::from_ymd_opt(2024, 12, 31)
        );
        assert_eq!(parse_date("31-12-2024"), None);
        assert_eq!(parse_date(""), None);
    }
}
