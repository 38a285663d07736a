//! # Timestamps, winters and periods
//!
//! Helpers converting the textual time formats found in the tracker output and in the
//! observational catalogues into [`hifitime::Epoch`] values (UTC), plus the calendar
//! conventions of the study:
//!
//! * a **winter** is named `"YYYY_YYYY"` and spans 1 October of the first year to
//!   30 April of the second year,
//! * a **period** is the span of a list of winters, `"{first start year}_{last end year}"`.
//!
//! Timestamps are compared through [`unix_minutes`], which gives an exact integer key
//! regardless of the internal representation of the epoch.
use hifitime::{Duration, Epoch};

use crate::constants::{Hours, SECONDS_PER_HOUR};
use crate::polarlows_errors::PolarLowsError;

fn parse_field<T: std::str::FromStr>(field: &str, what: &str) -> Result<T, String> {
    field
        .trim()
        .parse::<T>()
        .map_err(|_| format!("invalid {what}: '{field}'"))
}

/// Build a UTC epoch from calendar components, rejecting impossible dates.
pub fn utc_epoch(year: i32, month: u8, day: u8, hour: u8, minute: u8) -> Result<Epoch, String> {
    Epoch::maybe_from_gregorian_utc(year, month, day, hour, minute, 0, 0)
        .map_err(|e| format!("invalid date {year:04}-{month:02}-{day:02} {hour:02}:{minute:02}: {e}"))
}

/// Transformation from a compact `YYYYMMDDHHMM` string (UTC) to an [`Epoch`].
///
/// Argument
/// --------
/// * `date_str`: a 12-digit string, e.g. `"201101150600"`
///
/// Return
/// ------
/// * the epoch, or a message describing the offending part
pub fn compact_date_to_epoch(date_str: &str) -> Result<Epoch, String> {
    let s = date_str.trim();
    if s.len() != 12 || !s.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("expected YYYYMMDDHHMM, got '{date_str}'"));
    }

    let year = parse_field::<i32>(&s[0..4], "year")?;
    let month = parse_field::<u8>(&s[4..6], "month")?;
    let day = parse_field::<u8>(&s[6..8], "day")?;
    let hour = parse_field::<u8>(&s[8..10], "hour")?;
    let minute = parse_field::<u8>(&s[10..12], "minute")?;
    utc_epoch(year, month, day, hour, minute)
}

/// Transformation from the five split fields `YYYY MM DD HH MM` (UTC) to an [`Epoch`].
pub fn split_date_to_epoch(fields: &[&str]) -> Result<Epoch, String> {
    if fields.len() != 5 {
        return Err(format!(
            "expected 5 date fields (YYYY MM DD HH MM), got {}",
            fields.len()
        ));
    }

    let year = parse_field::<i32>(fields[0], "year")?;
    let month = parse_field::<u8>(fields[1], "month")?;
    let day = parse_field::<u8>(fields[2], "day")?;
    let hour = parse_field::<u8>(fields[3], "hour")?;
    let minute = parse_field::<u8>(fields[4], "minute")?;
    utc_epoch(year, month, day, hour, minute)
}

/// Transformation from an ISO date `YYYY-MM-DD` to the epoch of its midnight (UTC).
pub fn iso_date_to_epoch(date_str: &str) -> Result<Epoch, PolarLowsError> {
    let parts: Vec<&str> = date_str.trim().split('-').collect();
    let invalid = |reason: String| {
        PolarLowsError::InvalidParameter(format!("invalid date '{date_str}': {reason}"))
    };
    if parts.len() != 3 {
        return Err(invalid("expected YYYY-MM-DD".into()));
    }

    let year = parse_field::<i32>(parts[0], "year").map_err(invalid)?;
    let month = parse_field::<u8>(parts[1], "month").map_err(invalid)?;
    let day = parse_field::<u8>(parts[2], "day").map_err(invalid)?;
    utc_epoch(year, month, day, 0, 0).map_err(invalid)
}

/// Exclusive upper bound of an inclusive end date: midnight of the following day.
pub fn end_of_day_exclusive(date_str: &str) -> Result<Epoch, PolarLowsError> {
    Ok(iso_date_to_epoch(date_str)? + Duration::from_days(1.0))
}

/// Integer minutes since the Unix epoch, used as an exact comparison key.
#[inline]
pub fn unix_minutes(epoch: &Epoch) -> i64 {
    (epoch.to_unix_seconds() / 60.0).round() as i64
}

/// Integer seconds since the Unix epoch (archive representation).
#[inline]
pub fn unix_seconds(epoch: &Epoch) -> i64 {
    epoch.to_unix_seconds().round() as i64
}

/// Inverse of [`unix_seconds`].
#[inline]
pub fn epoch_from_unix_seconds(seconds: i64) -> Epoch {
    Epoch::from_unix_seconds(seconds as f64)
}

/// Elapsed hours from `start` to `end`.
#[inline]
pub fn hours_between(start: &Epoch, end: &Epoch) -> Hours {
    (unix_seconds(end) - unix_seconds(start)) as f64 / SECONDS_PER_HOUR
}

/// Split a winter name `"YYYY_YYYY"` into its two years.
pub fn winter_years(winter: &str) -> Result<(i32, i32), PolarLowsError> {
    let invalid = || PolarLowsError::InvalidParameter(format!("invalid winter '{winter}', expected YYYY_YYYY"));
    let (start, end) = winter.split_once('_').ok_or_else(invalid)?;
    if start.len() != 4 || end.len() != 4 {
        return Err(invalid());
    }
    let start = start.parse::<i32>().map_err(|_| invalid())?;
    let end = end.parse::<i32>().map_err(|_| invalid())?;
    Ok((start, end))
}

/// Date window of a winter: `("{start}-10-01", "{end}-04-30")`.
pub fn winter_dates(winter: &str) -> Result<(String, String), PolarLowsError> {
    let (start, end) = winter_years(winter)?;
    Ok((format!("{start:04}-10-01"), format!("{end:04}-04-30")))
}

/// Period label of a list of winters, e.g. `["2000_2001", …, "2017_2018"]` → `"2000_2018"`.
pub fn period(winters: &[String]) -> Result<String, PolarLowsError> {
    let (first, last) = match (winters.first(), winters.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => {
            return Err(PolarLowsError::InvalidParameter(
                "the list of winters is empty".into(),
            ))
        }
    };
    let (start, _) = winter_years(first)?;
    let (_, end) = winter_years(last)?;
    Ok(format!("{start:04}_{end:04}"))
}

#[cfg(test)]
mod time_test {
    use super::*;

    #[test]
    fn test_compact_date() {
        let e = compact_date_to_epoch("201101150600").unwrap();
        let (y, m, d, h, mi, _, _) = e.to_gregorian_utc();
        assert_eq!((y, m, d, h, mi), (2011, 1, 15, 6, 0));

        assert!(compact_date_to_epoch("2011011506").is_err());
        assert!(compact_date_to_epoch("20111315x600").is_err());
        assert!(compact_date_to_epoch("201113150600").is_err());
    }

    #[test]
    fn test_split_date_matches_compact() {
        let a = split_date_to_epoch(&["2005", "12", "31", "18", "30"]).unwrap();
        let b = compact_date_to_epoch("200512311830").unwrap();
        assert_eq!(unix_minutes(&a), unix_minutes(&b));
        assert!(split_date_to_epoch(&["2005", "12", "31"]).is_err());
    }

    #[test]
    fn test_hours_between_and_unix_roundtrip() {
        let a = compact_date_to_epoch("200801010000").unwrap();
        let b = compact_date_to_epoch("200801011800").unwrap();
        assert_eq!(hours_between(&a, &b), 18.0);

        let back = epoch_from_unix_seconds(unix_seconds(&b));
        assert_eq!(unix_minutes(&back), unix_minutes(&b));
    }

    #[test]
    fn test_winters_and_period() {
        assert_eq!(
            winter_dates("2008_2009").unwrap(),
            ("2008-10-01".to_string(), "2009-04-30".to_string())
        );
        assert!(winter_dates("2008-2009").is_err());

        let winters = vec!["2000_2001".to_string(), "2001_2002".into(), "2017_2018".into()];
        assert_eq!(period(&winters).unwrap(), "2000_2018");
        assert!(period(&[]).is_err());
    }

    #[test]
    fn test_end_of_day_is_next_midnight() {
        let end = end_of_day_exclusive("2009-04-30").unwrap();
        let next = iso_date_to_epoch("2009-05-01").unwrap();
        assert_eq!(unix_minutes(&end), unix_minutes(&next));
    }
}
