//! CF calendar time decoding.
//!
//! Argo files store `JULD` as a float offset from a reference epoch with a
//! `units` attribute such as `days since 1950-01-01 00:00:00 UTC`.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::{NetCdfError, NetCdfResult};

/// A parsed `"<unit> since <epoch>"` attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeUnits {
    /// Seconds per unit step
    pub seconds_per_unit: f64,
    pub epoch: DateTime<Utc>,
}

impl TimeUnits {
    /// Parse a CF units string. Returns `None` when the string is not a time unit.
    pub fn parse(units: &str) -> Option<Self> {
        let (unit, epoch) = units.trim().split_once(" since ")?;
        let seconds_per_unit = match unit.trim().to_ascii_lowercase().as_str() {
            "days" | "day" | "d" => 86_400.0,
            "hours" | "hour" | "hr" | "h" => 3_600.0,
            "minutes" | "minute" | "min" => 60.0,
            "seconds" | "second" | "sec" | "s" => 1.0,
            _ => return None,
        };
        let epoch = parse_epoch(epoch.trim())?;
        Some(Self {
            seconds_per_unit,
            epoch,
        })
    }

    /// Convert one raw offset; NaN and fill values decode to `None`.
    pub fn decode(&self, raw: f64) -> Option<DateTime<Utc>> {
        if !raw.is_finite() {
            return None;
        }
        let millis = (raw * self.seconds_per_unit * 1000.0).round();
        if millis.abs() > i64::MAX as f64 {
            return None;
        }
        self.epoch.checked_add_signed(Duration::milliseconds(millis as i64))
    }
}

fn parse_epoch(text: &str) -> Option<DateTime<Utc>> {
    let text = text
        .trim_end_matches("UTC")
        .trim_end_matches('Z')
        .trim();
    let text = text.replace('T', " ");

    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&text, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(&text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Decode a whole variable of raw offsets.
pub fn decode_times(
    name: &str,
    units: &str,
    raw: &[f64],
) -> NetCdfResult<Vec<Option<DateTime<Utc>>>> {
    let parsed = TimeUnits::parse(units).ok_or_else(|| {
        NetCdfError::InvalidFormat(format!("{}: unsupported time units '{}'", name, units))
    })?;
    Ok(raw.iter().map(|&v| parsed.decode(v)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_argo_juld_units() {
        let units = TimeUnits::parse("days since 1950-01-01 00:00:00 UTC").unwrap();
        assert_eq!(units.seconds_per_unit, 86_400.0);
        assert_eq!(units.epoch, Utc.with_ymd_and_hms(1950, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_decode_half_day() {
        let units = TimeUnits::parse("days since 1950-01-01").unwrap();
        let t = units.decode(1.5).unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(1950, 1, 2, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_nan_is_missing() {
        let units = TimeUnits::parse("seconds since 1970-01-01T00:00:00Z").unwrap();
        assert!(units.decode(f64::NAN).is_none());
    }

    #[test]
    fn test_not_a_time_unit() {
        assert!(TimeUnits::parse("decibar").is_none());
        assert!(TimeUnits::parse("fortnights since 1950-01-01").is_none());
        assert!(decode_times("JULD", "degree_Celsius", &[1.0]).is_err());
    }
}
