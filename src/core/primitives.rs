use chrono::{DateTime, Utc};

use crate::error::{ChartError, ChartResult};

pub const DAY_MILLIS: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

pub fn unix_millis_to_datetime(timestamp: f64) -> ChartResult<DateTime<Utc>> {
    if !timestamp.is_finite() {
        return Err(ChartError::InvalidData(
            "timestamp must be finite".to_owned(),
        ));
    }
    DateTime::from_timestamp_millis(timestamp.round() as i64).ok_or_else(|| {
        ChartError::InvalidData(format!("timestamp {timestamp} is out of range"))
    })
}

#[cfg(test)]
mod tests {
    use super::unix_millis_to_datetime;

    #[test]
    fn millis_convert_to_utc_datetime() {
        let time = unix_millis_to_datetime(1_553_040_000_000.4).expect("in range");
        assert_eq!(time.timestamp_millis(), 1_553_040_000_000);
        assert_eq!(time.format("%Y-%m-%d").to_string(), "2019-03-20");
    }

    #[test]
    fn non_finite_timestamp_is_rejected() {
        assert!(unix_millis_to_datetime(f64::NAN).is_err());
    }
}
