use tracing::trace;

use crate::core::primitives::unix_millis_to_datetime;

/// Text formatting hook for dates and values shown on the chart.
///
/// Date patterns use single-letter tokens: `j` day of month, `F` full month
/// name, `M` short month name, `Y` four-digit year, `D` short weekday. Any
/// other character is copied verbatim.
pub trait LabelFormatter {
    fn format_date(&self, timestamp_ms: f64, pattern: &str) -> String;
    fn format_number(&self, value: f64) -> String;
}

/// English labels in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLabelFormatter;

impl LabelFormatter for DefaultLabelFormatter {
    fn format_date(&self, timestamp_ms: f64, pattern: &str) -> String {
        let Ok(time) = unix_millis_to_datetime(timestamp_ms) else {
            trace!(timestamp_ms, "timestamp out of range for date label");
            return String::new();
        };

        let mut out = String::with_capacity(pattern.len() * 3);
        for token in pattern.chars() {
            let spec = match token {
                'j' => "%-d",
                'F' => "%B",
                'M' => "%b",
                'Y' => "%Y",
                'D' => "%a",
                other => {
                    out.push(other);
                    continue;
                }
            };
            out.push_str(&time.format(spec).to_string());
        }
        out
    }

    fn format_number(&self, value: f64) -> String {
        if !value.is_finite() {
            return value.to_string();
        }
        let negative = value < 0.0;
        let rounded = (value.abs() * 100.0).round() / 100.0;
        let whole = rounded.trunc();
        let fraction = rounded - whole;

        let mut out = String::new();
        if negative && rounded > 0.0 {
            out.push('-');
        }
        out.push_str(&group_thousands(&format!("{whole:.0}")));
        if fraction > 0.0 {
            let decimals = format!("{fraction:.2}");
            out.push_str(decimals.trim_start_matches('0').trim_end_matches('0'));
        }
        out
    }
}

/// Inserts a space between every group of three digits.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (len - index) % 3 == 0 {
            out.push(' ');
        }
        out.push(digit);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{DefaultLabelFormatter, LabelFormatter};

    // 2019-03-05T00:00:00Z, a Tuesday.
    const MARCH_5: f64 = 1_551_744_000_000.0;

    #[test]
    fn formats_date_tokens() {
        let formatter = DefaultLabelFormatter;
        assert_eq!(formatter.format_date(MARCH_5, "D, j M"), "Tue, 5 Mar");
        assert_eq!(formatter.format_date(MARCH_5, "j F Y"), "5 March 2019");
        assert_eq!(formatter.format_date(MARCH_5, "M"), "Mar");
    }

    #[test]
    fn out_of_range_timestamp_yields_empty_label() {
        assert!(DefaultLabelFormatter.format_date(f64::NAN, "j M").is_empty());
    }

    #[test]
    fn groups_thousands_with_spaces() {
        let formatter = DefaultLabelFormatter;
        assert_eq!(formatter.format_number(0.0), "0");
        assert_eq!(formatter.format_number(999.0), "999");
        assert_eq!(formatter.format_number(1_234_567.0), "1 234 567");
        assert_eq!(formatter.format_number(-4_500.0), "-4 500");
        assert_eq!(formatter.format_number(1_000.5), "1 000.5");
    }
}
