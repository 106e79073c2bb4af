//! Human-readable durations such as `250ms`, `1.5s` or `1h30m`.
//!
//! Used for `--ping-timeout` and for `@every <duration>` schedules.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DurationError {
    #[error("empty duration")]
    Empty,
    #[error("missing unit in {0:?} (use ns, us, ms, s, m or h)")]
    MissingUnit(String),
    #[error("invalid number {number:?} in {input:?}")]
    InvalidNumber { number: String, input: String },
    #[error("unknown unit {unit:?} in {input:?}")]
    UnknownUnit { unit: String, input: String },
    #[error("{0:?} is out of range")]
    OutOfRange(String),
}

/// Sum of one or more `<number><unit>` terms; numbers may be fractional.
pub fn parse_duration(input: &str) -> Result<Duration, DurationError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(DurationError::Empty);
    }
    let mut total = Duration::ZERO;
    let mut rest = input;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| DurationError::MissingUnit(input.to_owned()))?;
        let (number, tail) = rest.split_at(number_len);
        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);

        let value: f64 = number.parse().map_err(|_| DurationError::InvalidNumber {
            number: number.to_owned(),
            input: input.to_owned(),
        })?;
        let secs = match unit {
            "ns" => value / 1e9,
            "us" | "µs" => value / 1e6,
            "ms" => value / 1e3,
            "s" => value,
            "m" => value * 60.0,
            "h" => value * 3_600.0,
            other => {
                return Err(DurationError::UnknownUnit {
                    unit: other.to_owned(),
                    input: input.to_owned(),
                });
            }
        };
        let term = Duration::try_from_secs_f64(secs)
            .map_err(|_| DurationError::OutOfRange(input.to_owned()))?;
        total = total
            .checked_add(term)
            .ok_or_else(|| DurationError::OutOfRange(input.to_owned()))?;
        rest = tail;
    }
    Ok(total)
}
