use std::{fmt, num::ParseIntError, time::Duration};

/// An error which can be returned when parsing a duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseDurationError {
    /// The input is empty.
    Empty,
    /// A number can not be parsed.
    InvalidNumber(ParseIntError),
    /// Unknown unit or units out of order.
    InvalidUnit(String),
}

impl fmt::Display for ParseDurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "duration is empty"),
            Self::InvalidNumber(err) => write!(f, "invalid number: {err}"),
            Self::InvalidUnit(unit) => write!(f, "invalid unit: {unit}"),
        }
    }
}

impl std::error::Error for ParseDurationError {}

/// Parses a duration like `7d`, `1h30m`, `90s` or `250ms`.
/// A bare number is treated as seconds.
pub fn parse_duration(input: &str) -> Result<Duration, ParseDurationError> {
    const UNITS: [(&str, u64); 6] = [
        ("w", 604_800_000),
        ("d", 86_400_000),
        ("h", 3_600_000),
        ("m", 60_000),
        ("s", 1_000),
        ("ms", 1),
    ];

    let input = input.trim();
    if input.is_empty() {
        return Err(ParseDurationError::Empty);
    }
    if input.bytes().all(|b| b.is_ascii_digit()) {
        let secs = input
            .parse::<u64>()
            .map_err(ParseDurationError::InvalidNumber)?;
        return Ok(Duration::from_secs(secs));
    }

    let mut remainder = input;
    let mut milliseconds = 0;
    let mut last_order = None;
    while !remainder.is_empty() {
        let index = remainder
            .find(|ch: char| !ch.is_ascii_digit())
            .ok_or_else(|| ParseDurationError::InvalidUnit(remainder.to_owned()))?;
        let (number, rest) = remainder.split_at(index);
        let number = number
            .parse::<u64>()
            .map_err(ParseDurationError::InvalidNumber)?;
        let unit_len = rest
            .find(|ch: char| ch.is_ascii_digit())
            .unwrap_or(rest.len());
        let (unit, rest) = rest.split_at(unit_len);
        let order = UNITS
            .iter()
            .position(|(name, _)| *name == unit)
            .ok_or_else(|| ParseDurationError::InvalidUnit(unit.to_owned()))?;
        if last_order.is_some_and(|last| order <= last) {
            return Err(ParseDurationError::InvalidUnit(unit.to_owned()));
        }
        milliseconds += number * UNITS[order].1;
        last_order = Some(order);
        remainder = rest;
    }
    Ok(Duration::from_millis(milliseconds))
}

#[cfg(test)]
mod tests {
    use super::{ParseDurationError, parse_duration};
    use std::time::Duration;

    #[test]
    fn it_parses_durations() {
        assert_eq!(parse_duration("90"), Ok(Duration::from_secs(90)));
        assert_eq!(parse_duration("100m"), Ok(Duration::from_secs(6000)));
        assert_eq!(parse_duration("7d"), Ok(Duration::from_secs(7 * 86400)));
        assert_eq!(parse_duration("1h30m"), Ok(Duration::from_secs(5400)));
        assert_eq!(parse_duration("2s250ms"), Ok(Duration::from_millis(2250)));
        assert_eq!(parse_duration(""), Err(ParseDurationError::Empty));
        assert!(matches!(
            parse_duration("5y"),
            Err(ParseDurationError::InvalidUnit(_))
        ));
        assert!(parse_duration("30m1h").is_err());
    }
}
