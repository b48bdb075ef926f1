//! Parsing of free-text time values from sheet cells.

use thiserror::Error;

/// A time cell that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimecodeError {
    #[error("malformed time {input:?}")]
    Malformed { input: String },

    #[error("negative time {input:?}")]
    Negative { input: String },
}

/// Parses a time cell into seconds.
///
/// Accepted forms:
/// - empty, `no`, `none`, `-` (any case): absent
/// - `M:S`, e.g. `1:30`
/// - `MmSs` with either part optional, e.g. `1m30s`, `2m`, `1m30`
/// - plain seconds with optional `s`, e.g. `90`, `90s`, `12.5`
///
/// Minutes are whole numbers; seconds may be fractional.
pub fn parse_time(cell: &str) -> Result<Option<f64>, TimecodeError> {
    let s = cell.trim();
    if s.is_empty() || matches!(s.to_ascii_lowercase().as_str(), "no" | "none" | "-") {
        return Ok(None);
    }

    let (minutes, seconds) = if let Some((m, sec)) = s.split_once(':') {
        (m, sec)
    } else if s.contains('m') {
        match s.trim_end_matches('s').split_once('m') {
            Some(parts) => parts,
            None => return Err(malformed(cell)),
        }
    } else {
        ("", s.trim_end_matches('s'))
    };

    let minutes = parse_minutes(minutes.trim(), cell)?;
    let seconds = parse_seconds(seconds.trim(), cell)?;

    Ok(Some(minutes as f64 * 60.0 + seconds))
}

fn parse_minutes(part: &str, cell: &str) -> Result<u64, TimecodeError> {
    if part.is_empty() {
        return Ok(0);
    }
    if part.starts_with('-') {
        return Err(negative(cell));
    }
    part.parse::<u64>().map_err(|_| malformed(cell))
}

fn parse_seconds(part: &str, cell: &str) -> Result<f64, TimecodeError> {
    if part.is_empty() {
        return Ok(0.0);
    }
    // f64::from_str also takes "inf" and "NaN"; only plain decimals are times
    if !part
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+'))
    {
        return Err(malformed(cell));
    }
    let value = part.parse::<f64>().map_err(|_| malformed(cell))?;
    if value < 0.0 {
        return Err(negative(cell));
    }
    Ok(value)
}

fn malformed(cell: &str) -> TimecodeError {
    TimecodeError::Malformed {
        input: cell.to_string(),
    }
}

fn negative(cell: &str) -> TimecodeError {
    TimecodeError::Negative {
        input: cell.to_string(),
    }
}
