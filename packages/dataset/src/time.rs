//! `TIME OCC` normalization.
//!
//! The LA export stores time of day as an integer `HHMM` with leading zeros
//! dropped, so `09:30` arrives as `930` and `00:05` arrives as `5`.

/// Errors produced while normalizing a time-of-day value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeError {
    /// Only 3- and 4-digit values have a defined `HH:MM` form.
    #[error("Unsupported TIME OCC value {value}: expected 3 or 4 digits, got {digits}")]
    UnsupportedWidth {
        /// The raw value.
        value: u32,
        /// Number of decimal digits in the raw value.
        digits: usize,
    },
}

/// Converts a raw `TIME OCC` value into `HH:MM`.
///
/// `1230` becomes `12:30` and `930` becomes `09:30`. No range check is
/// performed here, so `2560` becomes `25:60`; out-of-range clocks are
/// rejected when the combined date-time is parsed.
///
/// # Errors
///
/// Returns [`TimeError::UnsupportedWidth`] for values with 1, 2, or more
/// than 4 digits.
pub fn normalize_time_occ(value: u32) -> Result<String, TimeError> {
    let digits = value.to_string();

    match digits.len() {
        4 => Ok(format!("{}:{}", &digits[..2], &digits[2..])),
        3 => Ok(format!("0{}:{}", &digits[..1], &digits[1..])),
        len => Err(TimeError::UnsupportedWidth { value, digits: len }),
    }
}
