//! Postcode key type.

use std::fmt;

/// Number of digits in a postcode key.
pub const POSTCODE_WIDTH: usize = 5;

/// Largest numeric postcode that fits in [`POSTCODE_WIDTH`] digits.
pub const MAX_POSTCODE: u32 = 99_999;

/// Error returned when building an invalid postcode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid postcode: {reason}")]
pub struct InvalidPostcode {
    reason: &'static str,
}

/// A 5-digit, zero-padded postcode.
///
/// This is the key the lookup service expects and the key the cache stores
/// entries under, so both sides always agree on the format.
///
/// # Examples
///
/// ```
/// use postcode_scraper::domain::Postcode;
///
/// let pc = Postcode::from_number(1000).unwrap();
/// assert_eq!(pc.as_str(), "01000");
///
/// assert!(Postcode::parse("01000").is_ok());
/// assert!(Postcode::parse("1000").is_err());
/// assert!(Postcode::from_number(100_000).is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Postcode([u8; POSTCODE_WIDTH]);

impl Postcode {
    /// Build a postcode from its numeric value, zero-padding to 5 digits.
    pub fn from_number(n: u32) -> Result<Self, InvalidPostcode> {
        if n > MAX_POSTCODE {
            return Err(InvalidPostcode {
                reason: "must be at most 99999",
            });
        }
        let padded = format!("{n:0width$}", width = POSTCODE_WIDTH);
        Self::parse(&padded)
    }

    /// Parse a postcode from a string.
    ///
    /// The input must be exactly 5 ASCII digits.
    pub fn parse(s: &str) -> Result<Self, InvalidPostcode> {
        let bytes = s.as_bytes();

        if bytes.len() != POSTCODE_WIDTH {
            return Err(InvalidPostcode {
                reason: "must be exactly 5 characters",
            });
        }

        if !bytes.iter().all(u8::is_ascii_digit) {
            return Err(InvalidPostcode {
                reason: "must be ASCII digits 0-9",
            });
        }

        let mut digits = [0u8; POSTCODE_WIDTH];
        digits.copy_from_slice(bytes);
        Ok(Postcode(digits))
    }

    /// Returns the postcode as a string slice.
    pub fn as_str(&self) -> &str {
        // SAFETY: We only store ASCII digits
        std::str::from_utf8(&self.0).unwrap()
    }
}

impl fmt::Debug for Postcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Postcode({})", self.as_str())
    }
}

impl fmt::Display for Postcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_pads_small_numbers() {
        assert_eq!(Postcode::from_number(0).unwrap().as_str(), "00000");
        assert_eq!(Postcode::from_number(1).unwrap().as_str(), "00001");
        assert_eq!(Postcode::from_number(50450).unwrap().as_str(), "50450");
        assert_eq!(Postcode::from_number(99999).unwrap().as_str(), "99999");
    }

    #[test]
    fn reject_out_of_range() {
        assert!(Postcode::from_number(100_000).is_err());
        assert!(Postcode::from_number(u32::MAX).is_err());
    }

    #[test]
    fn reject_wrong_length() {
        assert!(Postcode::parse("").is_err());
        assert!(Postcode::parse("1234").is_err());
        assert!(Postcode::parse("123456").is_err());
    }

    #[test]
    fn reject_non_digits() {
        assert!(Postcode::parse("1234a").is_err());
        assert!(Postcode::parse(" 1234").is_err());
        assert!(Postcode::parse("12-34").is_err());
    }

    #[test]
    fn ordering_matches_numeric_order() {
        let a = Postcode::from_number(999).unwrap();
        let b = Postcode::from_number(1000).unwrap();
        assert!(a < b);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any in-range number produces a 5-digit key that parses back
        #[test]
        fn from_number_always_parses(n in 0u32..=MAX_POSTCODE) {
            let pc = Postcode::from_number(n).unwrap();
            prop_assert_eq!(pc.as_str().len(), POSTCODE_WIDTH);
            prop_assert_eq!(Postcode::parse(pc.as_str()).unwrap(), pc);
        }

        /// Any 5-digit string is accepted unchanged
        #[test]
        fn digit_strings_roundtrip(s in "[0-9]{5}") {
            let pc = Postcode::parse(&s).unwrap();
            prop_assert_eq!(pc.as_str(), s.as_str());
        }
    }
}
