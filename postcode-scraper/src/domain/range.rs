//! The range of postcodes a scan visits.

use super::postcode::{MAX_POSTCODE, Postcode};

/// Errors from building a [`PostcodeRange`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidRange {
    /// Step of zero would never advance
    #[error("step must be greater than zero")]
    ZeroStep,

    /// Start is after end
    #[error("start {start} is after end {end}")]
    Inverted { start: u32, end: u32 },

    /// End does not fit in a 5-digit postcode
    #[error("end {0} exceeds the largest postcode 99999")]
    EndTooLarge(u32),
}

/// An inclusive, strided range of postcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostcodeRange {
    start: u32,
    end: u32,
    step: u32,
}

impl PostcodeRange {
    /// Create a range visiting `start, start + step, ...` up to and including `end`.
    pub fn new(start: u32, end: u32, step: u32) -> Result<Self, InvalidRange> {
        if step == 0 {
            return Err(InvalidRange::ZeroStep);
        }
        if end > MAX_POSTCODE {
            return Err(InvalidRange::EndTooLarge(end));
        }
        if start > end {
            return Err(InvalidRange::Inverted { start, end });
        }
        Ok(Self { start, end, step })
    }

    /// The full 5-digit space, one postcode at a time.
    pub fn all() -> Self {
        Self {
            start: 0,
            end: MAX_POSTCODE,
            step: 1,
        }
    }

    /// Number of postcodes the range visits. Never zero.
    pub(crate) fn len(&self) -> usize {
        ((self.end - self.start) / self.step) as usize + 1
    }

    /// Iterate the postcodes in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Postcode> + use<> {
        (self.start..=self.end)
            .step_by(self.step as usize)
            .filter_map(|n| Postcode::from_number(n).ok())
    }
}

impl Default for PostcodeRange {
    fn default() -> Self {
        Self::all()
    }
}
