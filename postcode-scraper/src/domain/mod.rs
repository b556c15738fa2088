//! Domain types for the postcode scraper.
//!
//! This module contains the validated building blocks of a scan: the
//! postcode key, the range of postcodes to visit, and the flat record the
//! lookup service returns. Postcode types enforce their invariants at
//! construction time.

mod postcode;
mod range;
mod record;

pub use postcode::{InvalidPostcode, MAX_POSTCODE, POSTCODE_WIDTH, Postcode};
pub use range::{InvalidRange, PostcodeRange};
pub use record::Record;
