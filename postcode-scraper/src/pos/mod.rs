//! Pos Malaysia postcode lookup client.
//!
//! Provides postcode → location records, fetched one postcode per request
//! from the public postcode API. A mock client serves canned responses for
//! offline runs and tests.

mod client;
mod error;
mod mock;

pub use client::{PosClient, PosClientConfig};
pub use error::PosError;
pub use mock::MockPosClient;
