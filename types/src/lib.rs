//! Fundamental types for the pledge sign-up service.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: timestamps, normalized email addresses, district codes,
//! representatives, and the signature record itself.

pub mod district;
pub mod email;
pub mod signature;
pub mod time;

pub use district::{DistrictCode, DistrictParseError, Representative};
pub use email::Email;
pub use signature::Signature;
pub use time::{Clock, SystemClock, Timestamp};
