//! Deterministic stand-ins for every external collaborator of the
//! sign-up workflow: clock, code source, geocoder, notifier, and storage.
//!
//! Each nullable is scripted up front and records what was asked of it,
//! so tests assert on behavior without mocks or network.

pub mod clock;
pub mod codes;
pub mod geocoder;
pub mod notifier;
pub mod store;

pub use clock::NullClock;
pub use codes::NullCodeSource;
pub use geocoder::NullGeocoder;
pub use notifier::NullNotifier;
pub use store::{NullSink, NullStore};
