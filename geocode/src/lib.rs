//! Geocoding clients: free-text address search and district resolution.
//!
//! Two independent services back the sign-up flow: an open address search
//! (no API key, identified by User-Agent) that turns free text into
//! candidate addresses, and a keyed district resolver that turns a
//! confirmed address into a `STATE-NUMBER` district code plus the sitting
//! representative. Both are read-only and safe to retry.

pub mod district;
pub mod error;
pub mod search;

pub use district::{DistrictClient, DistrictResolution};
pub use error::GeocodeError;
pub use search::{AddressCandidate, AddressSearchClient};

use async_trait::async_trait;

/// The geocoding seam the workflow drives.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve free text to candidate addresses. Errors mean the service
    /// was unreachable or misbehaved — never "no matches".
    async fn search_addresses(&self, query: &str)
        -> Result<Vec<AddressCandidate>, GeocodeError>;

    /// Resolve a confirmed address to its district and representative.
    async fn resolve_district(&self, address: &str)
        -> Result<DistrictResolution, GeocodeError>;
}

/// Production geocoder combining the two HTTP clients.
pub struct HttpGeocoder {
    pub search: AddressSearchClient,
    pub districts: DistrictClient,
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn search_addresses(
        &self,
        query: &str,
    ) -> Result<Vec<AddressCandidate>, GeocodeError> {
        self.search.search(query).await
    }

    async fn resolve_district(
        &self,
        address: &str,
    ) -> Result<DistrictResolution, GeocodeError> {
        self.districts.resolve(address).await
    }
}
