//! Nullable geocoder — scripted searches and resolutions.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use pledge_geocode::{AddressCandidate, DistrictResolution, GeocodeError, Geocoder};
use pledge_types::{DistrictCode, Representative};

/// A geocoder that answers from scripted tables instead of the network.
///
/// Unscripted searches return no candidates; unscripted resolutions return
/// `NotFound`. Either call can be made to fail with a transport error.
#[derive(Default)]
pub struct NullGeocoder {
    searches: Mutex<HashMap<String, Vec<AddressCandidate>>>,
    resolutions: Mutex<HashMap<String, DistrictResolution>>,
    fail_searches: AtomicBool,
    fail_resolutions: AtomicBool,
}

impl NullGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script candidates for a query.
    pub fn on_search(&self, query: &str, display_names: &[&str]) {
        let candidates = display_names
            .iter()
            .map(|name| AddressCandidate {
                display_name: name.to_string(),
            })
            .collect();
        self.searches
            .lock()
            .unwrap()
            .insert(query.to_string(), candidates);
    }

    /// Script a resolution for a confirmed address.
    pub fn on_resolve(&self, address: &str, district: DistrictCode, representative: Representative) {
        self.resolutions.lock().unwrap().insert(
            address.to_string(),
            DistrictResolution {
                district,
                representative,
            },
        );
    }

    /// Make every search fail with a transport error.
    pub fn fail_searches(&self, fail: bool) {
        self.fail_searches.store(fail, Ordering::SeqCst);
    }

    /// Make every resolution fail with a transport error.
    pub fn fail_resolutions(&self, fail: bool) {
        self.fail_resolutions.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Geocoder for NullGeocoder {
    async fn search_addresses(
        &self,
        query: &str,
    ) -> Result<Vec<AddressCandidate>, GeocodeError> {
        if self.fail_searches.load(Ordering::SeqCst) {
            return Err(GeocodeError::Unreachable("scripted outage".into()));
        }
        Ok(self
            .searches
            .lock()
            .unwrap()
            .get(query.trim())
            .cloned()
            .unwrap_or_default())
    }

    async fn resolve_district(
        &self,
        address: &str,
    ) -> Result<DistrictResolution, GeocodeError> {
        if self.fail_resolutions.load(Ordering::SeqCst) {
            return Err(GeocodeError::Unreachable("scripted outage".into()));
        }
        self.resolutions
            .lock()
            .unwrap()
            .get(address)
            .cloned()
            .ok_or(GeocodeError::NotFound)
    }
}
