//! Congressional district resolution client.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{classify, GeocodeError};
use pledge_types::{DistrictCode, Representative};

/// Default district resolution endpoint.
const DEFAULT_DISTRICT_URL: &str = "https://api.geocod.io/v1.7/geocode";

/// Default timeout for resolution requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Field set requested from the service; everything needed hangs off the
/// congressional-districts field.
const REQUESTED_FIELDS: &str = "cd";

/// A resolved district: code plus the sitting representative (or the
/// vacant sentinel).
#[derive(Clone, Debug, PartialEq)]
pub struct DistrictResolution {
    pub district: DistrictCode,
    pub representative: Representative,
}

// ── Wire payloads ────────────────────────────────────────────────────────
//
// Shape: results[0].fields.congressional_districts[0] carries the district
// number and legislator roster; the state abbreviation lives in the
// result's address_components.

#[derive(Debug, Deserialize)]
struct GeocodePayload {
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    #[serde(default)]
    fields: GeocodeFields,
    #[serde(default)]
    address_components: AddressComponents,
}

#[derive(Debug, Default, Deserialize)]
struct GeocodeFields {
    #[serde(default)]
    congressional_districts: Vec<CongressionalDistrict>,
}

#[derive(Debug, Default, Deserialize)]
struct AddressComponents {
    state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CongressionalDistrict {
    district_number: u32,
    #[serde(default)]
    current_legislators: Vec<Legislator>,
}

#[derive(Debug, Deserialize)]
struct Legislator {
    #[serde(rename = "type")]
    kind: String,
    bio: Option<LegislatorBio>,
}

#[derive(Debug, Deserialize)]
struct LegislatorBio {
    first_name: String,
    last_name: String,
}

/// Walk the payload down to a resolution, or `None` when any required
/// field is absent. A missing representative is not a failure — the seat
/// is reported vacant.
fn parse_resolution(payload: GeocodePayload) -> Option<DistrictResolution> {
    let result = payload.results.into_iter().next()?;
    let state = result.address_components.state?;
    let cd = result.fields.congressional_districts.into_iter().next()?;

    let representative = cd
        .current_legislators
        .iter()
        .find(|leg| leg.kind == "representative")
        .and_then(|leg| leg.bio.as_ref())
        .map(|bio| Representative::new(format!("{} {}", bio.first_name, bio.last_name)))
        .unwrap_or_else(Representative::vacant);

    Some(DistrictResolution {
        district: DistrictCode::new(&state, cd.district_number),
        representative,
    })
}

/// Client for the keyed district resolution service.
pub struct DistrictClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl DistrictClient {
    /// Create a client against the default endpoint.
    pub fn new(api_key: &str) -> Self {
        Self::with_base_url(DEFAULT_DISTRICT_URL, api_key)
    }

    /// Create a client against a custom endpoint.
    pub fn with_base_url(base_url: &str, api_key: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        }
    }

    /// Resolve a confirmed address to its district and representative.
    ///
    /// Idempotent and side-effect-free; safe to retry. An empty address
    /// is `NotFound` without a request; so is any response missing the
    /// congressional-district field — a partial district code is never
    /// produced.
    pub async fn resolve(&self, address: &str) -> Result<DistrictResolution, GeocodeError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(GeocodeError::NotFound);
        }

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", address),
                ("fields", REQUESTED_FIELDS),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(classify)?;

        if !response.status().is_success() {
            return Err(GeocodeError::RequestFailed(format!(
                "HTTP status {}",
                response.status()
            )));
        }

        let payload: GeocodePayload = response
            .json()
            .await
            .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;

        parse_resolution(payload).ok_or(GeocodeError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Option<DistrictResolution> {
        parse_resolution(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn full_payload_resolves_district_and_representative() {
        let resolution = parse(
            r#"{
            "results": [{
                "address_components": {"state": "IL", "city": "Springfield"},
                "fields": {
                    "congressional_districts": [{
                        "district_number": 13,
                        "current_legislators": [
                            {"type": "senator", "bio": {"first_name": "Pat", "last_name": "Smith"}},
                            {"type": "representative", "bio": {"first_name": "Jane", "last_name": "Doe"}}
                        ]
                    }]
                }
            }]
        }"#,
        )
        .expect("should resolve");
        assert_eq!(resolution.district.as_str(), "IL-13");
        assert_eq!(resolution.representative.as_str(), "Jane Doe");
    }

    #[test]
    fn missing_congressional_districts_field_is_not_found() {
        let resolution = parse(
            r#"{
            "results": [{
                "address_components": {"state": "IL"},
                "fields": {}
            }]
        }"#,
        );
        assert!(resolution.is_none());
    }

    #[test]
    fn empty_results_is_not_found() {
        assert!(parse(r#"{"results": []}"#).is_none());
        assert!(parse("{}").is_none());
    }

    #[test]
    fn seat_without_a_representative_reports_vacant() {
        let resolution = parse(
            r#"{
            "results": [{
                "address_components": {"state": "NY"},
                "fields": {
                    "congressional_districts": [{
                        "district_number": 14,
                        "current_legislators": [
                            {"type": "senator", "bio": {"first_name": "Pat", "last_name": "Smith"}}
                        ]
                    }]
                }
            }]
        }"#,
        )
        .expect("district still resolves");
        assert_eq!(resolution.district.as_str(), "NY-14");
        assert!(resolution.representative.is_vacant());
    }

    #[tokio::test]
    async fn empty_address_is_not_found_without_a_request() {
        let client = DistrictClient::with_base_url("http://127.0.0.1:1", "test-key");
        assert!(matches!(
            client.resolve("").await,
            Err(GeocodeError::NotFound)
        ));
    }

    #[tokio::test]
    async fn transport_failure_is_distinguishable_from_not_found() {
        let client = DistrictClient::with_base_url("http://127.0.0.1:1", "test-key");
        let err = client.resolve("123 Main St").await.unwrap_err();
        assert!(matches!(
            err,
            GeocodeError::Unreachable(_) | GeocodeError::RequestFailed(_)
        ));
    }
}
