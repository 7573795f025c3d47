//! On-disk row codec.
//!
//! Columns, in order: Timestamp, Name, Email, District, Rep. Timestamps
//! are RFC 3339 strings so the file stays readable in any spreadsheet
//! tool.

use pledge_store::StoreError;
use pledge_types::{DistrictCode, Email, Representative, Signature, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Row {
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "District")]
    pub district: String,
    #[serde(rename = "Rep")]
    pub representative: String,
}

impl From<&Signature> for Row {
    fn from(sig: &Signature) -> Self {
        Self {
            timestamp: sig.timestamp.to_rfc3339(),
            name: sig.name.clone(),
            email: sig.email.as_str().to_string(),
            district: sig.district.as_str().to_string(),
            representative: sig.representative.as_str().to_string(),
        }
    }
}

impl Row {
    /// Decode into the domain record. District codes are validated; a
    /// malformed district marks the file corrupt rather than yielding a
    /// half-parsed signature. Unparseable timestamps degrade to the epoch
    /// (the timestamp is informational, never a key).
    pub fn into_signature(self) -> Result<Signature, StoreError> {
        let district = DistrictCode::parse(&self.district)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(Signature {
            timestamp: Timestamp::from_rfc3339(&self.timestamp).unwrap_or(Timestamp::EPOCH),
            name: self.name,
            email: Email::normalize(&self.email),
            district,
            representative: Representative::new(self.representative),
        })
    }
}
