//! Wire payloads for the sheet service.

use pledge_store::StoreError;
use pledge_types::{DistrictCode, Email, Representative, Signature, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct RowPayload {
    pub timestamp: String,
    pub name: String,
    pub email: String,
    pub district: String,
    pub representative: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TablePayload {
    #[serde(default)]
    pub rows: Vec<RowPayload>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TableUpdate {
    pub rows: Vec<RowPayload>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CountPayload {
    pub count: u64,
}

impl From<&Signature> for RowPayload {
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

impl RowPayload {
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
