//! Remote worksheet backend for the signature store.
//!
//! Speaks JSON over HTTP to a sheet service that exposes whole-table read
//! and whole-table overwrite per named worksheet:
//!
//! - `GET  {base}/worksheets/{name}/rows`  -> `{"rows": [...]}`
//! - `PUT  {base}/worksheets/{name}/rows`  <- `{"rows": [...]}`
//! - `GET  {base}/worksheets/{name}/count` -> `{"count": n}`
//!
//! The count endpoint is served from the sheet's metadata and can lag or
//! disagree with a full read; the ledger's monotonicity guard exists for
//! exactly that disagreement.

mod payload;
mod store;

pub use store::SheetsStore;
