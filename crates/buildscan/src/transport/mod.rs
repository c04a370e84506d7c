//! Remote operations against the scan service.
//!
//! [`ScanApi`] is the seam the lifecycle controller talks through;
//! [`HttpScanClient`] is the production implementation over reqwest.

pub mod client;
pub mod endpoints;
pub mod error;

pub use client::{HttpScanClient, ScanApi};
pub use endpoints::Endpoints;
pub use error::TransportError;
