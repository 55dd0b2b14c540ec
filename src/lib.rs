//! KYC document upload and verification-status service.
//!
//! The HTTP surface lives in [`features::documents`]; the client-side upload
//! widget that drives it lives in [`features::documents::client`].

pub mod core;
pub mod features;
pub mod modules;
pub mod shared;
