//! # Reports API
//!
//! Thin async wrappers around the back-office REST endpoints the collection
//! editor and the column selector depend on.

pub mod client;
pub mod status;

pub use client::ReportsApi;
