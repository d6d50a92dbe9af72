//! Coupang Partners product search adapter.
//!
//! Implements the [`pipeline::ProductSearch`] trait over the affiliate open API.
//! Every call is signed with a fresh [`pipeline::RequestSigner`] token, sent
//! with a 10-second timeout, and its `data.productData[]` payload normalised
//! into [`pipeline::Product`] values.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Query encoding, HTTP transport, status handling and the
//! upstream JSON schema all live here. The [`pipeline`] crate sees only
//! [`pipeline::ProductSearch`].

mod client;
mod schema;

pub use client::{CoupangClient, CoupangConfig, DEFAULT_BASE_URL, SEARCH_PATH};
