//! Grist REST API client.
//!
//! Wraps `reqwest` with the handful of Grist endpoints gristmill needs:
//! organization and workspace listing, table records and columns, the
//! document access list, and the PATCH-delta access mutation.
//!
//! The client performs no retries and holds no state beyond its
//! connection pool; every call is a plain request/response. Callers own
//! retry policy and any caching of listings.

pub mod client;
pub mod error;
pub mod models;

pub use client::GristClient;
pub use error::{GristClientError, GristClientResult};
