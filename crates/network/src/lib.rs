// crates/network/src/lib.rs
//! HTTP access to the remote book collection
//!
//! [`Client`] is a thin reqwest wrapper that decodes JSON and retries
//! idempotent requests. [`HttpBookGateway`] builds the catalog REST calls on
//! top of it and implements [`BookGateway`], the seam the controller depends on.

mod client;
mod error;
mod gateway;
mod wire;

pub use client::{Client, ClientConfig};
pub use error::{NetworkError, NetworkResult};
pub use gateway::{BookGateway, HttpBookGateway};
pub use wire::query_params;
