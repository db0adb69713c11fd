//! Client code for the finboard API.
//!
//! This crate provides the shared HTTP client, typed fetch functions for each
//! backend resource, and a query cache for slow-changing reference data.

pub mod api;
pub mod error;
pub mod http;
pub mod query;
pub mod resources;

pub use api::{ListFilter, Paginated};
pub use error::{ApiError, ErrorKind, ResourceError};
pub use http::{ApiClient, ApiConfig};
pub use query::{QueryCache, QueryKey, QueryPolicy, QueryState, RefetchEvent, ResourceSpec};
pub use resources::ReferenceData;
