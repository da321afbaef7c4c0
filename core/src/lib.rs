//! Synchronous client core for the Shopware Admin API.
//!
//! # Overview
//! `AdminApi` builds `HttpRequest` values and parses `HttpResponse` values
//! without touching the network (host-does-IO pattern). A `Transport`
//! executes the round-trip; `UreqTransport` is the blocking default.
//! `AdminClient` ties the two together with a bearer token and hands out
//! typed `Repository` views per entity kind.
//!
//! # Design
//! - `AdminApi` is stateless; it holds only `base_url`.
//! - Each operation is split into `build_*` and `parse_*` so the I/O
//!   boundary is explicit and unit-testable.
//! - Entity DTOs mirror the Admin API JSON, including nested shapes.
//! - No retries, caching or token refresh: a failed call is returned as-is.

pub mod admin_client;
pub mod client;
pub mod error;
pub mod http;
pub mod id;
pub mod transport;
pub mod types;

pub use admin_client::{AdminClient, Repository};
pub use client::AdminApi;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use transport::UreqTransport;
pub use types::{
    AccessToken, Credentials, Criteria, DeliveryTime, Entity, ModuleTypes, Rule, RuleCondition,
    SearchResult, ShippingMethod, ShopInfo,
};
