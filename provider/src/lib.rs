//! Shopware provider: declarative resources mapped onto the Admin API.
//!
//! # Overview
//! The engine drives a run in three steps:
//! 1. `ShopwareProvider::configure` authenticates once and returns the
//!    shared `AdminClient` wrapped in opaque `ProviderData`.
//! 2. `Registry::configure` builds one handler per `ResourceKind`, each
//!    holding the same client.
//! 3. Lifecycle calls (`create`, `read`, `update`, `delete`,
//!    `import_state`) are dispatched to the handler registered under the
//!    resource's type name.
//!
//! # Design
//! - Handlers never call each other; they only call the shared client.
//! - Update is a full upsert of every mapped field, never a partial patch.
//! - A Read that finds nothing removes the resource from state.
//! - No retries or timeouts: a failed remote call becomes an error
//!   diagnostic and the state is left as it was.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod lifecycle;
pub mod provider;
pub mod registry;
pub mod resources;
pub mod schema;

pub use config::ProviderConfig;
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::ProviderError;
pub use lifecycle::{
    CreateRequest, DeleteRequest, DeleteResponse, ImportStateRequest, ReadRequest, Resource,
    ResourceHandler, StateResponse, TypedResource, UpdateRequest,
};
pub use provider::{ConfigureRequest, ConfigureResponse, ProviderData, ProviderMetadata, ShopwareProvider};
pub use registry::{Registry, ResourceKind};
pub use schema::Schema;
