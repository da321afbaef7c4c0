//! Provider-level errors.
//!
//! # Design
//! Every variant maps to exactly one diagnostic summary (see
//! `ProviderError::summary`), so lifecycle adapters can turn any failure into
//! a user-visible diagnostic without inspecting it further.

use shopware_core::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// Provider configuration could not be decoded or is incomplete.
    #[error("invalid provider configuration: {0}")]
    InvalidConfig(String),

    /// The token exchange or the post-auth probe failed.
    #[error("{0}")]
    Authentication(#[source] ApiError),

    /// The shared provider data handed to a resource is not an `AdminClient`.
    #[error("Expected shopware_core::AdminClient, got: {got}. Please report this issue to the provider developers.")]
    UnexpectedConfigureType { got: &'static str },

    #[error("unknown resource type `{0}`")]
    UnknownResourceType(String),

    /// A plan or state value does not match the resource model.
    #[error("invalid resource data: {0}")]
    InvalidState(String),

    #[error("invalid import identifier `{0}`: expected 32 hexadecimal characters")]
    InvalidImportId(String),

    /// A rule condition could not be converted to the remote shape.
    #[error("invalid rule condition: {0}")]
    InvalidCondition(String),

    /// A remote search/upsert/delete call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ProviderError {
    /// Short diagnostic summary shown next to the error detail.
    pub fn summary(&self) -> &'static str {
        match self {
            ProviderError::InvalidConfig(_) => "Invalid Provider Configuration",
            ProviderError::Authentication(_) => "Cannot authenticate to Shop",
            ProviderError::UnexpectedConfigureType { .. } => "Unexpected Resource Configure Type",
            ProviderError::UnknownResourceType(_) => "Unknown Resource Type",
            ProviderError::InvalidState(_) => "Invalid Resource Data",
            ProviderError::InvalidImportId(_) => "Invalid Import Identifier",
            ProviderError::InvalidCondition(_) | ProviderError::Api(_) => "Client Error",
        }
    }
}
