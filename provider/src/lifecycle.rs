//! The resource lifecycle contract.
//!
//! # Design
//! Handlers implement the typed `ResourceHandler` trait: they only ever see
//! their own local model and return `ProviderError`s. `TypedResource` adapts
//! a handler to the engine-facing, object-safe `Resource` trait: it decodes
//! the JSON plan/state envelopes, enforces the id invariants, and turns
//! errors into diagnostics. State is left untouched whenever an operation
//! fails.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use shopware_core::id;
use tracing::{debug, warn};

use crate::diagnostics::Diagnostics;
use crate::error::ProviderError;
use crate::schema::Schema;

/// A local resource model: the flat, typed mirror of declared config/state.
pub trait Model: Serialize + DeserializeOwned + Send {
    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    /// Bring the model into its canonical form before it is written or
    /// stored, so that Create followed by Read yields an identical state.
    fn normalize(&mut self) {}
}

/// Deserializes a value the engine may send as `null` (an unknown computed
/// id, an absent set block) into its empty default.
pub fn null_as_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Typed CRUD against one remote entity kind.
pub trait ResourceHandler: Send + Sync {
    type Model: Model;

    /// Suffix appended to the provider type name, e.g. `delivery_time`.
    const TYPE_SUFFIX: &'static str;

    /// Human-readable kind used in diagnostic details.
    const DISPLAY_NAME: &'static str;

    fn schema() -> Schema;

    /// Full overwrite of the remote entity with `model`.
    fn upsert(&self, model: &Self::Model) -> Result<(), ProviderError>;

    /// `Ok(None)` when no remote entity carries `id`.
    fn read(&self, id: &str) -> Result<Option<Self::Model>, ProviderError>;

    fn delete(&self, id: &str) -> Result<(), ProviderError>;

    fn create(&self, mut plan: Self::Model) -> Result<Self::Model, ProviderError> {
        plan.set_id(id::new_id());
        plan.normalize();
        self.upsert(&plan)?;
        Ok(plan)
    }

    fn update(&self, mut plan: Self::Model, id: &str) -> Result<Self::Model, ProviderError> {
        plan.set_id(id.to_string());
        plan.normalize();
        self.upsert(&plan)?;
        Ok(plan)
    }
}

pub struct CreateRequest {
    pub plan: Value,
}

pub struct ReadRequest {
    pub state: Value,
}

pub struct UpdateRequest {
    pub plan: Value,
    pub prior_state: Value,
}

pub struct DeleteRequest {
    pub state: Value,
}

pub struct ImportStateRequest {
    pub id: String,
}

/// Outcome of a state-producing operation. `state: None` means the
/// resource is absent (never created, removed, or dropped by Read).
#[derive(Debug, Default)]
pub struct StateResponse {
    pub state: Option<Value>,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Default)]
pub struct DeleteResponse {
    pub diagnostics: Diagnostics,
}

/// Engine-facing lifecycle of a single resource kind.
pub trait Resource: Send + Sync {
    fn create(&self, request: CreateRequest) -> StateResponse;

    fn read(&self, request: ReadRequest) -> StateResponse;

    fn update(&self, request: UpdateRequest) -> StateResponse;

    fn delete(&self, request: DeleteRequest) -> DeleteResponse;

    fn import_state(&self, request: ImportStateRequest) -> StateResponse;
}

pub struct TypedResource<H> {
    handler: H,
}

impl<H: ResourceHandler> TypedResource<H> {
    pub fn new(handler: H) -> Self {
        Self { handler }
    }

    fn fail(&self, op: &str, err: &ProviderError, state: Option<Value>) -> StateResponse {
        let mut diagnostics = Diagnostics::new();
        diagnostics.add_provider_error(err, self.detail(op, err));
        StateResponse { state, diagnostics }
    }

    fn detail(&self, op: &str, err: &ProviderError) -> String {
        format!("Unable to {op} {}, got error: {err}", H::DISPLAY_NAME)
    }
}

fn decode<M: DeserializeOwned>(value: Value) -> Result<M, ProviderError> {
    serde_json::from_value(value).map_err(|e| ProviderError::InvalidState(e.to_string()))
}

fn encode<M: Serialize>(model: &M) -> Result<Value, ProviderError> {
    serde_json::to_value(model).map_err(|e| ProviderError::InvalidState(e.to_string()))
}

fn state_id(state: &Value) -> Result<String, ProviderError> {
    match state.get("id").and_then(Value::as_str) {
        Some(id) if !id.is_empty() => Ok(id.to_string()),
        _ => Err(ProviderError::InvalidState("state has no id".to_string())),
    }
}

impl<H: ResourceHandler> Resource for TypedResource<H> {
    fn create(&self, request: CreateRequest) -> StateResponse {
        let result = decode::<H::Model>(request.plan)
            .and_then(|plan| self.handler.create(plan))
            .and_then(|model| {
                debug!(kind = H::TYPE_SUFFIX, id = model.id(), "created");
                encode(&model)
            });
        match result {
            Ok(state) => StateResponse {
                state: Some(state),
                diagnostics: Diagnostics::new(),
            },
            Err(err) => self.fail("create", &err, None),
        }
    }

    fn read(&self, request: ReadRequest) -> StateResponse {
        let result = state_id(&request.state).and_then(|id| {
            let found = self.handler.read(&id)?;
            Ok((id, found))
        });
        match result {
            Ok((_, Some(model))) => match encode(&model) {
                Ok(state) => StateResponse {
                    state: Some(state),
                    diagnostics: Diagnostics::new(),
                },
                Err(err) => self.fail("read", &err, Some(request.state)),
            },
            Ok((id, None)) => {
                warn!(kind = H::TYPE_SUFFIX, %id, "remote entity is gone, removing from state");
                let mut diagnostics = Diagnostics::new();
                diagnostics.add_warning(
                    "Resource Removed",
                    format!("{} {id} no longer exists and was removed from state", H::DISPLAY_NAME),
                );
                StateResponse {
                    state: None,
                    diagnostics,
                }
            }
            Err(err) => self.fail("read", &err, Some(request.state)),
        }
    }

    fn update(&self, request: UpdateRequest) -> StateResponse {
        let result = state_id(&request.prior_state).and_then(|id| {
            let plan = decode::<H::Model>(request.plan)?;
            let model = self.handler.update(plan, &id)?;
            debug!(kind = H::TYPE_SUFFIX, %id, "updated");
            encode(&model)
        });
        match result {
            Ok(state) => StateResponse {
                state: Some(state),
                diagnostics: Diagnostics::new(),
            },
            Err(err) => self.fail("update", &err, Some(request.prior_state)),
        }
    }

    fn delete(&self, request: DeleteRequest) -> DeleteResponse {
        let mut diagnostics = Diagnostics::new();
        let result = state_id(&request.state).and_then(|id| {
            self.handler.delete(&id)?;
            debug!(kind = H::TYPE_SUFFIX, %id, "deleted");
            Ok(())
        });
        if let Err(err) = result {
            diagnostics.add_provider_error(&err, self.detail("delete", &err));
        }
        DeleteResponse { diagnostics }
    }

    /// Seeds state with the id alone; the engine follows up with Read.
    /// Ids are stored lowercased, the form the shop returns them in.
    fn import_state(&self, request: ImportStateRequest) -> StateResponse {
        let imported = request.id.trim().to_ascii_lowercase();
        if !id::is_valid_id(&imported) {
            let err = ProviderError::InvalidImportId(request.id.clone());
            return self.fail("import", &err, None);
        }
        StateResponse {
            state: Some(serde_json::json!({ "id": imported })),
            diagnostics: Diagnostics::new(),
        }
    }
}
