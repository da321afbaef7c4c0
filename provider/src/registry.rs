//! The fixed set of resource kinds and the per-run handler registry.

use std::collections::BTreeMap;
use std::sync::Arc;

use shopware_core::AdminClient;

use crate::error::ProviderError;
use crate::lifecycle::{Resource, ResourceHandler, TypedResource};
use crate::provider::ProviderData;
use crate::resources::{DeliveryTimeResource, RuleResource, ShippingMethodResource};
use crate::schema::Schema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    DeliveryTime,
    ShippingMethod,
    Rule,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::DeliveryTime,
        ResourceKind::ShippingMethod,
        ResourceKind::Rule,
    ];

    pub fn type_suffix(self) -> &'static str {
        match self {
            ResourceKind::DeliveryTime => DeliveryTimeResource::TYPE_SUFFIX,
            ResourceKind::ShippingMethod => ShippingMethodResource::TYPE_SUFFIX,
            ResourceKind::Rule => RuleResource::TYPE_SUFFIX,
        }
    }

    pub fn type_name(self, provider_type_name: &str) -> String {
        format!("{provider_type_name}_{}", self.type_suffix())
    }

    pub fn schema(self) -> Schema {
        match self {
            ResourceKind::DeliveryTime => DeliveryTimeResource::schema(),
            ResourceKind::ShippingMethod => ShippingMethodResource::schema(),
            ResourceKind::Rule => RuleResource::schema(),
        }
    }

    pub fn instantiate(self, client: Arc<AdminClient>) -> Box<dyn Resource> {
        match self {
            ResourceKind::DeliveryTime => Box::new(TypedResource::new(DeliveryTimeResource::new(client))),
            ResourceKind::ShippingMethod => {
                Box::new(TypedResource::new(ShippingMethodResource::new(client)))
            }
            ResourceKind::Rule => Box::new(TypedResource::new(RuleResource::new(client))),
        }
    }

    /// Build the handler from the opaque data the provider's configure step
    /// produced. Fails if that data is not an `AdminClient`.
    pub fn configure(self, provider_data: &ProviderData) -> Result<Box<dyn Resource>, ProviderError> {
        Ok(self.instantiate(provider_data.client()?))
    }
}

/// Handlers for one run, looked up by full type name.
pub struct Registry {
    resources: BTreeMap<String, Box<dyn Resource>>,
}

impl Registry {
    pub fn new(provider_type_name: &str, client: Arc<AdminClient>) -> Self {
        let resources = ResourceKind::ALL
            .iter()
            .map(|kind| (kind.type_name(provider_type_name), kind.instantiate(client.clone())))
            .collect();
        Self { resources }
    }

    /// Run every kind's configure step against the provider data.
    pub fn configure(provider_type_name: &str, provider_data: &ProviderData) -> Result<Self, ProviderError> {
        let resources = ResourceKind::ALL
            .iter()
            .map(|kind| {
                let resource = kind.configure(provider_data)?;
                Ok::<_, ProviderError>((kind.type_name(provider_type_name), resource))
            })
            .collect::<Result<_, ProviderError>>()?;
        Ok(Self { resources })
    }

    pub fn get(&self, type_name: &str) -> Result<&dyn Resource, ProviderError> {
        self.resources
            .get(type_name)
            .map(|resource| resource.as_ref())
            .ok_or_else(|| ProviderError::UnknownResourceType(type_name.to_string()))
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }
}
