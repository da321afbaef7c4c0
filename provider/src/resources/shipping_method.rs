//! `shopware_shipping_method`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shopware_core::{AdminClient, Criteria, ShippingMethod};

use crate::error::ProviderError;
use crate::lifecycle::{null_as_empty, Model, ResourceHandler};
use crate::schema::{Attribute, AttributeType, Schema};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingMethodModel {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub id: String,
    pub technical_name: String,
    pub name: String,
    /// Optional in config; an unset flag is written and stored as `false`.
    #[serde(default)]
    pub active: Option<bool>,
    pub delivery_time_id: String,
    pub availability_rule_id: String,
}

impl Model for ShippingMethodModel {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn normalize(&mut self) {
        self.active = Some(self.active.unwrap_or(false));
    }
}

impl From<&ShippingMethodModel> for ShippingMethod {
    fn from(model: &ShippingMethodModel) -> Self {
        ShippingMethod {
            id: model.id.clone(),
            technical_name: model.technical_name.clone(),
            name: model.name.clone(),
            active: model.active.unwrap_or(false),
            delivery_time_id: Some(model.delivery_time_id.clone()),
            availability_rule_id: Some(model.availability_rule_id.clone()),
        }
    }
}

impl From<ShippingMethod> for ShippingMethodModel {
    fn from(entity: ShippingMethod) -> Self {
        ShippingMethodModel {
            id: entity.id,
            technical_name: entity.technical_name,
            name: entity.name,
            active: Some(entity.active),
            delivery_time_id: entity.delivery_time_id.unwrap_or_default(),
            availability_rule_id: entity.availability_rule_id.unwrap_or_default(),
        }
    }
}

pub struct ShippingMethodResource {
    client: Arc<AdminClient>,
}

impl ShippingMethodResource {
    pub fn new(client: Arc<AdminClient>) -> Self {
        Self { client }
    }
}

impl ResourceHandler for ShippingMethodResource {
    type Model = ShippingMethodModel;

    const TYPE_SUFFIX: &'static str = "shipping_method";
    const DISPLAY_NAME: &'static str = "shipping method";

    fn schema() -> Schema {
        Schema::new("Shipping Method")
            .attribute("id", Attribute::id())
            .attribute("active", Attribute::optional_computed(AttributeType::Bool, "Active flag"))
            .attribute("technical_name", Attribute::required(AttributeType::String, "Technical name"))
            .attribute("name", Attribute::required(AttributeType::String, "Name"))
            .attribute(
                "delivery_time_id",
                Attribute::required(AttributeType::String, "Delivery Time ID"),
            )
            .attribute(
                "availability_rule_id",
                Attribute::required(AttributeType::String, "Availability Rule ID"),
            )
    }

    fn upsert(&self, model: &ShippingMethodModel) -> Result<(), ProviderError> {
        self.client
            .repository::<ShippingMethod>()
            .upsert(&[ShippingMethod::from(model)])?;
        Ok(())
    }

    fn read(&self, id: &str) -> Result<Option<ShippingMethodModel>, ProviderError> {
        let result = self
            .client
            .repository::<ShippingMethod>()
            .search(&Criteria::ids([id]))?;
        Ok(result.data.into_iter().next().map(ShippingMethodModel::from))
    }

    fn delete(&self, id: &str) -> Result<(), ProviderError> {
        self.client
            .repository::<ShippingMethod>()
            .delete(&[id.to_string()])?;
        Ok(())
    }
}
