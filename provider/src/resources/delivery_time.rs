//! `shopware_delivery_time`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shopware_core::{AdminClient, Criteria, DeliveryTime};

use crate::error::ProviderError;
use crate::lifecycle::{null_as_empty, Model, ResourceHandler};
use crate::schema::{Attribute, AttributeType, Schema};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryTimeModel {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub id: String,
    pub name: String,
    pub unit: String,
    pub minimum: f64,
    pub maximum: f64,
}

impl Model for DeliveryTimeModel {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl From<&DeliveryTimeModel> for DeliveryTime {
    fn from(model: &DeliveryTimeModel) -> Self {
        DeliveryTime {
            id: model.id.clone(),
            name: model.name.clone(),
            unit: model.unit.clone(),
            min: model.minimum,
            max: model.maximum,
        }
    }
}

impl From<DeliveryTime> for DeliveryTimeModel {
    fn from(entity: DeliveryTime) -> Self {
        DeliveryTimeModel {
            id: entity.id,
            name: entity.name,
            unit: entity.unit,
            minimum: entity.min,
            maximum: entity.max,
        }
    }
}

pub struct DeliveryTimeResource {
    client: Arc<AdminClient>,
}

impl DeliveryTimeResource {
    pub fn new(client: Arc<AdminClient>) -> Self {
        Self { client }
    }
}

impl ResourceHandler for DeliveryTimeResource {
    type Model = DeliveryTimeModel;

    const TYPE_SUFFIX: &'static str = "delivery_time";
    const DISPLAY_NAME: &'static str = "delivery time";

    fn schema() -> Schema {
        Schema::new("Delivery Time")
            .attribute("id", Attribute::id())
            .attribute("name", Attribute::required(AttributeType::String, "Name"))
            .attribute("unit", Attribute::required(AttributeType::String, "Unit of delivery time"))
            .attribute("minimum", Attribute::required(AttributeType::Float64, "Minimum"))
            .attribute("maximum", Attribute::required(AttributeType::Float64, "Maximum"))
    }

    fn upsert(&self, model: &DeliveryTimeModel) -> Result<(), ProviderError> {
        self.client
            .repository::<DeliveryTime>()
            .upsert(&[DeliveryTime::from(model)])?;
        Ok(())
    }

    fn read(&self, id: &str) -> Result<Option<DeliveryTimeModel>, ProviderError> {
        let result = self
            .client
            .repository::<DeliveryTime>()
            .search(&Criteria::ids([id]))?;
        Ok(result.data.into_iter().next().map(DeliveryTimeModel::from))
    }

    fn delete(&self, id: &str) -> Result<(), ProviderError> {
        self.client
            .repository::<DeliveryTime>()
            .delete(&[id.to_string()])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_maps_to_remote_field_names() {
        let model = DeliveryTimeModel {
            id: "d1".to_string(),
            name: "Standard".to_string(),
            unit: "day".to_string(),
            minimum: 2.0,
            maximum: 5.0,
        };
        let json = serde_json::to_value(DeliveryTime::from(&model)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "d1", "name": "Standard", "unit": "day", "min": 2.0, "max": 5.0})
        );
    }

    #[test]
    fn plan_without_id_decodes() {
        let model: DeliveryTimeModel = serde_json::from_value(serde_json::json!({
            "name": "Express", "unit": "hour", "minimum": 1, "maximum": 4
        }))
        .unwrap();
        assert!(model.id.is_empty());
        assert_eq!(model.maximum, 4.0);
    }

    #[test]
    fn unknown_id_in_plan_decodes_as_empty() {
        let model: DeliveryTimeModel = serde_json::from_value(serde_json::json!({
            "id": null, "name": "Express", "unit": "hour", "minimum": 1, "maximum": 4
        }))
        .unwrap();
        assert!(model.id.is_empty());
    }
}
