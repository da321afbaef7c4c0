//! `shopware_rule`.
//!
//! Module types live under `moduleTypes.types` remotely and as a flat `type`
//! list locally. Conditions are kept as `{type, value}` pairs whose `value`
//! is an arbitrary JSON object; the set of condition types is open-ended on
//! the Shopware side, so the provider only checks the value is an object.
//! Conditions are read back through the `conditions` association.
//!
//! Each condition is written with an id derived from the rule id and its
//! content, so rewriting an unchanged set touches the same rows. Rows the
//! new set no longer contains are deleted after the rule is written.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use shopware_core::{id, AdminClient, Criteria, ModuleTypes, Rule, RuleCondition};
use tracing::debug;

use crate::error::ProviderError;
use crate::lifecycle::{null_as_empty, Model, ResourceHandler};
use crate::schema::{Attribute, AttributeType, Block, Schema};

const CONDITIONS_ASSOCIATION: &str = "conditions";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionModel {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: Value,
}

impl ConditionModel {
    fn sort_key(&self) -> (String, String) {
        (self.kind.clone(), self.value.to_string())
    }

    fn remote_id(&self, rule_id: &str) -> String {
        id::stable_id(&format!("{rule_id}:{}:{}", self.kind, self.value))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleModel {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub module_types: Vec<String>,
    pub priority: f64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub conditions: Vec<ConditionModel>,
}

impl Model for RuleModel {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    /// Conditions form a set: order-insensitive, no duplicates. A `null`
    /// value is stored the way the shop returns it, as `{}`.
    fn normalize(&mut self) {
        for condition in &mut self.conditions {
            if condition.value.is_null() {
                condition.value = Value::Object(Map::new());
            }
        }
        self.conditions.sort_by_cached_key(ConditionModel::sort_key);
        self.conditions.dedup();
    }
}

impl TryFrom<&ConditionModel> for RuleCondition {
    type Error = ProviderError;

    fn try_from(condition: &ConditionModel) -> Result<Self, Self::Error> {
        let value = match &condition.value {
            Value::Object(map) => map.clone(),
            Value::Null => Map::new(),
            other => {
                return Err(ProviderError::InvalidCondition(format!(
                    "value of condition `{}` must be an object, got {other}",
                    condition.kind
                )))
            }
        };
        Ok(RuleCondition {
            id: None,
            kind: condition.kind.clone(),
            rule_id: None,
            parent_id: None,
            position: None,
            value: Some(value),
        })
    }
}

impl From<RuleCondition> for ConditionModel {
    fn from(condition: RuleCondition) -> Self {
        ConditionModel {
            kind: condition.kind,
            value: Value::Object(condition.value.unwrap_or_default()),
        }
    }
}

impl TryFrom<&RuleModel> for Rule {
    type Error = ProviderError;

    fn try_from(model: &RuleModel) -> Result<Self, Self::Error> {
        let conditions = model
            .conditions
            .iter()
            .enumerate()
            .map(|(position, condition)| {
                let mut remote = RuleCondition::try_from(condition)?;
                remote.id = Some(condition.remote_id(&model.id));
                remote.position = Some(position as i64);
                Ok::<_, ProviderError>(remote)
            })
            .collect::<Result<Vec<_>, ProviderError>>()?;
        Ok(Rule {
            id: model.id.clone(),
            name: model.name.clone(),
            priority: model.priority,
            module_types: Some(ModuleTypes {
                types: model.module_types.clone(),
            }),
            conditions: Some(conditions),
        })
    }
}

impl From<Rule> for RuleModel {
    fn from(entity: Rule) -> Self {
        let conditions = entity.conditions.unwrap_or_default();
        let mut model = RuleModel {
            id: entity.id,
            name: entity.name,
            module_types: entity.module_types.unwrap_or_default().types,
            priority: entity.priority,
            conditions: conditions.into_iter().map(ConditionModel::from).collect(),
        };
        model.normalize();
        model
    }
}

pub struct RuleResource {
    client: Arc<AdminClient>,
}

impl RuleResource {
    pub fn new(client: Arc<AdminClient>) -> Self {
        Self { client }
    }

    fn fetch(&self, id: &str) -> Result<Option<Rule>, ProviderError> {
        let criteria = Criteria::ids([id]).with_association(CONDITIONS_ASSOCIATION);
        let result = self.client.repository::<Rule>().search(&criteria)?;
        Ok(result.data.into_iter().next())
    }
}

impl ResourceHandler for RuleResource {
    type Model = RuleModel;

    const TYPE_SUFFIX: &'static str = "rule";
    const DISPLAY_NAME: &'static str = "rule";

    fn schema() -> Schema {
        Schema::new("Rule")
            .attribute("id", Attribute::id())
            .attribute("name", Attribute::required(AttributeType::String, "Name"))
            .attribute(
                "type",
                Attribute::required(AttributeType::List(Box::new(AttributeType::String)), "Type"),
            )
            .attribute("priority", Attribute::required(AttributeType::Float64, "Priority"))
            .block(
                "conditions",
                Block::set()
                    .attribute("type", Attribute::required(AttributeType::String, "Type"))
                    .attribute("value", Attribute::required(AttributeType::Dynamic, "Value")),
            )
    }

    fn upsert(&self, model: &RuleModel) -> Result<(), ProviderError> {
        let entity = Rule::try_from(model)?;
        let written: BTreeSet<&str> = entity
            .conditions
            .iter()
            .flatten()
            .filter_map(|condition| condition.id.as_deref())
            .collect();
        let stale: Vec<String> = self
            .fetch(&model.id)?
            .and_then(|current| current.conditions)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|condition| condition.id)
            .filter(|id| !written.contains(id.as_str()))
            .collect();

        self.client.repository::<Rule>().upsert(std::slice::from_ref(&entity))?;
        if !stale.is_empty() {
            debug!(rule = %model.id, count = stale.len(), "deleting stale conditions");
            self.client.repository::<RuleCondition>().delete(&stale)?;
        }
        Ok(())
    }

    fn read(&self, id: &str) -> Result<Option<RuleModel>, ProviderError> {
        Ok(self.fetch(id)?.map(RuleModel::from))
    }

    fn delete(&self, id: &str) -> Result<(), ProviderError> {
        self.client.repository::<Rule>().delete(&[id.to_string()])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn condition(kind: &str, value: Value) -> ConditionModel {
        ConditionModel {
            kind: kind.to_string(),
            value,
        }
    }

    fn model(conditions: Vec<ConditionModel>) -> RuleModel {
        RuleModel {
            id: "r1".to_string(),
            name: "Affiliates".to_string(),
            module_types: vec!["shipping".to_string(), "payment".to_string()],
            priority: 10.0,
            conditions,
        }
    }

    #[test]
    fn module_types_are_nested_on_write() {
        let rule = Rule::try_from(&model(Vec::new())).unwrap();
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["moduleTypes"], json!({"types": ["shipping", "payment"]}));
        assert_eq!(json["conditions"], json!([]));
    }

    #[test]
    fn module_types_are_flattened_on_read() {
        let rule = Rule {
            id: "r1".to_string(),
            name: "n".to_string(),
            priority: 1.0,
            module_types: Some(ModuleTypes {
                types: vec!["shipping".to_string()],
            }),
            conditions: None,
        };
        let back = RuleModel::from(rule);
        assert_eq!(back.module_types, vec!["shipping".to_string()]);
        assert!(back.conditions.is_empty());
    }

    #[test]
    fn missing_module_types_read_as_empty_list() {
        let rule: Rule = serde_json::from_value(json!({"id": "r1", "name": "n", "priority": 0})).unwrap();
        assert!(RuleModel::from(rule).module_types.is_empty());
    }

    #[test]
    fn conditions_survive_write_then_read() {
        let mut local = model(vec![
            condition("customerAffiliateCode", json!({"operator": "=", "affiliateCode": "SPRING"})),
            condition("cartCartAmount", json!({"operator": ">=", "amount": 50})),
        ]);
        local.normalize();

        let remote = Rule::try_from(&local).unwrap();
        let back = RuleModel::from(remote);
        assert_eq!(back, local);
    }

    #[test]
    fn scalar_condition_value_is_rejected() {
        let err = Rule::try_from(&model(vec![condition("alwaysValid", json!("yes"))])).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidCondition(_)));
        assert_eq!(err.summary(), "Client Error");
    }

    #[test]
    fn null_condition_value_is_normalized_to_empty_object() {
        let mut local = model(vec![condition("alwaysValid", Value::Null)]);
        local.normalize();
        assert_eq!(local.conditions[0].value, json!({}));

        let back = RuleModel::from(Rule::try_from(&local).unwrap());
        assert_eq!(back, local);
    }

    #[test]
    fn null_conditions_block_decodes_as_empty() {
        let local: RuleModel = serde_json::from_value(json!({
            "id": null,
            "name": "n",
            "type": ["shipping"],
            "priority": 1,
            "conditions": null,
        }))
        .unwrap();
        assert!(local.conditions.is_empty());
        assert!(local.id.is_empty());
    }

    #[test]
    fn condition_ids_follow_rule_and_content() {
        let local = model(vec![
            condition("a", json!({})),
            condition("b", json!({"x": 1})),
        ]);
        let first = Rule::try_from(&local).unwrap().conditions.unwrap();
        let again = Rule::try_from(&local).unwrap().conditions.unwrap();
        assert_eq!(first, again);
        assert!(first.iter().all(|c| c.id.as_deref().is_some_and(id::is_valid_id)));
        assert_ne!(first[0].id, first[1].id);

        let mut other = local.clone();
        other.id = "r2".to_string();
        let moved = Rule::try_from(&other).unwrap().conditions.unwrap();
        assert_ne!(moved[0].id, first[0].id);
    }

    #[test]
    fn normalize_sorts_and_dedups_conditions() {
        let mut local = model(vec![
            condition("b", json!({"x": 1})),
            condition("a", json!({})),
            condition("b", json!({"x": 1})),
        ]);
        local.normalize();
        let kinds: Vec<&str> = local.conditions.iter().map(|c| c.kind.as_str()).collect();
        assert_eq!(kinds, vec!["a", "b"]);
    }

    #[test]
    fn schema_declares_condition_block() {
        let schema = RuleResource::schema();
        let block = &schema.blocks["conditions"];
        assert_eq!(block.nesting, "set");
        assert_eq!(block.attributes["value"].kind, AttributeType::Dynamic);
    }
}
