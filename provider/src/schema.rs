//! Schema descriptions for the provider and its resources.
//!
//! Pure data: the engine uses it to validate configuration and to know which
//! fields it may leave unknown during planning.

use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "element")]
pub enum AttributeType {
    String,
    Bool,
    Float64,
    List(Box<AttributeType>),
    /// Arbitrary JSON object, validated by the resource itself.
    Dynamic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    Required,
    Optional,
    Computed,
    OptionalComputed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    #[serde(rename = "type")]
    pub kind: AttributeType,
    pub presence: Presence,
    pub description: &'static str,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub sensitive: bool,
    /// Keep the prior state's value while planning, e.g. for ids.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub use_state_for_unknown: bool,
}

impl Attribute {
    fn new(kind: AttributeType, presence: Presence, description: &'static str) -> Self {
        Self {
            kind,
            presence,
            description,
            sensitive: false,
            use_state_for_unknown: false,
        }
    }

    pub fn required(kind: AttributeType, description: &'static str) -> Self {
        Self::new(kind, Presence::Required, description)
    }

    pub fn optional(kind: AttributeType, description: &'static str) -> Self {
        Self::new(kind, Presence::Optional, description)
    }

    pub fn optional_computed(kind: AttributeType, description: &'static str) -> Self {
        Self::new(kind, Presence::OptionalComputed, description)
    }

    /// The `id` attribute every resource carries.
    pub fn id() -> Self {
        Self {
            use_state_for_unknown: true,
            ..Self::new(AttributeType::String, Presence::Computed, "Identifier")
        }
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }
}

/// A repeated nested block. Only set nesting is needed so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub nesting: &'static str,
    pub attributes: BTreeMap<&'static str, Attribute>,
}

impl Block {
    pub fn set() -> Self {
        Self {
            nesting: "set",
            attributes: BTreeMap::new(),
        }
    }

    pub fn attribute(mut self, name: &'static str, attribute: Attribute) -> Self {
        self.attributes.insert(name, attribute);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    pub description: &'static str,
    pub attributes: BTreeMap<&'static str, Attribute>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub blocks: BTreeMap<&'static str, Block>,
}

impl Schema {
    pub fn new(description: &'static str) -> Self {
        Self {
            description,
            attributes: BTreeMap::new(),
            blocks: BTreeMap::new(),
        }
    }

    pub fn attribute(mut self, name: &'static str, attribute: Attribute) -> Self {
        self.attributes.insert(name, attribute);
        self
    }

    pub fn block(mut self, name: &'static str, block: Block) -> Self {
        self.blocks.insert(name, block);
        self
    }
}
