//! Resource handlers, one per remote entity kind.

pub mod delivery_time;
pub mod rule;
pub mod shipping_method;

pub use delivery_time::{DeliveryTimeModel, DeliveryTimeResource};
pub use rule::{ConditionModel, RuleModel, RuleResource};
pub use shipping_method::{ShippingMethodModel, ShippingMethodResource};
