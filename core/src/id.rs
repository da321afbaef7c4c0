//! Identifier generation for new entities.

use uuid::Uuid;

/// A fresh v4 UUID in Shopware's dash-less hex form.
pub fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// A name-based (v5) id: the same `seed` always yields the same id.
pub fn stable_id(seed: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, seed.as_bytes())
        .simple()
        .to_string()
}

/// Whether `id` is a primary key in the canonical form Shopware returns:
/// 32 lowercase hex chars.
pub fn is_valid_id(id: &str) -> bool {
    id.len() == 32 && id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
