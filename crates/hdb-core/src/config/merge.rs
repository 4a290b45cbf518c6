//! Structural merge of JSON configuration updates
//!
//! Objects merge key by key, recursively. Anything else in `updates`
//! (arrays, strings, numbers, booleans, null) replaces the target value
//! wholesale; arrays are never concatenated. Callers that want a union of
//! two arrays compute it before merging.

use serde_json::Value;

/// Merge `updates` into `target` in place
pub fn deep_merge(target: &mut Value, updates: Value) {
    match (target, updates) {
        (Value::Object(target), Value::Object(updates)) => {
            for (key, value) in updates {
                match target.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Owned variant of [`deep_merge`]
pub fn merged(mut base: Value, updates: Value) -> Value {
    deep_merge(&mut base, updates);
    base
}
