use std::collections::BTreeMap;

use serde_json::Value;

pub fn is_null_or_none(value: &Option<Value>) -> bool {
    match value {
        None => true,
        Some(v) => v.is_null(),
    }
}

pub fn vec_is_empty<T>(v: &Vec<T>) -> bool {
    v.is_empty()
}

pub fn map_is_empty<K, V>(map: &BTreeMap<K, V>) -> bool {
    map.is_empty()
}
