//! FieldResolver — extracts one field's value from a raw item.
//!
//! [`resolve`] is the single entry point. Plain names and candidate lists are
//! advisory: a miss yields `Ok(None)`. Transforms are mandatory: a miss or a
//! value that will not convert yields a [`ResolutionError`].
//!
//! Key matching is case-insensitive and ignores `_`, `-` and spaces, so
//! `OperatingSystem`, `operating_system` and `Operating-System` all name the
//! same field. Both sides are folded with [`fold_key`] and the first match in
//! the item's own key order wins.

use serde_json::Value;

use crate::descriptor::{FieldDescriptor, Transform};
use crate::error::ResolutionError;
use crate::types::RawItem;

/// Keys tried, in order, by [`Transform::RamStringFirstToken`].
pub const RAM_CANDIDATES: &[&str] = &["RAM", "memory", "mem", "ram", "Memory", "memory_gb"];

const KIB_PER_GIB: f64 = 1024.0;

/// Resolve `descriptor` against `item`.
pub fn resolve(item: &RawItem, descriptor: &FieldDescriptor) -> Result<Option<Value>, ResolutionError> {
    match descriptor {
        FieldDescriptor::Absent => Ok(None),
        FieldDescriptor::DirectName(name) => Ok(lookup(item, name).cloned()),
        FieldDescriptor::CandidateList(names) => Ok(lookup_any(item, names).cloned()),
        FieldDescriptor::Transform(transform) => apply(item, transform).map(Some),
    }
}

/// Case-insensitive key lookup.
pub fn lookup<'a>(item: &'a RawItem, name: &str) -> Option<&'a Value> {
    let target = fold_key(name);
    item.iter()
        .find(|(key, _)| fold_key(key) == target)
        .map(|(_, value)| value)
}

/// Lowercase `key` and drop word separators.
pub fn fold_key(key: &str) -> String {
    key.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Case-insensitive lookup of each name in order; the first name with a
/// matching key wins, regardless of where that key sits in the item.
pub fn lookup_any<'a, S: AsRef<str>>(item: &'a RawItem, names: &[S]) -> Option<&'a Value> {
    names.iter().find_map(|name| lookup(item, name.as_ref()))
}

/// Coerce a JSON number or numeric string to a finite `f64`.
///
/// Booleans are not numbers here, even though some upstream tools emit them
/// where a count is expected.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => parse_number(s.trim()),
        _ => None,
    }
}

fn parse_number(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|f| f.is_finite())
}

// ---------------------------------------------------------------------------
// Transforms
// ---------------------------------------------------------------------------

fn apply(item: &RawItem, transform: &Transform) -> Result<Value, ResolutionError> {
    match transform {
        Transform::RamStringFirstToken => ram_first_token(item),
        Transform::KibToGib => kib_to_gib(item),
        Transform::DirectNumeric { field } => direct_numeric(item, field),
    }
}

fn ram_first_token(item: &RawItem) -> Result<Value, ResolutionError> {
    let value = lookup_any(item, RAM_CANDIDATES).ok_or_else(|| {
        ResolutionError::Ram(format!("no RAM field found (tried {})", RAM_CANDIDATES.join(", ")))
    })?;

    match value {
        Value::Number(_) => Ok(value.clone()),
        Value::String(s) => {
            let token = s
                .split_whitespace()
                .next()
                .ok_or_else(|| ResolutionError::Ram("empty value".to_string()))?;
            if let Ok(whole) = token.parse::<i64>() {
                return Ok(Value::from(whole));
            }
            parse_number(token)
                .map(Value::from)
                .ok_or_else(|| ResolutionError::Ram(format!("{token:?} is not a number")))
        }
        other => Err(ResolutionError::Ram(format!(
            "expected a number or string, found {}",
            kind_of(other)
        ))),
    }
}

fn kib_to_gib(item: &RawItem) -> Result<Value, ResolutionError> {
    if let Some(mem) = lookup(item, "mem") {
        let kib = as_number(mem)
            .ok_or_else(|| ResolutionError::KibToGib(format!("mem value {mem} is not a number")))?;
        return Ok(Value::from(kib / KIB_PER_GIB));
    }

    let gb = lookup(item, "memory_gb")
        .ok_or_else(|| ResolutionError::KibToGib("no mem or memory_gb field".to_string()))?;
    as_number(gb)
        .map(Value::from)
        .ok_or_else(|| ResolutionError::KibToGib(format!("memory_gb value {gb} is not a number")))
}

fn direct_numeric(item: &RawItem, field: &str) -> Result<Value, ResolutionError> {
    let value = lookup(item, field).ok_or_else(|| ResolutionError::DirectNumeric {
        field: field.to_string(),
        reason: "field not present".to_string(),
    })?;
    as_number(value)
        .map(Value::from)
        .ok_or_else(|| ResolutionError::DirectNumeric {
            field: field.to_string(),
            reason: format!("{value} is not a number"),
        })
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
