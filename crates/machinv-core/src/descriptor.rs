//! Field descriptors — how one canonical field is pulled out of a raw item.
//!
//! Descriptors are parsed once, when a mapping file is loaded, into the
//! closed [`FieldDescriptor`] type. Nothing is inspected by shape at
//! resolution time, so a bad mapping surfaces at startup (or at reload)
//! instead of on every request.
//!
//! Accepted JSON shapes:
//!
//! | JSON                                          | Descriptor                       |
//! |-----------------------------------------------|----------------------------------|
//! | `null`, `""`, `[]`                            | [`FieldDescriptor::Absent`]      |
//! | `"cpu_model"`                                 | [`FieldDescriptor::DirectName`]  |
//! | `["OSName", "os_name"]`                       | [`FieldDescriptor::CandidateList`] |
//! | `"kib-to-gib"`                                | [`FieldDescriptor::Transform`]   |
//! | `{"transform": "direct-numeric", "field": "ram_gb"}` | [`FieldDescriptor::Transform`] |

use phf::phf_map;
use serde::Deserialize;
use serde_json::Value;

use crate::error::DescriptorError;

// ---------------------------------------------------------------------------
// Transform registry
// ---------------------------------------------------------------------------

/// Transform names recognised in mapping files. The two `lambda ...` keys are
/// the literal expressions older mapping files used; they resolve to the same
/// routines as their named equivalents.
static TRANSFORMS: phf::Map<&'static str, TransformKind> = phf_map! {
    "ram-string-first-token" => TransformKind::RamStringFirstToken,
    "kib-to-gib" => TransformKind::KibToGib,
    "direct-numeric" => TransformKind::DirectNumeric,
    "identity-numeric" => TransformKind::DirectNumeric,
    "lambda data: int(data['RAM'].split()[0])" => TransformKind::RamStringFirstToken,
    "lambda data: int(data['mem']) / 1024" => TransformKind::KibToGib,
};

/// Registry key without arguments. Turned into a [`Transform`] by
/// [`TransformKind::build`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformKind {
    RamStringFirstToken,
    KibToGib,
    DirectNumeric,
}

impl TransformKind {
    /// Look up a transform by its mapping-file name.
    pub fn lookup(name: &str) -> Option<TransformKind> {
        TRANSFORMS.get(name).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            TransformKind::RamStringFirstToken => "ram-string-first-token",
            TransformKind::KibToGib => "kib-to-gib",
            TransformKind::DirectNumeric => "direct-numeric",
        }
    }

    fn build(self, field: Option<String>) -> Result<Transform, DescriptorError> {
        match (self, field) {
            (TransformKind::DirectNumeric, Some(field)) => Ok(Transform::DirectNumeric { field }),
            (TransformKind::DirectNumeric, None) => {
                Err(DescriptorError::MissingTransformField(self.name()))
            }
            (_, Some(_)) => Err(DescriptorError::UnexpectedTransformField(self.name())),
            (TransformKind::RamStringFirstToken, None) => Ok(Transform::RamStringFirstToken),
            (TransformKind::KibToGib, None) => Ok(Transform::KibToGib),
        }
    }
}

/// A fixed extraction-and-conversion routine. Adding behaviour means adding a
/// variant here and a case in the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transform {
    /// Numeric RAM field passed through, or the first whitespace token of a
    /// string such as `"16 GB"`.
    RamStringFirstToken,
    /// `mem` in KiB divided by 1024; falls back to `memory_gb`.
    KibToGib,
    /// A single named field coerced to a number.
    DirectNumeric { field: String },
}

// ---------------------------------------------------------------------------
// FieldDescriptor
// ---------------------------------------------------------------------------

/// Per-field instruction in a source's mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Value")]
pub enum FieldDescriptor {
    /// The source does not provide this field.
    #[default]
    Absent,
    /// Case-insensitive lookup of one key.
    DirectName(String),
    /// Case-insensitive lookup of each key in turn; first hit wins.
    CandidateList(Vec<String>),
    /// A named conversion routine.
    Transform(Transform),
}

impl FieldDescriptor {
    pub fn direct(name: impl Into<String>) -> Self {
        FieldDescriptor::DirectName(name.into())
    }

    pub fn candidates<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldDescriptor::CandidateList(names.into_iter().map(Into::into).collect())
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, FieldDescriptor::Absent)
    }

    /// Parse a descriptor from its mapping-file JSON form.
    pub fn from_value(value: &Value) -> Result<Self, DescriptorError> {
        match value {
            Value::Null => Ok(FieldDescriptor::Absent),
            Value::String(s) => Self::from_name(s),
            Value::Array(items) => {
                let names = items
                    .iter()
                    .map(|v| v.as_str().map(str::to_string))
                    .collect::<Option<Vec<_>>>()
                    .ok_or(DescriptorError::InvalidMappingType)?;
                if names.is_empty() {
                    Ok(FieldDescriptor::Absent)
                } else {
                    Ok(FieldDescriptor::CandidateList(names))
                }
            }
            Value::Object(obj) => {
                if obj.keys().any(|k| k != "transform" && k != "field") {
                    return Err(DescriptorError::InvalidMappingType);
                }
                let name = obj
                    .get("transform")
                    .and_then(Value::as_str)
                    .ok_or(DescriptorError::InvalidMappingType)?;
                let field = match obj.get("field") {
                    None | Some(Value::Null) => None,
                    Some(Value::String(f)) => Some(f.clone()),
                    Some(_) => return Err(DescriptorError::InvalidMappingType),
                };
                let kind = TransformKind::lookup(name)
                    .ok_or_else(|| DescriptorError::UnknownTransform(name.to_string()))?;
                kind.build(field).map(FieldDescriptor::Transform)
            }
            Value::Bool(_) | Value::Number(_) => Err(DescriptorError::InvalidMappingType),
        }
    }

    fn from_name(name: &str) -> Result<Self, DescriptorError> {
        if name.is_empty() {
            return Ok(FieldDescriptor::Absent);
        }
        if let Some(kind) = TransformKind::lookup(name) {
            return kind.build(None).map(FieldDescriptor::Transform);
        }
        if name.starts_with("lambda ") {
            return Err(DescriptorError::UnsupportedExpression(name.to_string()));
        }
        Ok(FieldDescriptor::DirectName(name.to_string()))
    }
}

impl TryFrom<Value> for FieldDescriptor {
    type Error = DescriptorError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        FieldDescriptor::from_value(&value)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
