//! Payload types exchanged with the translation service, plus the small set of
//! entry-tree conventions (reserved keys, discriminators, emptiness) the engine relies on.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Keys managed by the repository itself. They are never content.
pub const RESERVED_KEYS: &[&str] = &[
    "id",
    "documentId",
    "createdAt",
    "updatedAt",
    "publishedAt",
    "locale",
    "localizations",
    "createdBy",
    "updatedBy",
];

/// Discriminator naming the schema of a dynamic-zone instance.
pub const COMPONENT_KEY: &str = "__component";

/// Tag written onto component instances in the keep-set so the merge can find them again.
pub const INSTANCE_TAG: &str = "__tuid";

pub fn is_reserved_key(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// `null`, `""`, `[]` and `{}` carry nothing worth translating or copying.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// The original schema type of a translatable leaf (`realType` on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeafKind {
    String,
    Text,
    RichText,
    Blocks,
}

impl LeafKind {
    /// How the vendor should treat the value.
    pub fn value_kind(self) -> ValueKind {
        match self {
            LeafKind::String | LeafKind::Text => ValueKind::Text,
            LeafKind::RichText | LeafKind::Blocks => ValueKind::Html,
        }
    }
}

/// Presentation type of a translatable value (`type` on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Text,
    Html,
}

/// One translatable leaf value.
///
/// `uuid` is only set for leaves living inside a component or dynamic-zone instance;
/// all leaves of one instance share it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatableField {
    pub field: String,
    #[serde(rename = "type")]
    pub kind: ValueKind,
    pub translatable_value: Vec<String>,
    pub real_type: LeafKind,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "empty_string_as_none"
    )]
    pub uuid: Option<String>,
}

impl TranslatableField {
    pub fn new(field: impl Into<String>, real_type: LeafKind, value: impl Into<String>) -> Self {
        TranslatableField {
            field: field.into(),
            kind: real_type.value_kind(),
            translatable_value: vec![value.into()],
            real_type,
            uuid: None,
        }
    }

    pub fn with_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuid = Some(uuid.into());
        self
    }

    /// The single value carried by this field, if any.
    pub fn value(&self) -> Option<&str> {
        self.translatable_value.first().map(String::as_str)
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|uuid| !uuid.is_empty()))
}

/// The flat translatable list plus the keep-set, as exported and re-imported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslationDocument {
    #[serde(default)]
    pub fields: Vec<TranslatableField>,
    #[serde(default)]
    pub keep: Map<String, Value>,
}

impl TranslationDocument {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Export request as sent by the translation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRequest {
    /// `<content-type>#<documentId>`
    pub element: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

/// Import request carrying translated content for one entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRequest {
    /// `<content-type>#<documentId>`
    pub element: String,
    pub source: String,
    pub target: String,
    pub document: Vec<TranslationDocument>,
}
