//! Field schemas for content-types and reusable components.
//!
//! A [`Schema`] maps field names to [`FieldSchema`] descriptors. The descriptor's
//! [`FieldKind`] is a closed sum type, so every traversal over an entry is an
//! exhaustive `match` instead of string dispatch.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::LeafKind;

/// The schema of one content-type or component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Document-level localization flag. A schema with `localized == false`
    /// is never traversed for translatable content.
    #[serde(default = "default_localized")]
    pub localized: bool,

    /// Field descriptors keyed by field name.
    #[serde(default)]
    pub fields: BTreeMap<String, FieldSchema>,
}

fn default_localized() -> bool {
    true
}

impl Default for Schema {
    fn default() -> Self {
        Schema {
            localized: true,
            fields: BTreeMap::new(),
        }
    }
}

impl Schema {
    pub fn new(localized: bool) -> Self {
        Schema {
            localized,
            fields: BTreeMap::new(),
        }
    }

    /// Adds a field descriptor, returning `self` for chaining.
    pub fn with_field(mut self, name: impl Into<String>, field: FieldSchema) -> Self {
        self.fields.insert(name.into(), field);
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.get(name)
    }

    /// Returns `true` if `name` is defined and translatable under this schema.
    pub fn is_field_localizable(&self, name: &str) -> bool {
        self.fields
            .get(name)
            .is_some_and(|field| field.is_localizable(self.localized))
    }
}

/// The kind of a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Text,
    RichText,
    Blocks,
    /// A reusable component, either a single instance or an ordered list of them.
    Component { component: String, repeatable: bool },
    /// An ordered list of heterogeneous component instances, each carrying `__component`.
    DynamicZone { components: Vec<String> },
    /// Anything the engine does not translate (media, numbers, relations, ...).
    Other(String),
}

impl FieldKind {
    /// The scalar leaf kind, if this field holds translatable text.
    pub fn leaf_kind(&self) -> Option<LeafKind> {
        match self {
            FieldKind::String => Some(LeafKind::String),
            FieldKind::Text => Some(LeafKind::Text),
            FieldKind::RichText => Some(LeafKind::RichText),
            FieldKind::Blocks => Some(LeafKind::Blocks),
            FieldKind::Component { .. } | FieldKind::DynamicZone { .. } | FieldKind::Other(_) => {
                None
            }
        }
    }

    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            FieldKind::Component { .. } | FieldKind::DynamicZone { .. }
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            FieldKind::String => "string",
            FieldKind::Text => "text",
            FieldKind::RichText => "richtext",
            FieldKind::Blocks => "blocks",
            FieldKind::Component { .. } => "component",
            FieldKind::DynamicZone { .. } => "dynamiczone",
            FieldKind::Other(kind) => kind,
        }
    }
}

/// Descriptor of one field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawField", into = "RawField")]
pub struct FieldSchema {
    pub kind: FieldKind,
    /// Explicit field-level localization flag. When absent the field follows its parent.
    pub localized: Option<bool>,
    /// Private fields are never exported.
    pub private: bool,
}

impl FieldSchema {
    pub fn new(kind: FieldKind) -> Self {
        FieldSchema {
            kind,
            localized: None,
            private: false,
        }
    }

    pub fn string() -> Self {
        Self::new(FieldKind::String)
    }

    pub fn text() -> Self {
        Self::new(FieldKind::Text)
    }

    pub fn richtext() -> Self {
        Self::new(FieldKind::RichText)
    }

    pub fn blocks() -> Self {
        Self::new(FieldKind::Blocks)
    }

    pub fn component(component: impl Into<String>, repeatable: bool) -> Self {
        Self::new(FieldKind::Component {
            component: component.into(),
            repeatable,
        })
    }

    pub fn dynamic_zone<I, S>(components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(FieldKind::DynamicZone {
            components: components.into_iter().map(Into::into).collect(),
        })
    }

    pub fn other(kind: impl Into<String>) -> Self {
        Self::new(FieldKind::Other(kind.into()))
    }

    pub fn with_localized(mut self, localized: bool) -> Self {
        self.localized = Some(localized);
        self
    }

    pub fn with_private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }

    /// Whether this field takes part in translation, given its parent's document-level flag.
    ///
    /// An explicit field flag wins. Without one, text-like and structural kinds inherit the
    /// parent's flag and every other kind stays untranslated.
    pub fn is_localizable(&self, parent_localized: bool) -> bool {
        if !parent_localized || self.private {
            return false;
        }
        match self.localized {
            Some(localized) => localized,
            None => self.kind.leaf_kind().is_some() || self.kind.is_structural(),
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Wire shape of a field descriptor. Accepts both `kind` and `type`, and both
/// `component` and `componentKind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawField {
    #[serde(alias = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    localized: Option<bool>,
    #[serde(default, skip_serializing_if = "is_false")]
    private: bool,
    #[serde(default, alias = "componentKind", skip_serializing_if = "Option::is_none")]
    component: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    repeatable: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    components: Vec<String>,
}

impl TryFrom<RawField> for FieldSchema {
    type Error = String;

    fn try_from(raw: RawField) -> Result<Self, Self::Error> {
        let kind = match raw.kind.to_ascii_lowercase().as_str() {
            "string" => FieldKind::String,
            "text" => FieldKind::Text,
            "richtext" => FieldKind::RichText,
            "blocks" => FieldKind::Blocks,
            "component" => FieldKind::Component {
                component: raw
                    .component
                    .ok_or_else(|| "component field is missing `component`".to_string())?,
                repeatable: raw.repeatable,
            },
            "dynamiczone" => FieldKind::DynamicZone {
                components: raw.components,
            },
            _ => FieldKind::Other(raw.kind),
        };

        Ok(FieldSchema {
            kind,
            localized: raw.localized,
            private: raw.private,
        })
    }
}

impl From<FieldSchema> for RawField {
    fn from(field: FieldSchema) -> Self {
        let mut raw = RawField {
            kind: field.kind.as_str().to_string(),
            localized: field.localized,
            private: field.private,
            component: None,
            repeatable: false,
            components: Vec::new(),
        };
        match field.kind {
            FieldKind::Component {
                component,
                repeatable,
            } => {
                raw.component = Some(component);
                raw.repeatable = repeatable;
            }
            FieldKind::DynamicZone { components } => raw.components = components,
            _ => {}
        }
        raw
    }
}

/// Lookup of content-type and component schemas by identifier.
pub trait SchemaSource: Send + Sync {
    /// Schema of a content-type such as `api::article.article`.
    fn content_type(&self, uid: &str) -> Option<&Schema>;

    /// Schema of a component kind such as `shared.seo`.
    fn component(&self, name: &str) -> Option<&Schema>;
}

/// A [`SchemaSource`] backed by two maps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InMemorySchemas {
    #[serde(default)]
    pub content_types: BTreeMap<String, Schema>,
    #[serde(default)]
    pub components: BTreeMap<String, Schema>,
}

impl InMemorySchemas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content_type(mut self, uid: impl Into<String>, schema: Schema) -> Self {
        self.content_types.insert(uid.into(), schema);
        self
    }

    pub fn with_component(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.components.insert(name.into(), schema);
        self
    }
}

impl SchemaSource for InMemorySchemas {
    fn content_type(&self, uid: &str) -> Option<&Schema> {
        self.content_types.get(uid)
    }

    fn component(&self, name: &str) -> Option<&Schema> {
        self.components.get(name)
    }
}
