//! Flattening an entry into translatable fields and a keep-set.

use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use crate::richtext;
use crate::schema::Schema;
use crate::schema_index::ResolvedSchema;
use crate::types::{
    INSTANCE_TAG, LeafKind, TranslatableField, TranslationDocument, is_empty_value,
    is_reserved_key,
};
use crate::uuid_index::{UuidIndex, escape_pointer, walk_field};

/// Result of [`extract`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// Every translatable leaf, top-level fields first in key order.
    pub fields: Vec<TranslatableField>,
    /// Untranslated copies of the structural fields that contributed leaves, with each
    /// contributing instance tagged by its uuid.
    pub keep: Map<String, Value>,
    /// Where each uuid's instance lives in the entry.
    pub index: UuidIndex,
}

impl From<Extraction> for TranslationDocument {
    fn from(extraction: Extraction) -> Self {
        TranslationDocument {
            fields: extraction.fields,
            keep: extraction.keep,
        }
    }
}

/// Pulls every translatable leaf out of `entry`.
///
/// Reserved keys, empty values, fields unknown to or not localizable under `schema` are
/// skipped. Leaves inside component and dynamic-zone instances share one uuid per instance:
/// the tag already stored on the instance if there is one, a fresh v4 uuid otherwise.
/// `entry` itself is never modified.
pub fn extract(entry: &Value, schema: &ResolvedSchema) -> Extraction {
    let mut fields = Vec::new();
    let mut keep = Map::new();
    let mut index = UuidIndex::new();

    let Some(data) = entry.as_object() else {
        debug!("entry is not an object, nothing to extract");
        return Extraction::default();
    };
    if !schema.entry.localized {
        debug!("content-type is not localized, nothing to extract");
        return Extraction::default();
    }

    for (key, value) in data {
        if is_reserved_key(key) || is_empty_value(value) {
            continue;
        }
        let Some(field) = schema.entry.field(key) else {
            continue;
        };
        if !field.is_localizable(schema.entry.localized) {
            continue;
        }

        if let Some(leaf) = field.kind.leaf_kind() {
            if let Some(text) = leaf_text(key, leaf, value) {
                fields.push(TranslatableField::new(key.as_str(), leaf, text));
            }
            continue;
        }
        if !field.kind.is_structural() {
            continue;
        }

        let mut copy = value.clone();
        let before = fields.len();
        let pointer = format!("/{}", escape_pointer(key));
        walk_field(
            field,
            &mut copy,
            schema,
            &pointer,
            &mut |pointer: &str,
                  component: &str,
                  instance_schema: &Schema,
                  instance: &mut Map<String, Value>| {
                let leaves = instance_leaves(instance_schema, instance);
                if leaves.is_empty() {
                    return;
                }
                let uuid = instance
                    .get(INSTANCE_TAG)
                    .and_then(Value::as_str)
                    .filter(|tag| !tag.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| Uuid::new_v4().to_string());
                instance.insert(INSTANCE_TAG.to_string(), Value::String(uuid.clone()));
                index.insert(uuid.as_str(), pointer, component);
                fields.extend(leaves.into_iter().map(|leaf| leaf.with_uuid(uuid.as_str())));
            },
        );
        if fields.len() > before {
            keep.insert(key.clone(), copy);
        }
    }

    debug!(
        fields = fields.len(),
        keep = keep.len(),
        instances = index.len(),
        "extracted entry"
    );
    Extraction {
        fields,
        keep,
        index,
    }
}

/// The translatable leaves stored directly on one instance, without uuids.
fn instance_leaves(schema: &Schema, instance: &Map<String, Value>) -> Vec<TranslatableField> {
    let mut leaves = Vec::new();
    for (name, field) in &schema.fields {
        if is_reserved_key(name) || !field.is_localizable(schema.localized) {
            continue;
        }
        let Some(leaf) = field.kind.leaf_kind() else {
            continue;
        };
        let Some(value) = instance.get(name) else {
            continue;
        };
        if let Some(text) = leaf_text(name, leaf, value) {
            leaves.push(TranslatableField::new(name.as_str(), leaf, text));
        }
    }
    leaves
}

/// The vendor-facing string for a leaf value, or `None` when there is nothing to translate.
fn leaf_text(name: &str, leaf: LeafKind, value: &Value) -> Option<String> {
    let text = match (leaf, value) {
        (LeafKind::Blocks, Value::Array(_)) => richtext::encode_value(value),
        (LeafKind::String | LeafKind::Text | LeafKind::RichText, Value::String(text)) => {
            text.clone()
        }
        (_, other) => {
            debug!(
                field = name,
                kind = ?leaf,
                value = %other,
                "leaf value has an unexpected shape, skipped"
            );
            return None;
        }
    };
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSchema;
    use crate::types::ValueKind;
    use serde_json::json;

    fn article() -> ResolvedSchema {
        ResolvedSchema::new(
            Schema::new(true)
                .with_field("title", FieldSchema::string())
                .with_field("body", FieldSchema::blocks())
                .with_field("slug", FieldSchema::string().with_localized(false))
                .with_field("views", FieldSchema::other("integer"))
                .with_field("seo", FieldSchema::component("shared.seo", false))
                .with_field("faq", FieldSchema::component("shared.faq", true)),
        )
        .with_component(
            "shared.seo",
            Schema::default()
                .with_field("metaTitle", FieldSchema::string())
                .with_field("metaDescription", FieldSchema::text())
                .with_field("canonical", FieldSchema::string().with_private(true)),
        )
        .with_component(
            "shared.faq",
            Schema::default()
                .with_field("question", FieldSchema::string())
                .with_field("answer", FieldSchema::richtext()),
        )
    }

    #[test]
    fn test_top_level_leaves_have_no_uuid() {
        let entry = json!({
            "id": 7,
            "documentId": "abc",
            "title": "Hello",
            "body": [{ "type": "paragraph", "children": [{ "type": "text", "text": "Hi", "bold": true }] }],
            "slug": "hello",
            "views": 3
        });

        let extraction = extract(&entry, &article());

        assert_eq!(
            extraction.fields,
            vec![
                TranslatableField::new("body", LeafKind::Blocks, "<p><strong>Hi</strong></p>"),
                TranslatableField::new("title", LeafKind::String, "Hello"),
            ]
        );
        assert_eq!(extraction.fields[0].kind, ValueKind::Html);
        assert!(extraction.keep.is_empty());
        assert!(extraction.index.is_empty());
    }

    #[test]
    fn test_component_leaves_share_instance_uuid() {
        let entry = json!({
            "seo": { "id": 1, "metaTitle": "Meta", "metaDescription": "Desc", "canonical": "/x" }
        });

        let extraction = extract(&entry, &article());

        assert_eq!(extraction.fields.len(), 2);
        let uuid = extraction.fields[0].uuid.clone().unwrap();
        assert!(extraction.fields.iter().all(|f| f.uuid.as_deref() == Some(uuid.as_str())));
        assert!(extraction.fields.iter().all(|f| f.field != "canonical"));
        assert_eq!(extraction.keep["seo"][INSTANCE_TAG], json!(uuid));
        assert_eq!(extraction.index.get(&uuid).unwrap().pointer, "/seo");
        // The caller's entry stays untagged.
        assert!(entry["seo"].get(INSTANCE_TAG).is_none());
    }

    #[test]
    fn test_repeatable_component_gets_uuid_per_element() {
        let entry = json!({
            "faq": [
                { "id": 1, "question": "Q1", "answer": "A1" },
                { "id": 2, "question": "" },
                { "id": 3, "question": "Q3" }
            ]
        });

        let extraction = extract(&entry, &article());

        assert_eq!(extraction.fields.len(), 3);
        assert_eq!(extraction.index.len(), 2);
        assert_ne!(extraction.fields[0].uuid, extraction.fields[2].uuid);
        assert!(extraction.keep["faq"][1].get(INSTANCE_TAG).is_none());
        assert!(extraction.keep["faq"][2].get(INSTANCE_TAG).is_some());
    }

    #[test]
    fn test_existing_tag_is_reused() {
        let entry = json!({ "seo": { "metaTitle": "Meta", "__tuid": "stored-uuid" } });
        let first = extract(&entry, &article());
        let second = extract(&entry, &article());
        assert_eq!(first.fields[0].uuid.as_deref(), Some("stored-uuid"));
        assert_eq!(first.fields, second.fields);
    }

    #[test]
    fn test_unlocalized_content_type_yields_nothing() {
        let mut schema = article();
        schema.entry.localized = false;
        let extraction = extract(&json!({ "title": "Hello", "seo": { "metaTitle": "M" } }), &schema);
        assert_eq!(extraction, Extraction::default());
    }

    #[test]
    fn test_non_string_leaf_is_skipped() {
        let extraction = extract(&json!({ "title": 42, "body": "not blocks" }), &article());
        assert!(extraction.fields.is_empty());
    }

    #[test]
    fn test_malformed_instance_leaf_is_skipped_alone() {
        let entry = json!({ "seo": { "metaTitle": ["not", "text"], "metaDescription": "Desc" } });

        let extraction = extract(&entry, &article());

        assert_eq!(extraction.fields.len(), 1);
        assert_eq!(extraction.fields[0].field, "metaDescription");
        assert_eq!(extraction.keep["seo"]["metaTitle"], json!(["not", "text"]));
    }
}
