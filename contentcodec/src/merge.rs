//! Writing translated fields back into the shape of the original entry.

use std::collections::BTreeSet;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::richtext;
use crate::schema::{FieldSchema, Schema};
use crate::schema_index::ResolvedSchema;
use crate::types::{LeafKind, TranslatableField};
use crate::uuid_index::{UuidIndex, walk_instances};

/// Builds the partial update for one target locale.
///
/// Fields without a uuid are staged as top-level values. Structural fields are copied from the
/// keep-set, or from `original` when the keep-set lacks them, component instance ids are
/// dropped, and every uuid-carrying field is written onto the instance its uuid resolves to.
/// A structural field ends up in the update only if one of its instances changed.
///
/// Returns `None` when nothing was staged. Schema drift, unknown uuids, empty values, fields
/// whose schema kind no longer matches their real type and fields that are not localizable
/// are logged and skipped.
pub fn merge(
    fields: &[TranslatableField],
    keep: &Map<String, Value>,
    original: &Value,
    schema: &ResolvedSchema,
) -> Option<Map<String, Value>> {
    let mut result = stage_simple_fields(fields, &schema.entry);

    let mut working = working_copy(keep, original, schema);
    let installed: Vec<String> = working.keys().cloned().collect();
    walk_instances(
        &mut working,
        &schema.entry,
        schema,
        "",
        &mut |_: &str, _: &str, _: &Schema, instance: &mut Map<String, Value>| {
            instance.remove("id");
        },
    );
    let index = UuidIndex::take_tags(&mut working, schema);

    let mut working = Value::Object(working);
    let changed = stage_instance_fields(fields, &index, &mut working, schema);

    if let Value::Object(mut working) = working {
        for name in installed {
            if changed.contains(&name) {
                if let Some(value) = working.remove(&name) {
                    result.insert(name, value);
                }
            }
        }
    }

    if result.is_empty() {
        debug!("merge staged nothing");
        None
    } else {
        debug!(fields = result.len(), "merge staged update");
        Some(result)
    }
}

fn stage_simple_fields(fields: &[TranslatableField], schema: &Schema) -> Map<String, Value> {
    let mut staged = Map::new();
    for field in fields.iter().filter(|field| field.uuid.is_none()) {
        let Some(field_schema) = schema.field(&field.field) else {
            warn!(field = field.field.as_str(), "field no longer in schema, skipped");
            continue;
        };
        if !field_schema.is_localizable(schema.localized) {
            debug!(field = field.field.as_str(), "field is not localizable, skipped");
            continue;
        }
        if !kind_matches(field_schema, field) {
            continue;
        }
        let Some(value) = translated_value(field) else {
            continue;
        };
        staged.insert(field.field.clone(), decode_leaf(field.real_type, value));
    }
    staged
}

/// Working copies of the localizable structural fields. The keep-set wins over the source entry.
fn working_copy(
    keep: &Map<String, Value>,
    original: &Value,
    schema: &ResolvedSchema,
) -> Map<String, Value> {
    for name in keep.keys() {
        match schema.entry.field(name) {
            None => warn!(field = name.as_str(), "keep-set field no longer in schema, skipped"),
            Some(field)
                if !field.kind.is_structural() || !field.is_localizable(schema.entry.localized) =>
            {
                debug!(field = name.as_str(), "keep-set field is not a localizable structure, skipped")
            }
            Some(_) => {}
        }
    }

    let mut working = Map::new();
    for (name, field) in &schema.entry.fields {
        if !field.kind.is_structural() || !field.is_localizable(schema.entry.localized) {
            continue;
        }
        let value = match keep.get(name) {
            Some(value) => value,
            None => match original.get(name) {
                Some(value) => {
                    debug!(field = name.as_str(), "structural field taken from source entry");
                    value
                }
                None => continue,
            },
        };
        if !value.is_null() {
            working.insert(name.clone(), value.clone());
        }
    }
    working
}

/// Writes uuid-carrying fields onto their instances; returns the top-level fields touched.
fn stage_instance_fields(
    fields: &[TranslatableField],
    index: &UuidIndex,
    working: &mut Value,
    schema: &ResolvedSchema,
) -> BTreeSet<String> {
    let mut changed = BTreeSet::new();
    for field in fields {
        let Some(uuid) = field.uuid.as_deref() else {
            continue;
        };
        let Some(location) = index.get(uuid) else {
            warn!(uuid, field = field.field.as_str(), "uuid not found in keep-set, field dropped");
            continue;
        };
        let Some(component) = schema.component(&location.component) else {
            warn!(
                uuid,
                component = location.component.as_str(),
                "component schema not found, field dropped"
            );
            continue;
        };
        let Some(field_schema) = component.field(&field.field) else {
            warn!(
                uuid,
                component = location.component.as_str(),
                field = field.field.as_str(),
                "field no longer in component schema, skipped"
            );
            continue;
        };
        if !field_schema.is_localizable(component.localized) {
            continue;
        }
        if !kind_matches(field_schema, field) {
            continue;
        }
        let Some(value) = translated_value(field) else {
            continue;
        };
        let Some(Value::Object(instance)) = working.pointer_mut(&location.pointer) else {
            warn!(uuid, pointer = location.pointer.as_str(), "instance vanished from keep-set");
            continue;
        };
        instance.insert(field.field.clone(), decode_leaf(field.real_type, value));
        changed.insert(location.root_field());
    }
    changed
}

/// The schema must still describe a leaf of the field's real type.
fn kind_matches(field_schema: &FieldSchema, field: &TranslatableField) -> bool {
    let schema_kind = field_schema.kind.leaf_kind();
    if schema_kind == Some(field.real_type) {
        return true;
    }
    warn!(
        field = field.field.as_str(),
        real_type = ?field.real_type,
        schema_kind = field_schema.kind.as_str(),
        "field kind changed in schema, skipped"
    );
    false
}

fn translated_value(field: &TranslatableField) -> Option<&str> {
    match field.value() {
        Some(value) if !value.is_empty() => Some(value),
        _ => {
            debug!(field = field.field.as_str(), "empty translation, skipped");
            None
        }
    }
}

fn decode_leaf(kind: LeafKind, value: &str) -> Value {
    match kind {
        LeafKind::Blocks => richtext::decode_to_value(value),
        LeafKind::String | LeafKind::Text | LeafKind::RichText => Value::String(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page() -> ResolvedSchema {
        ResolvedSchema::new(
            Schema::new(true)
                .with_field("title", FieldSchema::string())
                .with_field("body", FieldSchema::blocks())
                .with_field("slug", FieldSchema::string().with_localized(false))
                .with_field("sections", FieldSchema::dynamic_zone(["sections.hero"]))
                .with_field("seo", FieldSchema::component("shared.seo", false)),
        )
        .with_component("shared.seo", Schema::default().with_field("metaTitle", FieldSchema::string()))
        .with_component(
            "sections.hero",
            Schema::default()
                .with_field("heading", FieldSchema::string())
                .with_field("image", FieldSchema::other("media")),
        )
    }

    #[test]
    fn test_simple_fields_are_decoded_by_real_type() {
        let fields = vec![
            TranslatableField::new("title", LeafKind::String, "Bonjour"),
            TranslatableField::new("body", LeafKind::Blocks, "<p><em>Salut</em></p>"),
        ];
        let merged = merge(&fields, &Map::new(), &json!({}), &page()).unwrap();
        assert_eq!(merged["title"], json!("Bonjour"));
        assert_eq!(
            merged["body"],
            json!([{ "type": "paragraph", "children": [{ "type": "text", "text": "Salut", "italic": true }] }])
        );
    }

    #[test]
    fn test_drift_empty_and_unlocalized_fields_are_skipped() {
        let fields = vec![
            TranslatableField::new("removed", LeafKind::String, "x"),
            TranslatableField::new("title", LeafKind::String, ""),
            TranslatableField::new("slug", LeafKind::String, "bonjour"),
        ];
        assert_eq!(merge(&fields, &Map::new(), &json!({}), &page()), None);
    }

    #[test]
    fn test_instance_fields_land_on_their_instance() {
        let original = json!({
            "sections": [
                { "id": 4, "__component": "sections.hero", "heading": "One", "image": { "id": 9 } },
                { "id": 5, "__component": "sections.hero", "heading": "Two" }
            ]
        });
        let keep = json!({
            "sections": [
                { "id": 4, "__component": "sections.hero", "heading": "One", "image": { "id": 9 }, "__tuid": "u1" },
                { "id": 5, "__component": "sections.hero", "heading": "Two", "__tuid": "u2" }
            ]
        });
        let fields = vec![TranslatableField::new("heading", LeafKind::String, "Deux").with_uuid("u2")];

        let merged = merge(&fields, keep.as_object().unwrap(), &original, &page()).unwrap();

        assert_eq!(
            merged["sections"],
            json!([
                { "__component": "sections.hero", "heading": "One", "image": { "id": 9 } },
                { "__component": "sections.hero", "heading": "Deux" }
            ])
        );
    }

    #[test]
    fn test_unknown_uuid_is_dropped() {
        let keep = json!({
            "sections": [{ "__component": "sections.hero", "heading": "One", "__tuid": "u1" }]
        });
        let fields = vec![TranslatableField::new("heading", LeafKind::String, "Eins").with_uuid("nope")];
        assert_eq!(merge(&fields, keep.as_object().unwrap(), &json!({}), &page()), None);
    }

    #[test]
    fn test_unchanged_structure_is_left_out() {
        let keep = json!({
            "sections": [{ "__component": "sections.hero", "heading": "One", "__tuid": "u1" }]
        });
        let fields = vec![TranslatableField::new("title", LeafKind::String, "Titel")];
        let merged = merge(&fields, keep.as_object().unwrap(), &json!({}), &page()).unwrap();
        assert_eq!(merged.len(), 1);
        assert!(merged.get("sections").is_none());
    }

    #[test]
    fn test_kind_changed_in_schema_is_skipped() {
        let original = json!({ "seo": { "metaTitle": "Meta" } });
        let fields = vec![
            TranslatableField::new("seo", LeafKind::String, "oops"),
            TranslatableField::new("title", LeafKind::Blocks, "<p>Titre</p>"),
        ];
        assert_eq!(merge(&fields, &Map::new(), &original, &page()), None);

        let keep = json!({
            "sections": [{ "__component": "sections.hero", "heading": "One", "image": { "id": 9 }, "__tuid": "u1" }]
        });
        let fields = vec![TranslatableField::new("image", LeafKind::String, "x").with_uuid("u1")];
        assert_eq!(merge(&fields, keep.as_object().unwrap(), &json!({}), &page()), None);
    }

    #[test]
    fn test_source_entry_seeds_missing_keep_fields() {
        let original = json!({
            "seo": { "id": 3, "metaTitle": "Meta", "__tuid": "u9" },
            "sections": [{ "id": 4, "__component": "sections.hero", "heading": "Source", "__tuid": "u1" }]
        });
        let keep = json!({
            "sections": [{ "id": 4, "__component": "sections.hero", "heading": "Kept", "__tuid": "u1" }]
        });
        let fields = vec![
            TranslatableField::new("metaTitle", LeafKind::String, "Méta").with_uuid("u9"),
            TranslatableField::new("title", LeafKind::String, "Titre").with_uuid("u1"),
        ];

        let merged = merge(&fields, keep.as_object().unwrap(), &original, &page()).unwrap();

        assert_eq!(merged["seo"], json!({ "metaTitle": "Méta" }));
        assert!(merged.get("sections").is_none());
    }

    #[test]
    fn test_keep_set_wins_over_source_entry() {
        let original = json!({
            "sections": [{ "__component": "sections.hero", "heading": "Source", "__tuid": "u1" }]
        });
        let keep = json!({
            "sections": [{ "__component": "sections.hero", "heading": "Kept", "image": { "id": 9 }, "__tuid": "u2" }]
        });
        let fields = vec![TranslatableField::new("heading", LeafKind::String, "Neu").with_uuid("u2")];

        let merged = merge(&fields, keep.as_object().unwrap(), &original, &page()).unwrap();

        assert_eq!(
            merged["sections"],
            json!([{ "__component": "sections.hero", "heading": "Neu", "image": { "id": 9 } }])
        );
    }
}
