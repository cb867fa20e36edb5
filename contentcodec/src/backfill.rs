//! Filling a first-time localization with the source entry's untranslated fields.

use serde_json::{Map, Value};
use tracing::debug;

use crate::schema::Schema;
use crate::types::{is_empty_value, is_reserved_key};

/// Whether the target-locale entry counts as not yet localized: absent, or with every
/// non-reserved field null.
pub fn needs_backfill(target: Option<&Value>) -> bool {
    match target {
        None | Some(Value::Null) => true,
        Some(Value::Object(map)) => map
            .iter()
            .filter(|(key, _)| !is_reserved_key(key))
            .all(|(_, value)| value.is_null()),
        Some(_) => false,
    }
}

/// Copies every schema field missing from `staged` and non-empty in `source` into `staged`,
/// verbatim, when `target` still needs it (see [`needs_backfill`]).
///
/// Returns the number of fields copied.
pub fn backfill(
    staged: &mut Map<String, Value>,
    source: &Value,
    schema: &Schema,
    target: Option<&Value>,
) -> usize {
    if !needs_backfill(target) {
        return 0;
    }

    let mut copied = 0;
    for name in schema.fields.keys() {
        if is_reserved_key(name) || staged.contains_key(name) {
            continue;
        }
        match source.get(name) {
            Some(value) if !is_empty_value(value) => {
                staged.insert(name.clone(), value.clone());
                copied += 1;
            }
            _ => {}
        }
    }

    if copied > 0 {
        debug!(fields = copied, "backfilled untranslated fields from source locale");
    }
    copied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSchema;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new(true)
            .with_field("title", FieldSchema::string())
            .with_field("cover", FieldSchema::other("media"))
            .with_field("featured", FieldSchema::other("boolean"))
            .with_field("rating", FieldSchema::other("integer"))
            .with_field("tags", FieldSchema::other("json"))
    }

    fn source() -> Value {
        json!({
            "id": 1,
            "documentId": "doc",
            "title": "Hello",
            "cover": { "id": 12, "url": "/a.png" },
            "featured": false,
            "rating": 0,
            "tags": [],
            "unknown": "ignored"
        })
    }

    #[test]
    fn test_absent_target_gets_missing_fields() {
        let mut staged = Map::new();
        staged.insert("title".to_string(), json!("Bonjour"));

        let copied = backfill(&mut staged, &source(), &schema(), None);

        assert_eq!(copied, 3);
        assert_eq!(staged["title"], json!("Bonjour"));
        assert_eq!(staged["cover"], json!({ "id": 12, "url": "/a.png" }));
        assert_eq!(staged["featured"], json!(false));
        assert_eq!(staged["rating"], json!(0));
        assert!(!staged.contains_key("tags"));
        assert!(!staged.contains_key("unknown"));
        assert!(!staged.contains_key("id"));
    }

    #[test]
    fn test_all_null_target_counts_as_new() {
        let target = json!({ "id": 5, "locale": "fr", "title": null, "cover": null });
        assert!(needs_backfill(Some(&target)));

        let mut staged = Map::new();
        assert_eq!(backfill(&mut staged, &source(), &schema(), Some(&target)), 4);
    }

    #[test]
    fn test_populated_target_is_left_alone() {
        let target = json!({ "id": 5, "title": "Existant", "cover": null });
        assert!(!needs_backfill(Some(&target)));

        let mut staged = Map::new();
        assert_eq!(backfill(&mut staged, &source(), &schema(), Some(&target)), 0);
        assert!(staged.is_empty());
    }
}
