//! Resolution of a content-type into its own schema plus every component schema reachable from it.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::schema::{FieldKind, Schema, SchemaSource};

/// A content-type schema together with the transitive closure of its component schemas.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedSchema {
    pub entry: Schema,
    pub components: BTreeMap<String, Schema>,
}

impl ResolvedSchema {
    pub fn new(entry: Schema) -> Self {
        ResolvedSchema {
            entry,
            components: BTreeMap::new(),
        }
    }

    pub fn with_component(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.components.insert(name.into(), schema);
        self
    }

    pub fn component(&self, name: &str) -> Option<&Schema> {
        self.components.get(name)
    }
}

/// Assembles [`ResolvedSchema`]s from a [`SchemaSource`]. Pure lookup, no instance data.
pub struct SchemaIndex<'a, S: SchemaSource + ?Sized> {
    source: &'a S,
}

impl<'a, S: SchemaSource + ?Sized> SchemaIndex<'a, S> {
    pub fn new(source: &'a S) -> Self {
        SchemaIndex { source }
    }

    /// Resolves `uid` into its schema and all reachable component schemas.
    ///
    /// Returns `None` for an unknown content-type. Component kinds already present in the
    /// accumulator are not visited again, which makes self-referencing components terminate.
    /// A referenced component without a schema is logged and left out.
    pub fn resolve(&self, uid: &str) -> Option<ResolvedSchema> {
        let Some(entry) = self.source.content_type(uid) else {
            debug!(content_type = uid, "unknown content-type");
            return None;
        };

        let mut components = BTreeMap::new();
        let mut pending = referenced_components(entry);

        while let Some(name) = pending.pop() {
            if components.contains_key(&name) {
                continue;
            }
            match self.source.component(&name) {
                Some(schema) => {
                    pending.extend(referenced_components(schema));
                    components.insert(name, schema.clone());
                }
                None => warn!(
                    content_type = uid,
                    component = name.as_str(),
                    "component schema not found"
                ),
            }
        }

        Some(ResolvedSchema {
            entry: entry.clone(),
            components,
        })
    }
}

fn referenced_components(schema: &Schema) -> Vec<String> {
    let mut names = Vec::new();
    for field in schema.fields.values() {
        match &field.kind {
            FieldKind::Component { component, .. } => names.push(component.clone()),
            FieldKind::DynamicZone { components } => names.extend(components.iter().cloned()),
            FieldKind::String
            | FieldKind::Text
            | FieldKind::RichText
            | FieldKind::Blocks
            | FieldKind::Other(_) => {}
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSchema, InMemorySchemas};

    fn schemas() -> InMemorySchemas {
        InMemorySchemas::new()
            .with_content_type(
                "api::page.page",
                Schema::new(true)
                    .with_field("title", FieldSchema::string())
                    .with_field("seo", FieldSchema::component("shared.seo", false))
                    .with_field(
                        "sections",
                        FieldSchema::dynamic_zone(["sections.hero", "sections.faq"]),
                    ),
            )
            .with_component(
                "shared.seo",
                Schema::default().with_field("metaTitle", FieldSchema::string()),
            )
            .with_component(
                "sections.hero",
                Schema::default()
                    .with_field("heading", FieldSchema::string())
                    .with_field("cta", FieldSchema::component("shared.link", false)),
            )
            .with_component(
                "sections.faq",
                Schema::default().with_field("items", FieldSchema::component("faq.item", true)),
            )
            .with_component(
                "shared.link",
                Schema::default().with_field("label", FieldSchema::string()),
            )
            .with_component(
                "faq.item",
                Schema::default()
                    .with_field("question", FieldSchema::string())
                    .with_field("children", FieldSchema::component("faq.item", true)),
            )
    }

    #[test]
    fn test_resolve_unknown_content_type() {
        let source = schemas();
        assert!(SchemaIndex::new(&source).resolve("api::missing.missing").is_none());
    }

    #[test]
    fn test_resolve_collects_transitive_components() {
        let source = schemas();
        let resolved = SchemaIndex::new(&source).resolve("api::page.page").unwrap();
        let names: Vec<&str> = resolved.components.keys().map(String::as_str).collect();
        assert_eq!(
            names,
            vec![
                "faq.item",
                "sections.faq",
                "sections.hero",
                "shared.link",
                "shared.seo"
            ]
        );
        assert!(resolved.entry.field("title").is_some());
    }

    #[test]
    fn test_resolve_terminates_on_cycles() {
        let source = InMemorySchemas::new()
            .with_content_type(
                "api::tree.tree",
                Schema::new(true).with_field("root", FieldSchema::component("tree.a", false)),
            )
            .with_component(
                "tree.a",
                Schema::default().with_field("next", FieldSchema::component("tree.b", false)),
            )
            .with_component(
                "tree.b",
                Schema::default().with_field("back", FieldSchema::component("tree.a", false)),
            );

        let resolved = SchemaIndex::new(&source).resolve("api::tree.tree").unwrap();
        assert_eq!(resolved.components.len(), 2);
    }

    #[test]
    fn test_resolve_skips_missing_component() {
        let source = InMemorySchemas::new().with_content_type(
            "api::post.post",
            Schema::new(true)
                .with_field("seo", FieldSchema::component("shared.gone", false))
                .with_field("body", FieldSchema::blocks()),
        );

        let resolved = SchemaIndex::new(&source).resolve("api::post.post").unwrap();
        assert!(resolved.components.is_empty());
        assert!(resolved.entry.field("body").is_some());
    }
}
