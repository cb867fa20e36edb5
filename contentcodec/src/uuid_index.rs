//! Locating component instances by uuid.
//!
//! Extraction tags every instance that contributed a translatable leaf with
//! [`INSTANCE_TAG`](crate::types::INSTANCE_TAG), on its keep-set copy only. On import the merge
//! installs that copy into a working tree and calls [`UuidIndex::take_tags`], which walks the
//! tree the same way extraction did, records where each tagged instance lives as a JSON
//! pointer and removes the tag. Nothing else travels between the two passes.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::schema::{FieldKind, FieldSchema, Schema};
use crate::schema_index::ResolvedSchema;
use crate::types::{COMPONENT_KEY, INSTANCE_TAG};

/// Where a tagged instance lives inside an entry tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceLocation {
    /// JSON pointer relative to the entry root, e.g. `/sections/1`.
    pub pointer: String,
    /// Component kind of the instance, e.g. `sections.hero`.
    pub component: String,
}

impl InstanceLocation {
    /// The top-level entry field that holds the instance.
    pub fn root_field(&self) -> String {
        let token = self
            .pointer
            .trim_start_matches('/')
            .split('/')
            .next()
            .unwrap_or_default();
        token.replace("~1", "/").replace("~0", "~")
    }
}

/// uuid → instance location, built once per extraction or merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UuidIndex {
    locations: BTreeMap<String, InstanceLocation>,
}

impl UuidIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        uuid: impl Into<String>,
        pointer: impl Into<String>,
        component: impl Into<String>,
    ) {
        self.locations.insert(
            uuid.into(),
            InstanceLocation {
                pointer: pointer.into(),
                component: component.into(),
            },
        );
    }

    pub fn get(&self, uuid: &str) -> Option<&InstanceLocation> {
        self.locations.get(uuid)
    }

    pub fn contains(&self, uuid: &str) -> bool {
        self.locations.contains_key(uuid)
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &InstanceLocation)> {
        self.locations
            .iter()
            .map(|(uuid, location)| (uuid.as_str(), location))
    }

    /// Indexes every tagged instance below `fields` and strips the tags.
    pub fn take_tags(fields: &mut Map<String, Value>, schema: &ResolvedSchema) -> Self {
        let mut index = UuidIndex::new();
        walk_instances(
            fields,
            &schema.entry,
            schema,
            "",
            &mut |pointer: &str, component: &str, _: &Schema, instance: &mut Map<String, Value>| {
                let Some(tag) = instance.remove(INSTANCE_TAG) else {
                    return;
                };
                match tag {
                    Value::String(uuid) if !uuid.is_empty() => {
                        index.insert(uuid, pointer, component)
                    }
                    other => debug!(pointer, tag = %other, "ignoring malformed instance tag"),
                }
            },
        );
        index
    }
}

/// Escapes one JSON pointer reference token.
pub(crate) fn escape_pointer(token: &str) -> Cow<'_, str> {
    if token.contains(['~', '/']) {
        Cow::Owned(token.replace('~', "~0").replace('/', "~1"))
    } else {
        Cow::Borrowed(token)
    }
}

/// Visits every component instance reachable from `fields` through localizable structural
/// fields of `schema`, parents before children.
///
/// The visitor receives the instance pointer, its component kind, its schema and the instance.
pub(crate) fn walk_instances<F>(
    fields: &mut Map<String, Value>,
    schema: &Schema,
    resolved: &ResolvedSchema,
    base: &str,
    visit: &mut F,
) where
    F: FnMut(&str, &str, &Schema, &mut Map<String, Value>),
{
    if !schema.localized {
        return;
    }
    for (name, field) in &schema.fields {
        if !field.is_localizable(schema.localized) {
            continue;
        }
        if let Some(value) = fields.get_mut(name) {
            let pointer = format!("{}/{}", base, escape_pointer(name));
            walk_field(field, value, resolved, &pointer, visit);
        }
    }
}

/// Visits the instances held by one structural field value located at `pointer`.
pub(crate) fn walk_field<F>(
    field: &FieldSchema,
    value: &mut Value,
    resolved: &ResolvedSchema,
    pointer: &str,
    visit: &mut F,
) where
    F: FnMut(&str, &str, &Schema, &mut Map<String, Value>),
{
    match &field.kind {
        FieldKind::Component { component, .. } => match value {
            Value::Array(items) => {
                for (position, item) in items.iter_mut().enumerate() {
                    if let Value::Object(instance) = item {
                        let pointer = format!("{}/{}", pointer, position);
                        walk_instance(instance, component, resolved, &pointer, visit);
                    }
                }
            }
            Value::Object(instance) => walk_instance(instance, component, resolved, pointer, visit),
            _ => {}
        },
        FieldKind::DynamicZone { .. } => {
            let Value::Array(items) = value else {
                return;
            };
            for (position, item) in items.iter_mut().enumerate() {
                let Value::Object(instance) = item else {
                    continue;
                };
                let pointer = format!("{}/{}", pointer, position);
                let Some(component) = instance
                    .get(COMPONENT_KEY)
                    .and_then(Value::as_str)
                    .map(str::to_string)
                else {
                    debug!(pointer = pointer.as_str(), "dynamic zone instance without `__component`");
                    continue;
                };
                walk_instance(instance, &component, resolved, &pointer, visit);
            }
        }
        FieldKind::String
        | FieldKind::Text
        | FieldKind::RichText
        | FieldKind::Blocks
        | FieldKind::Other(_) => {}
    }
}

fn walk_instance<F>(
    instance: &mut Map<String, Value>,
    component: &str,
    resolved: &ResolvedSchema,
    pointer: &str,
    visit: &mut F,
) where
    F: FnMut(&str, &str, &Schema, &mut Map<String, Value>),
{
    let Some(schema) = resolved.component(component) else {
        warn!(component, pointer, "component schema not found, instance skipped");
        return;
    };
    visit(pointer, component, schema, instance);
    walk_instances(instance, schema, resolved, pointer, visit);
}
