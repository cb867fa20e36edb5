use contentcodec::{Error, MemoryRepository, Schema, SchemaIndex};
use contentcodec_cli::{ValidationContext, to_pretty_json, validate_context};
use serde_json::{Map, Value, json};

fn describe(schema: &Schema) -> Value {
    let fields: Map<String, Value> = schema
        .fields
        .iter()
        .map(|(name, field)| {
            (
                name.clone(),
                json!({
                    "kind": field.kind.as_str(),
                    "localizable": field.is_localizable(schema.localized),
                }),
            )
        })
        .collect();
    json!({
        "localized": schema.localized,
        "fields": fields,
    })
}

/// Print a content-type schema with every component schema it reaches.
pub fn run_resolve(store: &str, content_type: &str) -> Result<(), String> {
    validate_context(&ValidationContext::new().with_store_file(store))?;

    let repository = MemoryRepository::from_path(store).map_err(|e| e.to_string())?;
    let resolved = SchemaIndex::new(&repository)
        .resolve(content_type)
        .ok_or_else(|| Error::SchemaNotFound(content_type.to_string()).to_string())?;

    let components: Map<String, Value> = resolved
        .components
        .iter()
        .map(|(name, schema)| (name.clone(), describe(schema)))
        .collect();
    let body = json!({
        "contentType": content_type,
        "schema": describe(&resolved.entry),
        "components": components,
    });
    println!("{}", to_pretty_json(&body)?);
    Ok(())
}
