#![forbid(unsafe_code)]
//! Schema-driven translation codec for structured CMS content.
//!
//! An entry is a JSON tree shaped by its content-type schema: scalar text fields, rich-text
//! block trees, reusable components and dynamic zones of heterogeneous components. This crate
//! flattens such a tree into a list of translatable values for a translation vendor and writes
//! the translated list back into the shape of the original tree.
//!
//! # Quick Start
//!
//! ```rust
//! use contentcodec::{
//!     FieldSchema, InMemorySchemas, LeafKind, Schema, SchemaIndex, TranslatableField, extract, merge,
//! };
//! use serde_json::json;
//!
//! let schemas = InMemorySchemas::new().with_content_type(
//!     "api::article.article",
//!     Schema::new(true)
//!         .with_field("title", FieldSchema::string())
//!         .with_field("body", FieldSchema::blocks()),
//! );
//! let schema = SchemaIndex::new(&schemas).resolve("api::article.article").unwrap();
//!
//! let entry = json!({ "title": "Hello", "body": [] });
//! let exported = extract(&entry, &schema);
//! assert_eq!(exported.fields[0].value(), Some("Hello"));
//!
//! let translated = vec![TranslatableField::new("title", LeafKind::String, "Bonjour")];
//! let update = merge(&translated, &exported.keep, &entry, &schema).unwrap();
//! assert_eq!(update["title"], json!("Bonjour"));
//! ```
//!
//! # Pieces
//!
//! - [`SchemaIndex`]: a content-type schema plus every component schema it reaches
//! - [`richtext`]: block tree ⇄ HTML, the format the vendor works on
//! - [`extract`] / [`merge`]: the two halves of the round trip, joined by instance uuids
//! - [`backfill`]: completes a first-time localization with untranslated source fields
//! - [`TranslationService`]: export, import and throttled batch import over a [`Repository`]

pub mod backfill;
pub mod element;
pub mod error;
pub mod extract;
pub mod merge;
pub mod options;
pub mod repository;
pub mod richtext;
pub mod schema;
pub mod schema_index;
pub mod service;
pub mod types;
pub mod uuid_index;

// Re-export most used types for easy consumption
pub use crate::{
    backfill::{backfill, needs_backfill},
    element::{ElementRef, export_locale},
    error::Error,
    extract::{Extraction, extract},
    merge::merge,
    options::BatchOptions,
    repository::{MemoryRepository, Repository, StoreSnapshot},
    schema::{FieldKind, FieldSchema, InMemorySchemas, Schema, SchemaSource},
    schema_index::{ResolvedSchema, SchemaIndex},
    service::{BatchEntry, BatchReport, EntryStatus, ImportOutcome, TranslationService},
    types::{
        ExportRequest, ImportRequest, LeafKind, TranslatableField, TranslationDocument, ValueKind,
    },
    uuid_index::{InstanceLocation, UuidIndex},
};
