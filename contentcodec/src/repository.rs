//! The content repository the engine reads entries from and writes translations to.
//!
//! The engine only ever sees the [`Repository`] trait. [`MemoryRepository`] keeps everything
//! in memory and can be loaded from and saved to a JSON [`StoreSnapshot`]; the CLI and the
//! tests run against it.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::Error;
use crate::schema::{InMemorySchemas, Schema, SchemaSource};

/// Entry store seam. Schemas come from the [`SchemaSource`] supertrait.
#[async_trait]
pub trait Repository: SchemaSource {
    /// Fetches one locale version of a document. Without a document id the first document
    /// of the content-type is used, as for single types. `Ok(None)` when there is none.
    async fn get_entry(
        &self,
        content_type: &str,
        document_id: Option<&str>,
        locale: &str,
    ) -> Result<Option<Value>, Error>;

    /// Applies `data` as a partial update to one locale version of a document,
    /// creating that locale version if needed.
    async fn update_entry(
        &self,
        content_type: &str,
        document_id: Option<&str>,
        locale: &str,
        data: Map<String, Value>,
    ) -> Result<(), Error>;
}

/// content-type → document id → locale → entry
pub type EntryMap = BTreeMap<String, BTreeMap<String, BTreeMap<String, Value>>>;

/// Serializable contents of a [`MemoryRepository`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    #[serde(default)]
    pub schemas: InMemorySchemas,
    /// Locales entries may be written in.
    #[serde(default)]
    pub locales: Vec<String>,
    #[serde(default)]
    pub entries: EntryMap,
}

impl StoreSnapshot {
    pub fn new(schemas: InMemorySchemas) -> Self {
        StoreSnapshot {
            schemas,
            ..Self::default()
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locales.push(locale.into());
        self
    }

    pub fn with_entry(
        mut self,
        content_type: impl Into<String>,
        document_id: impl Into<String>,
        locale: impl Into<String>,
        entry: Value,
    ) -> Self {
        self.entries
            .entry(content_type.into())
            .or_default()
            .entry(document_id.into())
            .or_default()
            .insert(locale.into(), entry);
        self
    }

    /// Reads a snapshot from a JSON file.
    pub fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Writes the snapshot as pretty-printed JSON.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// In-memory [`Repository`].
#[derive(Debug, Default)]
pub struct MemoryRepository {
    schemas: InMemorySchemas,
    locales: Vec<String>,
    entries: Mutex<EntryMap>,
}

impl MemoryRepository {
    pub fn new(snapshot: StoreSnapshot) -> Self {
        MemoryRepository {
            schemas: snapshot.schemas,
            locales: snapshot.locales,
            entries: Mutex::new(snapshot.entries),
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Ok(Self::new(StoreSnapshot::read_from(path)?))
    }

    pub fn locales(&self) -> &[String] {
        &self.locales
    }

    /// A copy of the current contents.
    pub async fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            schemas: self.schemas.clone(),
            locales: self.locales.clone(),
            entries: self.entries.lock().await.clone(),
        }
    }

    pub async fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        self.snapshot().await.write_to(path)
    }
}

fn resolve_document_id(
    documents: &BTreeMap<String, BTreeMap<String, Value>>,
    document_id: Option<&str>,
) -> Option<String> {
    match document_id {
        Some(id) => documents.contains_key(id).then(|| id.to_string()),
        None => documents.keys().next().cloned(),
    }
}

impl SchemaSource for MemoryRepository {
    fn content_type(&self, uid: &str) -> Option<&Schema> {
        self.schemas.content_type(uid)
    }

    fn component(&self, name: &str) -> Option<&Schema> {
        self.schemas.component(name)
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn get_entry(
        &self,
        content_type: &str,
        document_id: Option<&str>,
        locale: &str,
    ) -> Result<Option<Value>, Error> {
        let entries = self.entries.lock().await;
        let Some(documents) = entries.get(content_type) else {
            return Ok(None);
        };
        let Some(id) = resolve_document_id(documents, document_id) else {
            return Ok(None);
        };
        Ok(documents
            .get(&id)
            .and_then(|locales| locales.get(locale))
            .cloned())
    }

    async fn update_entry(
        &self,
        content_type: &str,
        document_id: Option<&str>,
        locale: &str,
        data: Map<String, Value>,
    ) -> Result<(), Error> {
        if !self.locales.iter().any(|configured| configured == locale) {
            return Err(Error::repository(
                format!("locale `{}` is not configured", locale),
                None,
            ));
        }

        let mut entries = self.entries.lock().await;
        let documents = entries
            .get_mut(content_type)
            .ok_or_else(|| Error::entry_not_found(content_type, document_id, locale))?;
        let id = resolve_document_id(documents, document_id)
            .ok_or_else(|| Error::entry_not_found(content_type, document_id, locale))?;
        let versions = documents.entry(id.clone()).or_default();

        let entry = versions.entry(locale.to_string()).or_insert_with(|| {
            let mut fresh = Map::new();
            fresh.insert("documentId".to_string(), Value::String(id.clone()));
            fresh.insert("locale".to_string(), Value::String(locale.to_string()));
            Value::Object(fresh)
        });
        let Value::Object(target) = entry else {
            return Err(Error::repository(
                format!("stored entry {}#{} ({}) is not an object", content_type, id, locale),
                None,
            ));
        };

        let written = data.len();
        target.extend(data);
        debug!(
            content_type,
            document_id = id.as_str(),
            locale,
            fields = written,
            "entry updated"
        );
        Ok(())
    }
}
