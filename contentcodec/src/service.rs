//! Export and import of whole entries against a [`Repository`].

use serde::Serialize;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use crate::backfill::backfill;
use crate::element::{ElementRef, export_locale};
use crate::error::Error;
use crate::extract::extract;
use crate::merge::merge;
use crate::options::BatchOptions;
use crate::repository::Repository;
use crate::schema_index::{ResolvedSchema, SchemaIndex};
use crate::types::{ExportRequest, ImportRequest, TranslationDocument};

/// What an import did to the target entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ImportOutcome {
    /// One write carrying these top-level fields.
    Written { fields: Vec<String> },
    /// Nothing to write.
    Unchanged,
    /// The content-type is unknown or not localized.
    Skipped,
}

/// Per-entry status within a [`BatchReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum EntryStatus {
    Written { fields: Vec<String> },
    Unchanged,
    Skipped,
    Failed { error: String },
    NotAttempted,
}

impl From<ImportOutcome> for EntryStatus {
    fn from(outcome: ImportOutcome) -> Self {
        match outcome {
            ImportOutcome::Written { fields } => EntryStatus::Written { fields },
            ImportOutcome::Unchanged => EntryStatus::Unchanged,
            ImportOutcome::Skipped => EntryStatus::Skipped,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchEntry {
    pub element: String,
    pub target: String,
    #[serde(flatten)]
    pub status: EntryStatus,
}

/// Outcome of [`TranslationService::import_batch`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: usize,
    pub not_attempted: usize,
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    /// `true` when no entry failed.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    fn record(&mut self, request: &ImportRequest, status: EntryStatus) {
        match status {
            EntryStatus::Failed { .. } => self.failed += 1,
            EntryStatus::NotAttempted => self.not_attempted += 1,
            EntryStatus::Written { .. } | EntryStatus::Unchanged | EntryStatus::Skipped => {
                self.succeeded += 1
            }
        }
        self.entries.push(BatchEntry {
            element: request.element.clone(),
            target: request.target.clone(),
            status,
        });
    }
}

/// Drives extraction, merge and backfill for whole entries.
pub struct TranslationService<R: Repository> {
    repository: R,
}

impl<R: Repository> TranslationService<R> {
    pub fn new(repository: R) -> Self {
        TranslationService { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn into_repository(self) -> R {
        self.repository
    }

    /// The content-type schema with its components, if it exists and is localized.
    pub fn localized_schema(&self, content_type: &str) -> Option<ResolvedSchema> {
        SchemaIndex::new(&self.repository)
            .resolve(content_type)
            .filter(|schema| schema.entry.localized)
    }

    /// Exports the translatable content of one entry in the source locale.
    ///
    /// An unknown or non-localized content-type exports as an empty document.
    #[instrument(skip_all, fields(element = %request.element, source = %request.source))]
    pub async fn export(&self, request: &ExportRequest) -> Result<TranslationDocument, Error> {
        let element = ElementRef::parse(&request.element)?;
        let Some(schema) = self.localized_schema(&element.content_type) else {
            info!(
                content_type = element.content_type.as_str(),
                "content-type unknown or not localized, exporting nothing"
            );
            return Ok(TranslationDocument::default());
        };

        let locale = export_locale(&request.source);
        let entry = self
            .repository
            .get_entry(&element.content_type, element.document_id(), &locale)
            .await?
            .ok_or_else(|| {
                Error::entry_not_found(&element.content_type, element.document_id(), &locale)
            })?;

        let document: TranslationDocument = extract(&entry, &schema).into();
        info!(
            content_type = element.content_type.as_str(),
            document_id = element.document_id().unwrap_or("-"),
            locale = locale.as_str(),
            fields = document.fields.len(),
            "exported entry"
        );
        Ok(document)
    }

    /// Merges the first translated document of `request` into the target locale and writes it.
    #[instrument(
        skip_all,
        fields(element = %request.element, source = %request.source, target = %request.target)
    )]
    pub async fn import(&self, request: &ImportRequest) -> Result<ImportOutcome, Error> {
        let element = ElementRef::parse(&request.element)?;
        let document = request
            .document
            .first()
            .ok_or_else(|| Error::invalid_payload("document list is empty"))?;
        let content_type = element.content_type.as_str();
        let document_id = element.document_id();

        let source = self.source_entry(&element, &request.source).await?;
        let Some(schema) = self.localized_schema(content_type) else {
            warn!(content_type, "content-type unknown or not localized, import skipped");
            return Ok(ImportOutcome::Skipped);
        };

        let mut staged = merge(&document.fields, &document.keep, &source, &schema).unwrap_or_default();
        let target = self
            .repository
            .get_entry(content_type, document_id, &request.target)
            .await?;
        backfill(&mut staged, &source, &schema.entry, target.as_ref());

        if staged.is_empty() {
            info!(
                content_type,
                document_id = document_id.unwrap_or("-"),
                locale = request.target.as_str(),
                "nothing to import"
            );
            return Ok(ImportOutcome::Unchanged);
        }

        let fields: Vec<String> = staged.keys().cloned().collect();
        self.repository
            .update_entry(content_type, document_id, &request.target, staged)
            .await?;
        info!(
            content_type,
            document_id = document_id.unwrap_or("-"),
            locale = request.target.as_str(),
            fields = fields.len(),
            "imported translation"
        );
        Ok(ImportOutcome::Written { fields })
    }

    /// Imports entries one after another, pausing between them. A failing entry is recorded
    /// and the batch moves on.
    pub async fn import_batch(
        &self,
        requests: &[ImportRequest],
        options: &BatchOptions,
    ) -> BatchReport {
        let mut report = BatchReport::default();
        let limit = options.max_entries.unwrap_or(usize::MAX);

        for (position, request) in requests.iter().enumerate() {
            if position >= limit {
                report.record(request, EntryStatus::NotAttempted);
                continue;
            }
            if position > 0 && !options.throttle.is_zero() {
                debug!(delay = ?options.throttle, "throttling before next entry");
                sleep(options.throttle).await;
            }

            let status = match self.import(request).await {
                Ok(outcome) => outcome.into(),
                Err(error) => {
                    warn!(
                        element = request.element.as_str(),
                        target = request.target.as_str(),
                        %error,
                        "entry failed"
                    );
                    EntryStatus::Failed {
                        error: error.to_string(),
                    }
                }
            };
            report.record(request, status);
        }

        info!(
            succeeded = report.succeeded,
            failed = report.failed,
            not_attempted = report.not_attempted,
            "batch finished"
        );
        report
    }

    /// The source-locale entry of an import. Falls back to the primary language subtag,
    /// which is the locale exports read from.
    async fn source_entry(
        &self,
        element: &ElementRef,
        locale: &str,
    ) -> Result<serde_json::Value, Error> {
        let content_type = element.content_type.as_str();
        let document_id = element.document_id();
        if let Some(entry) = self
            .repository
            .get_entry(content_type, document_id, locale)
            .await?
        {
            return Ok(entry);
        }
        let primary = export_locale(locale);
        if primary != locale
            && let Some(entry) = self
                .repository
                .get_entry(content_type, document_id, &primary)
                .await?
        {
            return Ok(entry);
        }
        Err(Error::entry_not_found(content_type, document_id, locale))
    }
}
