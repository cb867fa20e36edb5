use contentcodec::{
    BatchOptions, ExportRequest, ImportRequest, MemoryRepository, TranslationService,
};
use contentcodec_cli::{
    ValidationContext, parse_documents, parse_json, read_input, to_pretty_json, validate_context,
};
use std::time::Duration;
use tracing::info;

fn open_store(store: &str) -> Result<TranslationService<MemoryRepository>, String> {
    let repository = MemoryRepository::from_path(store).map_err(|e| e.to_string())?;
    Ok(TranslationService::new(repository))
}

async fn save_store(
    service: &TranslationService<MemoryRepository>,
    store: &str,
) -> Result<(), String> {
    service
        .repository()
        .save(store)
        .await
        .map_err(|e| format!("Cannot save store {}: {}", store, e))?;
    info!(store, "store saved");
    Ok(())
}

/// Print the translation document of one entry.
pub async fn run_export(store: &str, element: &str, source: &str) -> Result<(), String> {
    validate_context(
        &ValidationContext::new()
            .with_store_file(store)
            .with_element(element)
            .with_locale(source),
    )?;

    let service = open_store(store)?;
    let request = ExportRequest {
        element: element.to_string(),
        source: source.to_string(),
        target: None,
    };
    let document = service.export(&request).await.map_err(|e| e.to_string())?;
    println!("{}", to_pretty_json(&document)?);
    Ok(())
}

/// Merge a translated document into the target locale and save the store.
pub async fn run_import(
    store: &str,
    element: &str,
    source: &str,
    target: &str,
    input: Option<&str>,
) -> Result<(), String> {
    validate_context(
        &ValidationContext::new()
            .with_store_file(store)
            .with_input_file(input)
            .with_element(element)
            .with_locale(source)
            .with_locale(target),
    )?;

    let document = parse_documents(&read_input(input)?)?;
    let service = open_store(store)?;
    let request = ImportRequest {
        element: element.to_string(),
        source: source.to_string(),
        target: target.to_string(),
        document,
    };
    let outcome = service.import(&request).await.map_err(|e| e.to_string())?;
    save_store(&service, store).await?;
    println!("{}", to_pretty_json(&outcome)?);
    Ok(())
}

/// Import a list of requests one after another. Fails when any entry failed, after the
/// report is printed and the successful entries are saved.
pub async fn run_batch(
    store: &str,
    input: Option<&str>,
    throttle_ms: u64,
    max_entries: Option<usize>,
) -> Result<(), String> {
    validate_context(
        &ValidationContext::new()
            .with_store_file(store)
            .with_input_file(input),
    )?;

    let requests: Vec<ImportRequest> = parse_json(&read_input(input)?)?;
    let service = open_store(store)?;
    let options = BatchOptions::new()
        .with_throttle(Duration::from_millis(throttle_ms))
        .with_max_entries(max_entries);

    let report = service.import_batch(&requests, &options).await;
    save_store(&service, store).await?;
    println!("{}", to_pretty_json(&report)?);

    if report.is_success() {
        Ok(())
    } else {
        Err(format!(
            "{} of {} entries failed",
            report.failed,
            report.entries.len()
        ))
    }
}
