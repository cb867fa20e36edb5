use contentcodec_cli::{
    ValidationContext, parse_documents, validate_context, validate_element, validate_locale,
};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn contentcodec_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("contentcodec"))
}

fn write_store(dir: &Path) -> PathBuf {
    let store = json!({
        "schemas": {
            "contentTypes": {
                "api::article.article": {
                    "localized": true,
                    "fields": {
                        "title": { "type": "string" },
                        "body": { "type": "blocks" },
                        "seo": { "type": "component", "component": "shared.seo" }
                    }
                }
            },
            "components": {
                "shared.seo": { "fields": { "metaTitle": { "type": "string" } } }
            }
        },
        "locales": ["en", "fr"],
        "entries": {
            "api::article.article": {
                "doc-1": {
                    "en": {
                        "documentId": "doc-1",
                        "title": "Hello",
                        "body": [{ "type": "paragraph", "children": [{ "type": "text", "text": "Hi" }] }],
                        "seo": { "id": 4, "metaTitle": "Meta" }
                    }
                },
                "doc-2": {
                    "en": { "documentId": "doc-2", "title": "Second" }
                }
            }
        }
    });
    let path = dir.join("store.json");
    fs::write(&path, serde_json::to_string_pretty(&store).unwrap()).unwrap();
    path
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "Command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

fn read_entry(store: &Path, document: &str, locale: &str) -> Value {
    let content: Value = serde_json::from_str(&fs::read_to_string(store).unwrap()).unwrap();
    content["entries"]["api::article.article"][document][locale].clone()
}

#[test]
fn test_validate_locale() {
    assert!(validate_locale("en").is_ok());
    assert!(validate_locale("zh-Hant-TW").is_ok());
    assert!(validate_locale("pt_BR").is_ok());
    assert!(validate_locale("").is_err());
    assert!(validate_locale("not a locale").is_err());
}

#[test]
fn test_validate_element() {
    assert!(validate_element("api::article.article#doc-1").is_ok());
    assert!(validate_element("api::homepage.homepage").is_ok());
    assert!(validate_element("#doc-1").is_err());
}

#[test]
fn test_validate_context_reports_missing_store() {
    let context = ValidationContext::new()
        .with_store_file("/definitely/missing/store.json")
        .with_locale("en");
    let err = validate_context(&context).unwrap_err();
    assert!(err.contains("Store validation failed"));
}

#[test]
fn test_parse_documents_accepts_one_or_many() {
    let one = parse_documents(r#"{ "fields": [], "keep": {} }"#).unwrap();
    assert_eq!(one.len(), 1);
    let many = parse_documents(r#"[{ "fields": [] }, { "fields": [] }]"#).unwrap();
    assert_eq!(many.len(), 2);
    assert!(parse_documents("not json").is_err());
}

#[test]
fn test_export_import_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let store = write_store(temp_dir.path());

    let output = contentcodec_cmd()
        .args([
            "export",
            "-s",
            store.to_str().unwrap(),
            "-e",
            "api::article.article#doc-1",
            "--source",
            "en",
        ])
        .output()
        .expect("Failed to execute command");
    let mut document = stdout_json(&output);
    assert_eq!(document["fields"].as_array().unwrap().len(), 3);
    assert!(document["keep"]["seo"]["__tuid"].is_string());

    for field in document["fields"].as_array_mut().unwrap() {
        let translated = match field["field"].as_str().unwrap() {
            "title" => "Bonjour",
            "body" => "<p>Salut</p>",
            _ => "Méta",
        };
        field["translatableValue"] = json!([translated]);
    }
    let input = temp_dir.path().join("translated.json");
    fs::write(&input, serde_json::to_string(&document).unwrap()).unwrap();

    let output = contentcodec_cmd()
        .args([
            "import",
            "-s",
            store.to_str().unwrap(),
            "-e",
            "api::article.article#doc-1",
            "-t",
            "fr",
            "-i",
            input.to_str().unwrap(),
        ])
        .output()
        .expect("Failed to execute command");
    let outcome = stdout_json(&output);
    assert_eq!(outcome["status"], "written");

    let fr = read_entry(&store, "doc-1", "fr");
    assert_eq!(fr["title"], "Bonjour");
    assert_eq!(fr["seo"], json!({ "metaTitle": "Méta" }));
    assert_eq!(
        fr["body"],
        json!([{ "type": "paragraph", "children": [{ "type": "text", "text": "Salut" }] }])
    );
}

#[test]
fn test_batch_reports_failures_and_keeps_going() {
    let temp_dir = TempDir::new().unwrap();
    let store = write_store(temp_dir.path());
    let requests = json!([
        {
            "element": "api::article.article#doc-1",
            "source": "en",
            "target": "de",
            "document": [{ "fields": [{ "field": "title", "type": "text", "translatableValue": ["Hallo"], "realType": "string" }] }]
        },
        {
            "element": "api::article.article#doc-2",
            "source": "en",
            "target": "fr",
            "document": [{ "fields": [{ "field": "title", "type": "text", "translatableValue": ["Deuxième"], "realType": "string" }] }]
        }
    ]);
    let input = temp_dir.path().join("batch.json");
    fs::write(&input, requests.to_string()).unwrap();

    let output = contentcodec_cmd()
        .args([
            "batch",
            "-s",
            store.to_str().unwrap(),
            "-i",
            input.to_str().unwrap(),
            "--throttle-ms",
            "0",
        ])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["succeeded"], 1);
    assert_eq!(report["failed"], 1);
    assert_eq!(report["entries"][0]["status"], "failed");
    assert!(String::from_utf8_lossy(&output.stderr).contains("1 of 2 entries failed"));

    assert_eq!(read_entry(&store, "doc-2", "fr")["title"], "Deuxième");
    assert!(read_entry(&store, "doc-1", "de").is_null());
}

#[test]
fn test_to_html_and_back() {
    let temp_dir = TempDir::new().unwrap();
    let blocks = temp_dir.path().join("blocks.json");
    fs::write(
        &blocks,
        r#"[{ "type": "heading", "level": 2, "children": [{ "type": "text", "text": "Title", "italic": true }] }]"#,
    )
    .unwrap();

    let output = contentcodec_cmd()
        .args(["to-html", "-i", blocks.to_str().unwrap()])
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());
    let html = String::from_utf8_lossy(&output.stdout).trim().to_string();
    assert_eq!(html, "<h2><em>Title</em></h2>");

    let html_file = temp_dir.path().join("fragment.html");
    fs::write(&html_file, &html).unwrap();
    let output = contentcodec_cmd()
        .args(["to-blocks", "-i", html_file.to_str().unwrap()])
        .output()
        .expect("Failed to execute command");
    let decoded = stdout_json(&output);
    let original: Value = serde_json::from_str(&fs::read_to_string(&blocks).unwrap()).unwrap();
    assert_eq!(decoded, original);
}

#[test]
fn test_resolve_lists_reachable_components() {
    let temp_dir = TempDir::new().unwrap();
    let store = write_store(temp_dir.path());

    let output = contentcodec_cmd()
        .args([
            "resolve",
            "-s",
            store.to_str().unwrap(),
            "-c",
            "api::article.article",
        ])
        .output()
        .expect("Failed to execute command");
    let resolved = stdout_json(&output);
    assert_eq!(resolved["schema"]["fields"]["title"]["localizable"], true);
    assert!(resolved["components"]["shared.seo"].is_object());

    let output = contentcodec_cmd()
        .args(["resolve", "-s", store.to_str().unwrap(), "-c", "api::missing.missing"])
        .output()
        .expect("Failed to execute command");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("schema not found"));
}

#[test]
fn test_missing_store_fails() {
    let output = contentcodec_cmd()
        .args(["export", "-s", "/definitely/missing.json", "-e", "api::a.a#1"])
        .output()
        .expect("Failed to execute command");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Store validation failed"));
}
