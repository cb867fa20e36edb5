//! JSON payloads read from files or stdin.

use contentcodec::TranslationDocument;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fs;
use std::io::{self, Read};

/// Reads a whole input. `None` and `-` read stdin.
pub fn read_input(path: Option<&str>) -> Result<String, String> {
    match path {
        Some(path) if path != "-" => {
            fs::read_to_string(path).map_err(|e| format!("Cannot read {}: {}", path, e))
        }
        _ => {
            let mut content = String::new();
            io::stdin()
                .read_to_string(&mut content)
                .map_err(|e| format!("Cannot read stdin: {}", e))?;
            Ok(content)
        }
    }
}

pub fn parse_json<T: DeserializeOwned>(content: &str) -> Result<T, String> {
    serde_json::from_str(content).map_err(|e| format!("Invalid JSON payload: {}", e))
}

pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("Cannot serialize output: {}", e))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DocumentPayload {
    Many(Vec<TranslationDocument>),
    One(TranslationDocument),
}

/// Parses an import payload: one translated document, or the list the vendor sends.
pub fn parse_documents(content: &str) -> Result<Vec<TranslationDocument>, String> {
    match parse_json::<DocumentPayload>(content)? {
        DocumentPayload::Many(documents) => Ok(documents),
        DocumentPayload::One(document) => Ok(vec![document]),
    }
}
