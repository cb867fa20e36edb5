//! Entry addressing as used by the translation service.

use std::fmt;
use std::str::FromStr;

use unic_langid::LanguageIdentifier;

use crate::error::Error;

/// `"<content-type>#<documentId>"`, the document id being optional for single types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementRef {
    pub content_type: String,
    pub document_id: Option<String>,
}

impl ElementRef {
    pub fn new(content_type: impl Into<String>, document_id: Option<String>) -> Self {
        ElementRef {
            content_type: content_type.into(),
            document_id,
        }
    }

    /// Splits an element string at the first `#`. An empty document id reads as absent.
    pub fn parse(element: &str) -> Result<Self, Error> {
        let (content_type, document_id) = match element.split_once('#') {
            Some((content_type, document_id)) => (content_type, Some(document_id)),
            None => (element, None),
        };
        let content_type = content_type.trim();
        if content_type.is_empty() {
            return Err(Error::InvalidElement(element.to_string()));
        }
        Ok(ElementRef {
            content_type: content_type.to_string(),
            document_id: document_id
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string),
        })
    }

    pub fn document_id(&self) -> Option<&str> {
        self.document_id.as_deref()
    }
}

impl FromStr for ElementRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.document_id {
            Some(id) => write!(f, "{}#{}", self.content_type, id),
            None => write!(f, "{}", self.content_type),
        }
    }
}

/// The locale an export reads from: the primary language subtag of `locale`
/// (`de-DE` → `de`). Accepts underscores as separators.
pub fn export_locale(locale: &str) -> String {
    let canonical = locale.trim().replace('_', "-");
    match canonical.parse::<LanguageIdentifier>() {
        Ok(lang) => lang.language.to_string(),
        Err(_) => canonical
            .split('-')
            .next()
            .unwrap_or_default()
            .to_string(),
    }
}
