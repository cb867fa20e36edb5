use contentcodec::ElementRef;
use std::path::Path;
use unic_langid::LanguageIdentifier;

/// Arguments of one command, checked before the store is opened.
#[derive(Debug, Default)]
pub struct ValidationContext {
    pub store_file: Option<String>,
    pub input_file: Option<String>,
    pub element: Option<String>,
    pub locales: Vec<String>,
}

impl ValidationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store_file(mut self, file: &str) -> Self {
        self.store_file = Some(file.to_string());
        self
    }

    /// `-` stands for stdin and is not checked.
    pub fn with_input_file(mut self, file: Option<&str>) -> Self {
        self.input_file = file.filter(|file| *file != "-").map(str::to_string);
        self
    }

    pub fn with_element(mut self, element: &str) -> Self {
        self.element = Some(element.to_string());
        self
    }

    pub fn with_locale(mut self, locale: &str) -> Self {
        self.locales.push(locale.to_string());
        self
    }
}

/// Validate file path exists and is readable
pub fn validate_file_path(path: &str) -> Result<(), String> {
    let path_obj = Path::new(path);

    if !path_obj.exists() {
        return Err(format!("File does not exist: {}", path));
    }

    if !path_obj.is_file() {
        return Err(format!("Path is not a file: {}", path));
    }

    Ok(())
}

/// Validate a locale code. Accepts `_` as the subtag separator.
pub fn validate_locale(locale: &str) -> Result<(), String> {
    if locale.is_empty() {
        return Err("Locale cannot be empty".to_string());
    }

    match locale.replace('_', "-").parse::<LanguageIdentifier>() {
        Ok(_) => Ok(()),
        Err(_) => Err(format!(
            "Invalid locale: {}. Expected a BCP 47 language identifier",
            locale
        )),
    }
}

/// Validate a `<content-type>#<documentId>` element reference
pub fn validate_element(element: &str) -> Result<(), String> {
    ElementRef::parse(element)
        .map(|_| ())
        .map_err(|e| e.to_string())
}

/// Validate a complete validation context
pub fn validate_context(context: &ValidationContext) -> Result<(), String> {
    if let Some(ref store) = context.store_file {
        validate_file_path(store).map_err(|e| format!("Store validation failed: {}", e))?;
    }

    if let Some(ref input) = context.input_file {
        validate_file_path(input).map_err(|e| format!("Input validation failed: {}", e))?;
    }

    if let Some(ref element) = context.element {
        validate_element(element).map_err(|e| format!("Element validation failed: {}", e))?;
    }

    for locale in &context.locales {
        validate_locale(locale).map_err(|e| format!("Locale validation failed: {}", e))?;
    }

    Ok(())
}
