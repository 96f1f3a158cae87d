//! Localized message lookup with `{param}` interpolation.

use std::collections::HashMap;

pub const KEY_RECORD_CREATED: &str = "record.created";
pub const KEY_RECORD_UPDATED: &str = "record.updated";

/// Synchronous string lookup. Implementations interpolate `{name}`
/// placeholders from the supplied params.
pub trait Translator {
    fn translate(&self, key: &str, params: &[(&str, String)]) -> String;
}

/// Template catalog keyed by message id, loadable from JSON.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: HashMap<String, String>,
}

impl Catalog {
    /// Built-in English templates for the save-outcome notifications.
    pub fn with_defaults() -> Self {
        let mut catalog = Self::default();
        catalog.insert(KEY_RECORD_CREATED, "A new record was created with identifier {id}");
        catalog.insert(KEY_RECORD_UPDATED, "Record {id} was updated");
        catalog
    }

    /// Parses a flat `{"key": "template"}` JSON object, layered over the
    /// defaults so partial catalogs stay usable.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let entries: HashMap<String, String> = serde_json::from_str(json)?;
        let mut catalog = Self::with_defaults();
        catalog.entries.extend(entries);
        Ok(catalog)
    }

    pub fn insert(&mut self, key: &str, template: &str) {
        self.entries.insert(key.to_string(), template.to_string());
    }
}

impl Translator for Catalog {
    fn translate(&self, key: &str, params: &[(&str, String)]) -> String {
        let Some(template) = self.entries.get(key) else {
            tracing::debug!(key, "missing catalog entry; echoing key");
            return key.to_string();
        };
        let mut message = template.clone();
        for (name, value) in params {
            message = message.replace(&format!("{{{name}}}"), value);
        }
        message
    }
}
