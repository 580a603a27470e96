//! Translation from os-release identifiers to lifecycle provider identifiers.

use std::collections::HashMap;

/// Read-only mapping for identifiers that diverge between the two sources.
#[derive(Clone, Debug)]
pub struct IdTranslator {
    table: HashMap<String, String>,
}

impl Default for IdTranslator {
    fn default() -> Self {
        let table = hashmap! {
            "amzn".to_string() => "amazon-linux".to_string(),
            "ol".to_string() => "oracle-linux".to_string(),
            "pop".to_string() => "pop-os".to_string(),
            "rocky".to_string() => "rocky-linux".to_string(),
            "opensuse-leap".to_string() => "opensuse".to_string(),
            "sled".to_string() => "sles".to_string(),
        };
        Self { table }
    }
}

impl IdTranslator {
    /// Built-in table, with `extra` entries added on top (overriding on conflict).
    pub fn with_overrides<I>(extra: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut translator = Self::default();
        translator.table.extend(extra);
        translator
    }

    /// Return the provider identifier for `id`, or `id` itself if unmapped.
    pub fn translate<'a>(&'a self, id: &'a str) -> &'a str {
        self.table.get(id).map(String::as_str).unwrap_or(id)
    }
}
