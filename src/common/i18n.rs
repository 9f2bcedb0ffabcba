// src/common/i18n.rs

use std::collections::HashMap;

const DEFAULT_LANG: &str = "en";

// Catálogos embutidos no binário (locales/*.json)
const CATALOGS: [(&str, &str); 3] = [
    ("en", include_str!("../../locales/en.json")),
    ("pt", include_str!("../../locales/pt.json")),
    ("ru", include_str!("../../locales/ru.json")),
];

/// Mensagens traduzidas, indexadas por idioma e chave.
#[derive(Debug, Clone)]
pub struct I18nStore {
    catalogs: HashMap<String, HashMap<String, String>>,
}

impl I18nStore {
    pub fn load() -> Result<Self, serde_json::Error> {
        let mut catalogs = HashMap::new();
        for (lang, raw) in CATALOGS {
            let messages: HashMap<String, String> = serde_json::from_str(raw)?;
            catalogs.insert(lang.to_string(), messages);
        }
        Ok(Self { catalogs })
    }

    // Idioma pedido -> inglês -> a própria chave
    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.catalogs
            .get(lang)
            .and_then(|messages| messages.get(key))
            .or_else(|| self.catalogs.get(DEFAULT_LANG).and_then(|m| m.get(key)))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    /// Traduz e substitui os marcadores `{nome}` pelos valores dados.
    pub fn translate_with(&self, lang: &str, key: &str, args: &[(&str, &str)]) -> String {
        let mut message = self.translate(lang, key);
        for (name, value) in args {
            message = message.replace(&format!("{{{}}}", name), value);
        }
        message
    }

    pub fn supports(&self, lang: &str) -> bool {
        self.catalogs.contains_key(lang)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_catalog_has_the_same_keys() {
        let store = I18nStore::load().unwrap();
        let reference = &store.catalogs[DEFAULT_LANG];
        for (lang, messages) in &store.catalogs {
            for key in reference.keys() {
                assert!(messages.contains_key(key), "{} sem a chave {}", lang, key);
            }
        }
    }

    #[test]
    fn falls_back_to_english_then_key() {
        let store = I18nStore::load().unwrap();
        assert_eq!(store.translate("de", "error.user_not_found"), "User not found.");
        assert_eq!(store.translate("pt", "no.such.key"), "no.such.key");
        assert!(store.supports("ru"));
        assert!(!store.supports("de"));
    }

    #[test]
    fn placeholders_are_replaced() {
        let store = I18nStore::load().unwrap();
        let msg = store.translate_with("en", "error.column_unavailable", &[("field", "progress")]);
        assert_eq!(msg, "The tasks table has no column for 'progress'.");
    }
}
