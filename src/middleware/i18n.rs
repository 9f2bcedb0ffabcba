// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

const SUPPORTED_LANGS: [&str; 3] = ["en", "pt", "ru"];

/// Idioma da resposta, resolvido a partir do `Accept-Language`.
#[derive(Debug, Clone)]
pub struct Locale(pub String);

impl Default for Locale {
    fn default() -> Self {
        Locale("en".to_string())
    }
}

impl Locale {
    /// Primeiro idioma suportado na ordem de preferência do cliente.
    pub fn from_header(value: &str) -> Self {
        accept_language::parse(value)
            .iter()
            .map(|tag| {
                // "pt-BR" -> "pt"
                tag.split('-').next().unwrap_or(tag).to_ascii_lowercase()
            })
            .find(|lang| SUPPORTED_LANGS.contains(&lang.as_str()))
            .map(Locale)
            .unwrap_or_default()
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let locale = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .map(Locale::from_header)
            .unwrap_or_default();

        Ok(locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_first_supported_language() {
        assert_eq!(Locale::from_header("de-DE,ru;q=0.8,en;q=0.5").0, "ru");
        assert_eq!(Locale::from_header("pt-BR").0, "pt");
    }

    #[test]
    fn unknown_languages_fall_back_to_english() {
        assert_eq!(Locale::from_header("fr-FR,de").0, "en");
        assert_eq!(Locale::from_header("").0, "en");
    }
}
