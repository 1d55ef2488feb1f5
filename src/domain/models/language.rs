use serde::Serialize;

use crate::domain::DomainError;

/// A language the tutor can teach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Language {
    code: &'static str,
    name: &'static str,
    flag: &'static str,
}

pub const SUPPORTED_LANGUAGES: [Language; 10] = [
    Language::new("en", "English", "🇺🇸"),
    Language::new("es", "Spanish", "🇪🇸"),
    Language::new("fr", "French", "🇫🇷"),
    Language::new("de", "German", "🇩🇪"),
    Language::new("ja", "Japanese", "🇯🇵"),
    Language::new("zh", "Chinese (Mandarin)", "🇨🇳"),
    Language::new("ko", "Korean", "🇰🇷"),
    Language::new("it", "Italian", "🇮🇹"),
    Language::new("pt", "Portuguese", "🇧🇷"),
    Language::new("vi", "Vietnamese", "🇻🇳"),
];

impl Language {
    const fn new(code: &'static str, name: &'static str, flag: &'static str) -> Self {
        Self { code, name, flag }
    }

    pub fn all() -> &'static [Language] {
        &SUPPORTED_LANGUAGES
    }

    pub fn from_code(code: &str) -> Option<Self> {
        SUPPORTED_LANGUAGES
            .iter()
            .find(|lang| lang.code.eq_ignore_ascii_case(code.trim()))
            .copied()
    }

    /// Resolve either a language code (`fr`) or a display name (`French`).
    pub fn lookup(code_or_name: &str) -> Option<Self> {
        let needle = code_or_name.trim();
        Self::from_code(needle).or_else(|| {
            SUPPORTED_LANGUAGES
                .iter()
                .find(|lang| lang.name.eq_ignore_ascii_case(needle))
                .copied()
        })
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn flag(&self) -> &'static str {
        self.flag
    }
}

impl Language {
    /// Like [`Language::lookup`], but names the supported codes on failure.
    pub fn resolve(code_or_name: &str) -> Result<Self, DomainError> {
        Self::lookup(code_or_name).ok_or_else(|| {
            let codes: Vec<_> = SUPPORTED_LANGUAGES.iter().map(|l| l.code).collect();
            DomainError::not_found(format!(
                "Unsupported language '{}'. Choose one of: {}",
                code_or_name.trim(),
                codes.join(", ")
            ))
        })
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
