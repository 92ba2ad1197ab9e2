use crate::types::LanguageId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Unknown language: {0}")]
    UnknownLanguage(String),

    #[error("Unsupported language id: {0}")]
    UnsupportedLanguageId(LanguageId),

    #[error("Invalid base64 in field `{field}`: {reason}")]
    Decode { field: &'static str, reason: String },
}
