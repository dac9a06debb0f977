// Small helpers for JSON columns and LIKE filters

use folio_core::error::AppError;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Decode a JSON column, reporting corrupt rows as database errors
pub(crate) fn decode_json<T: DeserializeOwned>(column: &str, raw: &str) -> Result<T, AppError> {
    serde_json::from_str(raw)
        .map_err(|e| AppError::Database(format!("Corrupt JSON in column {}: {}", column, e)))
}

pub(crate) fn encode_json<T: Serialize>(value: &T) -> Result<String, AppError> {
    Ok(serde_json::to_string(value)?)
}

fn escape_like(term: &str) -> String {
    term.trim()
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Case-insensitive substring pattern; pair with `ESCAPE '\'`
pub(crate) fn contains_pattern(term: Option<&str>) -> Option<String> {
    term.filter(|t| !t.trim().is_empty())
        .map(|t| format!("%{}%", escape_like(t)))
}

/// Case-insensitive prefix pattern; pair with `ESCAPE '\'`
pub(crate) fn prefix_pattern(term: Option<&str>) -> Option<String> {
    term.filter(|t| !t.trim().is_empty())
        .map(|t| format!("{}%", escape_like(t)))
}
