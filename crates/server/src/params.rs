//! Helpers turning raw query-string values into engine inputs.

use crate::ServerError;

/// A numeric value that may only fail softly: anything unparseable counts
/// as missing (page numbers and sizes reset to their defaults).
pub fn lenient_number(value: Option<&str>) -> Option<i64> {
    value.and_then(|v| v.trim().parse().ok())
}

/// An optional identifier; present but malformed is a bad request.
pub fn optional_id(field: &str, value: Option<&str>) -> Result<Option<i64>, ServerError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ServerError::Generic(format!("invalid {field}: {raw}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_number_ignores_garbage() {
        assert_eq!(lenient_number(Some("3")), Some(3));
        assert_eq!(lenient_number(Some("three")), None);
        assert_eq!(lenient_number(None), None);
    }

    #[test]
    fn optional_id_rejects_garbage() {
        assert_eq!(optional_id("id", Some(" 7 ")).ok(), Some(Some(7)));
        assert_eq!(optional_id("id", Some("")).ok(), Some(None));
        assert!(optional_id("id", Some("x7")).is_err());
    }
}
