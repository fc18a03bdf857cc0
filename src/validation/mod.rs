//! Client-side form checks: DOI syntax and required-field presence.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::errors::{ClientError, FieldErrors};

/// Crossref-recommended DOI pattern, matched case-insensitively.
static DOI_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^10\.\d{4,9}/[-._;()/:A-Z0-9]+$").expect("DOI pattern is valid")
});

/// True when `doi` is a syntactically valid DOI.
pub fn is_valid_doi(doi: &str) -> bool {
    DOI_REGEX.is_match(doi.trim())
}

/// Check a DOI form field. An empty value is accepted only when optional.
pub fn validate_doi(doi: &str, required: bool) -> Result<(), ClientError> {
    let doi = doi.trim();
    if doi.is_empty() {
        if required {
            return Err(ClientError::field("DOI", "DOI is required"));
        }
        return Ok(());
    }
    if !is_valid_doi(doi) {
        return Err(ClientError::field("DOI", format!("Invalid DOI: {}", doi)));
    }
    Ok(())
}

/// True when a form value counts as filled in.
pub fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(_) => true,
    }
}

/// Collect every missing required field into one validation error.
pub fn require_fields(
    payload: &serde_json::Map<String, Value>,
    required: &[&str],
) -> Result<(), ClientError> {
    let mut fields = FieldErrors::new();
    for field in required {
        if !is_present(payload.get(*field)) {
            fields.insert(field.to_string(), vec![format!("{} is required", field)]);
        }
    }
    if fields.is_empty() {
        Ok(())
    } else {
        Err(ClientError::Validation {
            message: "Required fields are missing".to_string(),
            fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_dois() {
        assert!(is_valid_doi("10.1000/xyz123"));
        assert!(is_valid_doi("10.1038/NPHYS1170"));
        assert!(is_valid_doi("10.1002/(SICI)1097-4571(199806)49:8"));
        assert!(is_valid_doi(" 10.12345/abc-def_1.2 "));
    }

    #[test]
    fn test_invalid_dois() {
        assert!(!is_valid_doi("not-a-doi"));
        assert!(!is_valid_doi("10.12/short-registrant"));
        assert!(!is_valid_doi("10.1000/"));
        assert!(!is_valid_doi("https://doi.org/10.1000/xyz123"));
    }

    #[test]
    fn test_empty_doi_depends_on_required() {
        assert!(validate_doi("", false).is_ok());
        let err = validate_doi("   ", true).unwrap_err();
        match err {
            ClientError::Validation { fields, .. } => assert!(fields.contains_key("DOI")),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(validate_doi("not-a-doi", false).is_err());
        assert!(validate_doi("10.1000/xyz123", true).is_ok());
    }

    #[test]
    fn test_require_fields_reports_all_missing() {
        let payload = json!({ "title": "  ", "author": "Ada", "tags": [] });
        let err = require_fields(payload.as_object().unwrap(), &["title", "author", "tags", "date"])
            .unwrap_err();
        match err {
            ClientError::Validation { fields, .. } => {
                let missing: Vec<&str> = fields.keys().map(String::as_str).collect();
                assert_eq!(missing, vec!["date", "tags", "title"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
