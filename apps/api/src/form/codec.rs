//! Query-string threading of form state between pages:
//! `/preview?template=2&data=<url-encoded JSON object of flat keys>`.

use serde_json::Value;

use crate::catalog::TemplateKind;
use crate::form::state::FormState;
use crate::form::FormError;

/// Builds `template=<id>&data=<json>` for redirects and download links.
pub fn encode_query(kind: TemplateKind, state: &FormState) -> Result<String, FormError> {
    let data = serde_json::to_string(&state.to_flat_json())
        .map_err(|e| FormError::Encode(e.to_string()))?;
    let template = kind.id().to_string();
    serde_urlencoded::to_string([("template", template.as_str()), ("data", data.as_str())])
        .map_err(|e| FormError::Encode(e.to_string()))
}

/// Decodes the (already URL-decoded) `data` parameter into flat pairs.
/// An absent or blank parameter is an empty form.
pub fn decode_data(raw: Option<&str>, max_bytes: usize) -> Result<Vec<(String, String)>, FormError> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(Vec::new());
    };
    if raw.len() > max_bytes {
        return Err(FormError::TooLarge { max: max_bytes });
    }

    let value: Value =
        serde_json::from_str(raw).map_err(|e| FormError::BadData(e.to_string()))?;
    let Value::Object(map) = value else {
        return Err(FormError::BadData("expected a JSON object".to_string()));
    };

    map.into_iter()
        .map(|(key, value)| match value {
            Value::String(s) => Ok((key, s)),
            other => Err(FormError::BadData(format!(
                "value of '{key}' must be a string, got {other}"
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TemplateCatalog;
    use crate::form::keys::FieldKey;
    use crate::form::FormLimits;

    #[derive(serde::Deserialize)]
    struct Query {
        template: String,
        data: String,
    }

    #[test]
    fn test_encode_then_decode_restores_state() {
        let catalog = TemplateCatalog::embedded().unwrap();
        let schema = catalog.get(TemplateKind::Minimalist);
        let mut state = FormState::initial(schema);
        state.set(FieldKey::parse("name").unwrap(), "Grace & Co = \"Hopper\"");
        state.set(FieldKey::parse("experience[0].jobTitle").unwrap(), "Rear Admiral");

        let query = encode_query(TemplateKind::Minimalist, &state).unwrap();
        assert!(query.starts_with("template=3&data="));
        assert!(!query.contains('"'), "data must be percent-encoded: {query}");

        let parsed: Query = serde_urlencoded::from_str(&query).unwrap();
        assert_eq!(parsed.template, "3");

        let pairs = decode_data(Some(&parsed.data), 64 * 1024).unwrap();
        let restored = FormState::from_pairs(
            schema,
            pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            &FormLimits::default(),
        )
        .unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn test_missing_or_blank_data_is_empty() {
        assert!(decode_data(None, 10).unwrap().is_empty());
        assert!(decode_data(Some("  "), 10).unwrap().is_empty());
    }

    #[test]
    fn test_oversize_data_is_rejected() {
        let err = decode_data(Some(r#"{"name": "Ada Lovelace"}"#), 8).unwrap_err();
        assert!(matches!(err, FormError::TooLarge { max: 8 }));
    }

    #[test]
    fn test_non_object_or_non_string_values_are_rejected() {
        assert!(matches!(
            decode_data(Some("[1, 2]"), 100),
            Err(FormError::BadData(_))
        ));
        assert!(matches!(
            decode_data(Some(r#"{"skills[0]": 3}"#), 100),
            Err(FormError::BadData(_))
        ));
        assert!(matches!(
            decode_data(Some("{not json"), 100),
            Err(FormError::BadData(_))
        ));
    }
}
