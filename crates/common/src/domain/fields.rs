use serde_json::{Map, Value};

/// Ordered-fallback lookup over legacy field names.
///
/// Collecte documents written by older app versions carry their totals under
/// different keys (`poidsTotal` vs `total_poids` etc.). The first alias that
/// is present and non-null wins; `null` entries count as absent.
pub fn first_defined<'a>(fields: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|name| fields.get(*name))
        .find(|value| !value.is_null())
}

/// Render a scalar field value for message interpolation.
///
/// Numbers and strings are rendered as-is; anything else (objects, arrays,
/// booleans) is treated as absent so malformed documents never leak into a
/// user-facing message.
pub fn display_scalar(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_first_alias_wins() {
        let doc = fields(json!({ "poidsTotal": 12, "totalPoids": 99 }));
        let value = first_defined(&doc, &["poidsTotal", "totalPoids", "weight"]);
        assert_eq!(value, Some(&json!(12)));
    }

    #[test]
    fn test_falls_back_past_null() {
        let doc = fields(json!({ "poidsTotal": null, "totalPoids": 7 }));
        let value = first_defined(&doc, &["poidsTotal", "totalPoids"]);
        assert_eq!(value, Some(&json!(7)));
    }

    #[test]
    fn test_absent_everywhere() {
        let doc = fields(json!({ "autre": 1 }));
        assert_eq!(first_defined(&doc, &["poidsTotal", "totalPoids"]), None);
    }

    #[test]
    fn test_display_scalar_number_and_string() {
        assert_eq!(display_scalar(&json!(12)), Some("12".to_string()));
        assert_eq!(display_scalar(&json!(12.5)), Some("12.5".to_string()));
        assert_eq!(display_scalar(&json!("5000")), Some("5000".to_string()));
    }

    #[test]
    fn test_display_scalar_rejects_compound_values() {
        assert_eq!(display_scalar(&json!({ "kg": 12 })), None);
        assert_eq!(display_scalar(&json!([1, 2])), None);
        assert_eq!(display_scalar(&json!(true)), None);
    }
}
