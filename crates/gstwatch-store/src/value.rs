//! Lenient accessors over raw ingested documents.
//!
//! Source files arrive with string-typed numerics and missing fields;
//! these helpers apply the default policy (monetary fields default to
//! 0.0, strings to "") without failing the record.

use serde_json::Value;

/// Get a non-empty, trimmed string field. Numeric values are accepted
/// and stringified (phone numbers show up as JSON numbers in some
/// source files).
pub fn get_str(doc: &Value, key: &str) -> Option<String> {
    match doc.get(key) {
        Some(Value::String(s)) => {
            let t = s.trim();
            if t.is_empty() { None } else { Some(t.to_string()) }
        }
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// Get a string field with a default for missing/blank values.
pub fn str_or(doc: &Value, key: &str, default: &str) -> String {
    get_str(doc, key).unwrap_or_else(|| default.to_string())
}

/// Coerce a monetary field to f64, defaulting to 0.0 on anything
/// missing or non-numeric.
pub fn money(doc: &Value, key: &str) -> f64 {
    match doc.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Round to 2 decimal places for presentation. Accumulate at full
/// precision first; round only at the output edge.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn money_accepts_string_numerics() {
        let doc = json!({"Value": "1234.50", "Tax": 99, "Bad": "n/a"});
        assert_eq!(money(&doc, "Value"), 1234.50);
        assert_eq!(money(&doc, "Tax"), 99.0);
        assert_eq!(money(&doc, "Bad"), 0.0);
        assert_eq!(money(&doc, "Absent"), 0.0);
    }

    #[test]
    fn get_str_treats_blank_as_missing() {
        let doc = json!({"GSTIN": "  G1  ", "Name": "", "Phone": 9876543210u64});
        assert_eq!(get_str(&doc, "GSTIN").as_deref(), Some("G1"));
        assert_eq!(get_str(&doc, "Name"), None);
        assert_eq!(get_str(&doc, "Phone").as_deref(), Some("9876543210"));
    }

    #[test]
    fn round2_is_presentation_only() {
        assert_eq!(round2(10.005), 10.01);
        assert_eq!(round2(10.0049), 10.0);
    }
}
