use serde_json::{Map, Value};

/// Key answer fields, in order of priority
const PRIORITY_KEYS: [&str; 7] = [
    "settlement_quote",
    "remaining_principal",
    "current_score",
    "band",
    "total_paid",
    "outstanding_principal",
    "changed",
];

/// Nested sections searched when the top level has no key answer
const NESTED_SECTIONS: [&str; 2] = ["snapshot", "score"];

/// Print just the key answer value from the output.
///
/// Heuristic: look for well-known result fields in order of priority, then
/// inside the nested snapshot/score sections, then fall back to the first
/// field in the result object. Lists print one line per row.
pub fn print_minimal(value: &Value) {
    // Try to extract the "result" envelope
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result_obj {
        Value::Object(map) => println!("{}", minimal_line(map)),
        Value::Array(rows) => {
            for row in rows {
                match row {
                    Value::Object(map) => match map.iter().next() {
                        Some((_, first)) => println!("{}", format_minimal(first)),
                        None => println!("{{}}"),
                    },
                    other => println!("{}", format_minimal(other)),
                }
            }
        }
        other => println!("{}", format_minimal(other)),
    }
}

fn minimal_line(map: &Map<String, Value>) -> String {
    if let Some(val) = priority_value(map) {
        return format_minimal(val);
    }
    for section in NESTED_SECTIONS {
        if let Some(Value::Object(inner)) = map.get(section) {
            if let Some(val) = priority_value(inner) {
                return format_minimal(val);
            }
        }
    }
    match map.iter().next() {
        Some((key, val)) => format!("{}: {}", key, format_minimal(val)),
        None => "{}".to_string(),
    }
}

fn priority_value(map: &Map<String, Value>) -> Option<&Value> {
    PRIORITY_KEYS
        .iter()
        .filter_map(|key| map.get(*key))
        .find(|val| !val.is_null())
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn line(v: Value) -> String {
        minimal_line(v.as_object().unwrap())
    }

    #[test]
    fn test_priority_key_wins() {
        assert_eq!(
            line(json!({"loan_id": "loan1", "settlement_quote": "3773.29"})),
            "3773.29"
        );
    }

    #[test]
    fn test_nested_snapshot_used_for_receipts() {
        let receipt = json!({
            "payment": {"amount": "100"},
            "snapshot": {"remaining_principal": "250.00"},
            "score": {"current_score": 830}
        });
        assert_eq!(line(receipt), "250.00");
    }

    #[test]
    fn test_falls_back_to_first_field() {
        assert_eq!(line(json!({"as_of": "2024-07-01"})), "as_of: 2024-07-01");
    }
}
