//! Tolerant extraction of the transaction array from an LLM reply.
//!
//! The model is told to answer with a bare JSON array, but it sometimes
//! wraps the array in prose anyway. We scan for the first `[` and the last
//! `]` and parse only that span; anything unusable yields an empty list
//! rather than an error.

use serde::Deserialize;
use serde_json::Value;

/// Loosely-typed transaction record as the model emitted it. Every field
/// is optional; the normalizer fills defaults.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct RawRecord {
    pub date: Option<String>,
    pub description: Option<String>,
    pub amount: Option<LooseAmount>,
    pub category: Option<String>,
    pub transaction_type: Option<String>,
}

/// Amount as a JSON number or a numeric string
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum LooseAmount {
    Num(f64),
    Text(String),
}

impl RawRecord {
    pub fn amount_f64(&self) -> Option<f64> {
        match &self.amount {
            Some(LooseAmount::Num(n)) => Some(*n),
            Some(LooseAmount::Text(s)) => s.trim().trim_start_matches('$').parse().ok(),
            None => None,
        }
    }

    /// A record with no usable field at all carries no transaction
    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.description.is_none() && self.amount.is_none()
    }
}

/// Extract the JSON array span from `reply` and return its elements.
/// Returns an empty list on a missing bracket pair, a decode error, or a
/// non-array payload; the caller treats that as "no transactions found".
pub fn parse_reply(reply: &str) -> Vec<Value> {
    let (start, end) = match (reply.find('['), reply.rfind(']')) {
        (Some(s), Some(e)) if s < e => (s, e),
        _ => {
            log::warn!("LLM reply contained no JSON array span");
            return Vec::new();
        }
    };

    let span = &reply[start..=end];
    match serde_json::from_str::<Value>(span) {
        Ok(Value::Array(items)) => items,
        Ok(other) => {
            log::warn!("LLM reply span was not an array: {}", type_name(&other));
            Vec::new()
        }
        Err(err) => {
            log::warn!("failed to decode LLM reply span: {err}");
            Vec::new()
        }
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_embedded_in_prose() {
        let reply = r#"Sure! Here are the transactions I found:
[{"date":"2024-01-05","description":"Coffee","amount":4.50,"transaction_type":"expense","category":"Food & Dining"}]
Let me know if you need anything else."#;
        let items = parse_reply(reply);
        assert_eq!(items.len(), 1);
        let rec: RawRecord = serde_json::from_value(items[0].clone()).unwrap();
        assert_eq!(rec.date.as_deref(), Some("2024-01-05"));
        assert_eq!(rec.description.as_deref(), Some("Coffee"));
        assert_eq!(rec.amount_f64(), Some(4.5));
        assert_eq!(rec.transaction_type.as_deref(), Some("expense"));
    }

    #[test]
    fn test_bare_array() {
        let items = parse_reply(r#"[{"description":"Rent","amount":"1200.00"}]"#);
        assert_eq!(items.len(), 1);
        let rec: RawRecord = serde_json::from_value(items[0].clone()).unwrap();
        assert_eq!(rec.amount_f64(), Some(1200.0));
    }

    #[test]
    fn test_no_brackets_yields_empty() {
        assert!(parse_reply("I could not find any transactions.").is_empty());
    }

    #[test]
    fn test_reversed_brackets_yield_empty() {
        assert!(parse_reply("] nonsense [").is_empty());
    }

    #[test]
    fn test_non_array_json_yields_empty() {
        // first [ .. last ] spans a non-array payload
        assert!(parse_reply(r#"{"items": [1]} trailing ]"#).is_empty());
    }

    #[test]
    fn test_malformed_json_yields_empty() {
        assert!(parse_reply(r#"[{"date": }]"#).is_empty());
    }

    #[test]
    fn test_dollar_string_amount() {
        let rec = RawRecord {
            amount: Some(LooseAmount::Text("$42.10".to_string())),
            ..Default::default()
        };
        assert_eq!(rec.amount_f64(), Some(42.10));
    }
}
