use chrono::{DateTime, Duration, FixedOffset};
use serde_json::{Map, Number, Value};

/// Normalized attributes of one directory object.  Names keep the case the
/// source reported them with; lookups that need to be case-insensitive (like
/// property search) do their own folding.
pub type AttributeMap = Map<String, Value>;

/// Timestamps are rendered in the offset they were reported with.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The closed set of value kinds a directory source can hand us.  Everything
/// the persisted document contains has passed through `normalize_value`.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Bytes(Vec<u8>),
    Timestamp(DateTime<FixedOffset>),
    Duration(Duration),
    Sequence(Vec<SourceValue>),
}

impl From<&str> for SourceValue {
    fn from(s: &str) -> Self {
        SourceValue::String(s.to_string())
    }
}

impl From<String> for SourceValue {
    fn from(s: String) -> Self {
        SourceValue::String(s)
    }
}

impl From<i64> for SourceValue {
    fn from(i: i64) -> Self {
        SourceValue::Integer(i)
    }
}

impl From<Vec<u8>> for SourceValue {
    fn from(bytes: Vec<u8>) -> Self {
        SourceValue::Bytes(bytes)
    }
}

/// Textual form of a byte buffer.  Buffers that happen to be UTF-8 are used
/// as-is, anything else is escaped byte by byte (`\x01`, `\n`, ...).
pub fn bytes_to_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes
            .iter()
            .flat_map(|b| std::ascii::escape_default(*b))
            .map(char::from)
            .collect(),
    }
}

/// Convert one source value into its JSON-safe representation.
///
/// Sequences are normalized element by element and never flattened, so a
/// sequence nested in a sequence stays nested.
pub fn normalize_value(value: SourceValue) -> Value {
    match value {
        SourceValue::String(s) => Value::String(s),
        SourceValue::Integer(i) => Value::Number(i.into()),
        SourceValue::Float(f) => match Number::from_f64(f) {
            Some(n) => Value::Number(n),
            // NaN and the infinities have no JSON number form.
            None => Value::String(f.to_string()),
        },
        SourceValue::Boolean(b) => Value::Bool(b),
        SourceValue::Bytes(bytes) => Value::String(bytes_to_text(&bytes)),
        SourceValue::Timestamp(ts) => Value::String(ts.format(TIMESTAMP_FORMAT).to_string()),
        // Total whole seconds.
        SourceValue::Duration(d) => Value::Number(d.num_seconds().into()),
        SourceValue::Sequence(items) => {
            Value::Array(items.into_iter().map(normalize_value).collect())
        }
    }
}

/// Normalize every value of a record into an `AttributeMap`.
pub fn normalize_attributes<I>(attributes: I) -> AttributeMap
where
    I: IntoIterator<Item = (String, SourceValue)>,
{
    attributes
        .into_iter()
        .map(|(name, value)| (name, normalize_value(value)))
        .collect()
}

/// The string form used both for display and for value matching.  Strings
/// are bare, everything else is compact JSON.
pub fn value_as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn is_json_safe(value: &Value) -> bool {
        match value {
            Value::String(_) | Value::Number(_) | Value::Bool(_) => true,
            Value::Array(items) => items.iter().all(is_json_safe),
            _ => false,
        }
    }

    #[test]
    fn timestamps_keep_their_offset() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let ts = offset.with_ymd_and_hms(2021, 12, 22, 10, 30, 5).unwrap();
        assert_eq!(
            normalize_value(SourceValue::Timestamp(ts)),
            json!("2021-12-22 10:30:05")
        );
    }

    #[test]
    fn durations_become_seconds() {
        let d = Duration::minutes(30);
        assert_eq!(normalize_value(SourceValue::Duration(d)), json!(1800));
        let d = Duration::days(42);
        assert_eq!(normalize_value(SourceValue::Duration(d)), json!(3628800));
    }

    #[test]
    fn bytes_become_text() {
        assert_eq!(
            normalize_value(SourceValue::Bytes(b"plain".to_vec())),
            json!("plain")
        );
        assert_eq!(
            normalize_value(SourceValue::Bytes(vec![0x01, 0xff, b'a'])),
            json!("\\x01\\xffa")
        );
    }

    #[test]
    fn sequences_are_normalized_per_element_in_order() {
        let ts = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2020, 1, 2, 3, 4, 5)
            .unwrap();
        let value = SourceValue::Sequence(vec![
            SourceValue::Bytes(vec![0xfe]),
            SourceValue::Timestamp(ts),
            SourceValue::Duration(Duration::seconds(90)),
            SourceValue::Integer(7),
            SourceValue::Sequence(vec!["nested".into()]),
        ]);
        assert_eq!(
            normalize_value(value),
            json!(["\\xfe", "2020-01-02 03:04:05", 90, 7, ["nested"]])
        );
    }

    #[test]
    fn scalars_pass_through() {
        assert_eq!(normalize_value(SourceValue::Integer(-3)), json!(-3));
        assert_eq!(normalize_value(SourceValue::Boolean(true)), json!(true));
        assert_eq!(normalize_value(SourceValue::Float(1.5)), json!(1.5));
        assert_eq!(normalize_value(SourceValue::Float(f64::NAN)), json!("NaN"));
        assert_eq!(normalize_value("x".into()), json!("x"));
    }

    #[test]
    fn normalized_records_are_json_safe() {
        let attrs = normalize_attributes(vec![
            ("objectGUID".to_string(), SourceValue::Bytes(vec![0x9f, 0x00])),
            (
                "whenCreated".to_string(),
                SourceValue::Timestamp(
                    FixedOffset::west_opt(5 * 3600)
                        .unwrap()
                        .with_ymd_and_hms(2019, 6, 1, 0, 0, 0)
                        .unwrap(),
                ),
            ),
            (
                "memberOf".to_string(),
                SourceValue::Sequence(vec!["CN=a".into(), SourceValue::Bytes(vec![1])]),
            ),
            ("maxPwdAge".to_string(), SourceValue::Duration(Duration::days(1))),
        ]);
        assert_eq!(attrs.len(), 4);
        assert!(attrs.values().all(is_json_safe));
    }

    #[test]
    fn text_form_of_values() {
        assert_eq!(value_as_text(&json!("alice")), "alice");
        assert_eq!(value_as_text(&json!(512)), "512");
        assert_eq!(value_as_text(&json!(["a", 1])), r#"["a",1]"#);
    }
}
