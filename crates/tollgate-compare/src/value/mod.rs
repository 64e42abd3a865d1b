//! Runtime values and declared data types.
//!
//! A `Value` is whatever a context variable holds at request time. Absence
//! (`null`) is modeled as `Option::None` by callers, never as a variant here.

pub(crate) mod convert;

pub use convert::{convert, Conversion};

use base64::Engine as _;
use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A runtime value bound to a context variable.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Decimal(Decimal),
    Float(f64),
    Boolean(bool),
    DateTime(DateTime<Utc>),
    Certificate(Certificate),
    Element(Element),
    Message(Message),
    /// Multi-valued variable (array or collection).
    List(Vec<Value>),
}

impl Value {
    /// Short name of the runtime type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Integer(_) => "integer",
            Value::Decimal(_) => "decimal",
            Value::Float(_) => "float",
            Value::Boolean(_) => "boolean",
            Value::DateTime(_) => "dateTime",
            Value::Certificate(_) => "certificate",
            Value::Element(_) => "element",
            Value::Message(_) => "message",
            Value::List(_) => "list",
        }
    }

    /// Whether the value carries a native ordering.
    ///
    /// Values that are not comparable take part in binary comparisons
    /// through their string form.
    pub fn is_comparable(&self) -> bool {
        matches!(
            self,
            Value::String(_)
                | Value::Integer(_)
                | Value::Decimal(_)
                | Value::Float(_)
                | Value::Boolean(_)
                | Value::DateTime(_)
        )
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    /// The declared type this value already satisfies, if any.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::String(_) => Some(DataType::String),
            Value::Integer(_) => Some(DataType::Integer),
            Value::Decimal(_) => Some(DataType::Decimal),
            Value::Float(_) => Some(DataType::Float),
            Value::Boolean(_) => Some(DataType::Boolean),
            Value::DateTime(_) => Some(DataType::DateTime),
            Value::Certificate(_) => Some(DataType::Certificate),
            Value::Element(_) => Some(DataType::Element),
            Value::Message(_) => Some(DataType::Message),
            Value::List(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::DateTime(dt) => f.write_str(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Value::Certificate(cert) => write!(f, "{cert}"),
            Value::Element(element) => f.write_str(&element.xml),
            Value::Message(message) => f.write_str(&message.text()),
            Value::List(values) => {
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Value::Decimal(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::DateTime(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }
}

/// Declared data type a `dataType` predicate coerces values to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DataType {
    String,
    Integer,
    Decimal,
    Float,
    Boolean,
    DateTime,
    Certificate,
    Element,
    Message,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Integer => "integer",
            DataType::Decimal => "decimal",
            DataType::Float => "float",
            DataType::Boolean => "boolean",
            DataType::DateTime => "dateTime",
            DataType::Certificate => "certificate",
            DataType::Element => "element",
            DataType::Message => "message",
        }
    }

    /// Whether `value` already satisfies this type without conversion.
    pub fn accepts(&self, value: &Value) -> bool {
        value.data_type() == Some(*self)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An X.509 certificate held as DER bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pub der: Vec<u8>,
}

impl Certificate {
    pub fn from_der(der: impl Into<Vec<u8>>) -> Self {
        Self { der: der.into() }
    }
}

impl fmt::Display for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.der);
        writeln!(f, "-----BEGIN CERTIFICATE-----")?;
        // PEM bodies wrap at 64 columns; base64 output is ASCII so byte chunks are safe
        for line in encoded.as_bytes().chunks(64) {
            writeln!(f, "{}", String::from_utf8_lossy(line))?;
        }
        write!(f, "-----END CERTIFICATE-----")
    }
}

/// A well-formed XML element, kept as its source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Local name of the element
    pub name: String,
    /// Serialized XML
    pub xml: String,
}

/// A message payload with its content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub content_type: String,
    pub body: Vec<u8>,
}

impl Message {
    pub fn new(content_type: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            content_type: content_type.into(),
            body: body.into(),
        }
    }

    /// Body decoded as text (lossy UTF-8).
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Whether the content type declares an XML payload.
    pub fn is_xml(&self) -> bool {
        let ct = self.content_type.to_ascii_lowercase();
        ct.starts_with("text/xml") || ct.starts_with("application/xml") || ct.contains("+xml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_value_display() {
        assert_eq!(Value::from("abc").to_string(), "abc");
        assert_eq!(Value::Integer(42).to_string(), "42");
        assert_eq!(Value::Boolean(false).to_string(), "false");
        assert_eq!(
            Value::from(vec!["bar", "baz"]).to_string(),
            "bar, baz",
            "lists join with the default delimiter"
        );

        let dt = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(Value::DateTime(dt).to_string(), "2024-03-01T12:30:00Z");
    }

    #[test]
    fn test_comparable_kinds() {
        assert!(Value::from("x").is_comparable());
        assert!(Value::Integer(1).is_comparable());
        assert!(Value::Float(1.5).is_comparable());
        assert!(!Value::Message(Message::new("text/plain", "hi")).is_comparable());
        assert!(!Value::Certificate(Certificate::from_der(vec![1, 2, 3])).is_comparable());
        assert!(!Value::from(vec![1i64, 2]).is_comparable());
    }

    #[test]
    fn test_data_type_accepts() {
        assert!(DataType::Integer.accepts(&Value::Integer(5)));
        assert!(!DataType::Integer.accepts(&Value::from("5")));
        assert!(DataType::String.accepts(&Value::from("5")));
        assert!(!DataType::String.accepts(&Value::from(vec!["5"])));
    }

    #[test]
    fn test_data_type_serde() {
        let dt: DataType = serde_json::from_str(r#""dateTime""#).unwrap();
        assert_eq!(dt, DataType::DateTime);
        assert_eq!(serde_json::to_string(&DataType::Integer).unwrap(), r#""integer""#);
    }

    #[test]
    fn test_certificate_pem_wrapping() {
        let cert = Certificate::from_der(vec![0u8; 96]);
        let pem = cert.to_string();
        let lines: Vec<&str> = pem.lines().collect();
        assert_eq!(lines.first(), Some(&"-----BEGIN CERTIFICATE-----"));
        assert_eq!(lines.last(), Some(&"-----END CERTIFICATE-----"));
        assert_eq!(lines[1].len(), 64);
        assert_eq!(lines[2].len(), 64);
    }

    #[test]
    fn test_message_is_xml() {
        assert!(Message::new("text/xml; charset=utf-8", "<a/>").is_xml());
        assert!(Message::new("application/soap+xml", "<a/>").is_xml());
        assert!(!Message::new("application/json", "{}").is_xml());
    }
}
