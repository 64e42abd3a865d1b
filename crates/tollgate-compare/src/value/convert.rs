//! Value conversion to declared data types.
//!
//! `convert` is the entry point used by `dataType` predicates. It never
//! raises: a value that cannot be coerced comes back as `Conversion::Failed`
//! and the reason is logged at debug level.

use super::{Certificate, DataType, Element, Message, Value};
use crate::error::ConversionError;
use base64::Engine as _;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::debug;

/// Result of coercing a value to a declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum Conversion {
    /// The value, in (or already of) the target type
    Converted(Value),
    /// The value cannot be coerced; no partial output exists
    Failed,
}

impl Conversion {
    pub fn is_failed(&self) -> bool {
        matches!(self, Conversion::Failed)
    }

    pub fn into_option(self) -> Option<Value> {
        match self {
            Conversion::Converted(value) => Some(value),
            Conversion::Failed => None,
        }
    }
}

/// Coerce `value` to `target`.
///
/// A value that already satisfies `target` is returned unchanged.
pub fn convert(value: &Value, target: DataType) -> Conversion {
    match try_convert(value, target) {
        Ok(converted) => Conversion::Converted(converted),
        Err(e) => {
            debug!(
                from = value.type_name(),
                to = %target,
                error = %e,
                "Value cannot be converted"
            );
            Conversion::Failed
        }
    }
}

/// Coerce `value` to `target`, reporting why it failed.
pub(crate) fn try_convert(value: &Value, target: DataType) -> Result<Value, ConversionError> {
    if target.accepts(value) {
        return Ok(value.clone());
    }

    match target {
        DataType::String => Ok(Value::String(value.to_string())),
        DataType::Integer => to_integer(value),
        DataType::Decimal => to_decimal(value),
        DataType::Float => to_float(value),
        DataType::Boolean => to_boolean(value),
        DataType::DateTime => to_date_time(value),
        DataType::Certificate => to_certificate(value),
        DataType::Element => to_element(value),
        DataType::Message => to_message(value),
    }
}

fn unparseable(target: DataType, value: &str) -> ConversionError {
    ConversionError::Unparseable {
        data_type: target,
        value: value.to_string(),
    }
}

fn unsupported(value: &Value, target: DataType) -> ConversionError {
    ConversionError::Unsupported {
        from: value.type_name(),
        to: target,
    }
}

/// Text a textual source value carries, if it is one.
fn source_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Message(m) => Some(m.text()),
        _ => None,
    }
}

fn to_integer(value: &Value) -> Result<Value, ConversionError> {
    match value {
        Value::Decimal(d) if d.fract().is_zero() => d
            .to_i64()
            .map(Value::Integer)
            .ok_or_else(|| unparseable(DataType::Integer, &d.to_string())),
        Value::Float(x) if x.is_finite() && x.fract() == 0.0 => {
            // i64::MAX is not exactly representable; the bound is the next power of two
            if *x >= -9_223_372_036_854_775_808.0 && *x < 9_223_372_036_854_775_808.0 {
                Ok(Value::Integer(*x as i64))
            } else {
                Err(unparseable(DataType::Integer, &x.to_string()))
            }
        }
        Value::Decimal(d) => Err(unparseable(DataType::Integer, &d.to_string())),
        Value::Float(x) => Err(unparseable(DataType::Integer, &x.to_string())),
        other => {
            let text = source_text(other).ok_or_else(|| unsupported(other, DataType::Integer))?;
            text.trim()
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| unparseable(DataType::Integer, &text))
        }
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

fn to_decimal(value: &Value) -> Result<Value, ConversionError> {
    match value {
        Value::Integer(i) => Ok(Value::Decimal(Decimal::from(*i))),
        Value::Float(x) => Decimal::try_from(*x)
            .map(Value::Decimal)
            .map_err(|_| unparseable(DataType::Decimal, &x.to_string())),
        other => {
            let text = source_text(other).ok_or_else(|| unsupported(other, DataType::Decimal))?;
            parse_decimal(&text)
                .map(Value::Decimal)
                .ok_or_else(|| unparseable(DataType::Decimal, &text))
        }
    }
}

fn to_float(value: &Value) -> Result<Value, ConversionError> {
    match value {
        Value::Integer(i) => Ok(Value::Float(*i as f64)),
        Value::Decimal(d) => d
            .to_f64()
            .map(Value::Float)
            .ok_or_else(|| unparseable(DataType::Float, &d.to_string())),
        other => {
            let text = source_text(other).ok_or_else(|| unsupported(other, DataType::Float))?;
            text.trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| unparseable(DataType::Float, &text))
        }
    }
}

fn to_boolean(value: &Value) -> Result<Value, ConversionError> {
    let text = source_text(value).ok_or_else(|| unsupported(value, DataType::Boolean))?;
    let trimmed = text.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Ok(Value::Boolean(true))
    } else if trimmed.eq_ignore_ascii_case("false") {
        Ok(Value::Boolean(false))
    } else {
        Err(unparseable(DataType::Boolean, &text))
    }
}

/// Naive date-time layouts tried after RFC 3339 and RFC 2822; all read as UTC.
const NAIVE_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

fn parse_date_time(text: &str) -> Option<DateTime<Utc>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    // Bare digits are milliseconds since the epoch
    if trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return trimmed
            .parse::<i64>()
            .ok()
            .and_then(DateTime::from_timestamp_millis);
    }
    None
}

fn to_date_time(value: &Value) -> Result<Value, ConversionError> {
    match value {
        Value::Integer(millis) => DateTime::from_timestamp_millis(*millis)
            .map(Value::DateTime)
            .ok_or_else(|| unparseable(DataType::DateTime, &millis.to_string())),
        other => {
            let text = source_text(other).ok_or_else(|| unsupported(other, DataType::DateTime))?;
            parse_date_time(&text)
                .map(Value::DateTime)
                .ok_or_else(|| unparseable(DataType::DateTime, &text))
        }
    }
}

fn to_certificate(value: &Value) -> Result<Value, ConversionError> {
    let text = source_text(value).ok_or_else(|| unsupported(value, DataType::Certificate))?;
    // Accept PEM armor or a bare base64 body
    let body: String = text
        .lines()
        .filter(|line| !line.trim_start().starts_with("-----"))
        .flat_map(|line| line.chars().filter(|c| !c.is_whitespace()))
        .collect();

    match base64::engine::general_purpose::STANDARD.decode(body.as_bytes()) {
        Ok(der) if !der.is_empty() => Ok(Value::Certificate(Certificate::from_der(der))),
        _ => Err(unparseable(DataType::Certificate, &text)),
    }
}

fn parse_element(xml: &str) -> Option<Element> {
    use sxd_document::dom::ChildOfRoot;
    use sxd_document::parser;

    let package = parser::parse(xml).ok()?;
    let document = package.as_document();
    let name = document.root().children().into_iter().find_map(|child| match child {
        ChildOfRoot::Element(element) => Some(element.name().local_part().to_string()),
        _ => None,
    })?;

    Some(Element {
        name,
        xml: xml.trim().to_string(),
    })
}

fn to_element(value: &Value) -> Result<Value, ConversionError> {
    match value {
        Value::Message(message) if !message.is_xml() => Err(unsupported(value, DataType::Element)),
        other => {
            let text = source_text(other).ok_or_else(|| unsupported(other, DataType::Element))?;
            parse_element(&text)
                .map(Value::Element)
                .ok_or_else(|| unparseable(DataType::Element, &text))
        }
    }
}

fn to_message(value: &Value) -> Result<Value, ConversionError> {
    match value {
        Value::String(s) => Ok(Value::Message(Message::new(
            "text/plain; charset=utf-8",
            s.as_bytes().to_vec(),
        ))),
        Value::Element(element) => Ok(Value::Message(Message::new(
            "text/xml; charset=utf-8",
            element.xml.as_bytes().to_vec(),
        ))),
        other => Err(unsupported(other, DataType::Message)),
    }
}
