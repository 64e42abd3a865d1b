//! Context variable bindings and `${...}` expression expansion.
//!
//! # Reference Syntax
//!
//! - `${name}` - value of a variable (names are case-insensitive, may contain dots)
//! - `${ name }` - surrounding whitespace is ignored
//! - `${name[1]}` - element of a multi-valued variable (0-based)
//! - `${name.length}` - number of values (1 for a single value)
//! - `${name|; }` - multi-valued variable joined with a custom delimiter
//!
//! An unterminated `${` is kept as literal text.
//!
//! # Example
//!
//! ```
//! use tollgate_compare::config::EngineOptions;
//! use tollgate_compare::value::Value;
//! use tollgate_compare::variables::{expand, VariableBindings};
//!
//! let mut vars = VariableBindings::new();
//! vars.insert("request.user", Value::from("alice"));
//! let text = expand("user=${request.user}", &vars, &EngineOptions::default()).unwrap();
//! assert_eq!(text, "user=alice");
//! ```

use crate::config::EngineOptions;
use crate::error::VariableError;
use crate::value::Value;
use regex::Regex;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::warn;

/// Regex for matching variable references: ${name}, ${name[0]}, ${name|, }
static REFERENCE_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_reference_regex() -> &'static Regex {
    REFERENCE_REGEX.get_or_init(|| Regex::new(r"\$\{([^}]*)\}").expect("reference regex is valid"))
}

const LENGTH_SUFFIX: &str = ".length";

/// Named values supplied by the surrounding request-processing system.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableBindings {
    values: HashMap<String, Value>,
}

impl VariableBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` (case-insensitive) to `value`, replacing any previous binding.
    pub fn insert(&mut self, name: &str, value: impl Into<Value>) {
        self.values.insert(name.to_lowercase(), value.into());
    }

    /// Builder form of `insert`.
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(&name.to_lowercase())
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.remove(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Build bindings from a JSON object.
    ///
    /// Nested objects flatten into dotted names; `null` members stay unbound.
    pub fn from_json(json: &serde_json::Value) -> Option<Self> {
        let object = json.as_object()?;
        let mut bindings = Self::new();
        for (name, member) in object {
            bindings.bind_json(name, member);
        }
        Some(bindings)
    }

    fn bind_json(&mut self, name: &str, json: &serde_json::Value) {
        match json {
            serde_json::Value::Object(members) => {
                for (child, member) in members {
                    self.bind_json(&format!("{name}.{child}"), member);
                }
            }
            other => {
                if let Some(value) = json_to_value(other) {
                    self.insert(name, value);
                }
            }
        }
    }
}

impl<S: AsRef<str>, V: Into<Value>> FromIterator<(S, V)> for VariableBindings {
    fn from_iter<I: IntoIterator<Item = (S, V)>>(iter: I) -> Self {
        let mut bindings = Self::new();
        for (name, value) in iter {
            bindings.insert(name.as_ref(), value);
        }
        bindings
    }
}

fn json_to_value(json: &serde_json::Value) -> Option<Value> {
    match json {
        serde_json::Value::Null => None,
        serde_json::Value::Bool(b) => Some(Value::Boolean(*b)),
        serde_json::Value::String(s) => Some(Value::String(s.clone())),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Some(Value::Integer(i)),
            None => {
                let text = n.to_string();
                match Decimal::from_str(&text) {
                    Ok(d) => Some(Value::Decimal(d)),
                    Err(_) => n.as_f64().map(Value::Float),
                }
            }
        },
        serde_json::Value::Array(items) => Some(Value::List(
            items
                .iter()
                // null elements keep their slot
                .map(|item| json_to_value(item).unwrap_or_else(|| Value::String(String::new())))
                .collect(),
        )),
        // Objects inside arrays have no dotted name to flatten into
        serde_json::Value::Object(_) => Some(Value::String(json.to_string())),
    }
}

/// A parsed `${...}` reference body.
#[derive(Debug, PartialEq)]
struct Reference<'e> {
    name: &'e str,
    subscript: Option<&'e str>,
    delimiter: Option<&'e str>,
}

impl<'e> Reference<'e> {
    fn parse(body: &'e str) -> Self {
        let (target, delimiter) = match body.split_once('|') {
            Some((target, delimiter)) => (target, Some(delimiter)),
            None => (body, None),
        };
        let target = target.trim();

        let (name, subscript) = match target.strip_suffix(']').and_then(|t| t.split_once('[')) {
            Some((name, subscript)) => (name.trim(), Some(subscript.trim())),
            None => (target, None),
        };

        Reference {
            name,
            subscript,
            delimiter,
        }
    }

    /// Look the reference up; `Ok(None)` when nothing is bound under it.
    fn lookup(
        &self,
        bindings: &VariableBindings,
        options: &EngineOptions,
    ) -> Result<Option<Value>, VariableError> {
        let value = match bindings.get(self.name) {
            Some(value) => value.clone(),
            None => match length_of(self.name, bindings) {
                Some(length) => length,
                None => return Ok(None),
            },
        };

        let Some(subscript) = self.subscript else {
            return Ok(Some(value));
        };

        let index: usize = subscript
            .parse()
            .map_err(|_| VariableError::InvalidSubscript {
                name: self.name.to_string(),
                subscript: subscript.to_string(),
            })?;

        let selected = match value {
            Value::List(mut items) if index < items.len() => Some(items.swap_remove(index)),
            Value::List(items) => return out_of_range(self.name, index, items.len(), options),
            scalar if index == 0 => Some(scalar),
            _ => return out_of_range(self.name, index, 1, options),
        };
        Ok(selected)
    }
}

fn length_of(name: &str, bindings: &VariableBindings) -> Option<Value> {
    let split = name.len().checked_sub(LENGTH_SUFFIX.len())?;
    let (base, suffix) = (name.get(..split)?, name.get(split..)?);
    if !suffix.eq_ignore_ascii_case(LENGTH_SUFFIX) {
        return None;
    }
    let len = match bindings.get(base)? {
        Value::List(items) => items.len(),
        _ => 1,
    };
    Some(Value::Integer(len as i64))
}

fn out_of_range(
    name: &str,
    index: usize,
    len: usize,
    options: &EngineOptions,
) -> Result<Option<Value>, VariableError> {
    if options.strict_variables {
        return Err(VariableError::IndexOutOfRange {
            name: name.to_string(),
            index,
            len,
        });
    }
    warn!(variable = name, index, len, "Subscript out of range");
    Ok(None)
}

/// Resolve an expression to a single value.
///
/// An expression that is exactly one reference yields the referenced value
/// with its type intact (`None` when unbound). Anything else is interpolated
/// into a string.
pub fn resolve(
    expression: &str,
    bindings: &VariableBindings,
    options: &EngineOptions,
) -> Result<Option<Value>, VariableError> {
    let trimmed = expression.trim();
    if let Some(captures) = get_reference_regex().captures(trimmed) {
        let whole = captures.get(0).map(|m| m.range());
        if whole == Some(0..trimmed.len()) {
            let body = captures.get(1).map_or("", |m| m.as_str());
            return Reference::parse(body).lookup(bindings, options);
        }
    }
    expand(expression, bindings, options).map(|text| Some(Value::String(text)))
}

/// Interpolate every reference in `expression` as text.
pub fn expand(
    expression: &str,
    bindings: &VariableBindings,
    options: &EngineOptions,
) -> Result<String, VariableError> {
    let regex = get_reference_regex();
    let mut output = String::with_capacity(expression.len());
    let mut last = 0;

    for captures in regex.captures_iter(expression) {
        let (Some(whole), Some(body)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        output.push_str(&expression[last..whole.start()]);
        last = whole.end();

        let reference = Reference::parse(body.as_str());
        match reference.lookup(bindings, options)? {
            Some(value) => {
                let delimiter = reference
                    .delimiter
                    .unwrap_or(options.multivalue_delimiter.as_str());
                render(&value, delimiter, &mut output);
            }
            // Bound but subscripted out of range; already reported by lookup
            None if bindings.get(reference.name).is_some() => {}
            None => {
                if options.strict_variables {
                    return Err(VariableError::Unbound(reference.name.to_string()));
                }
                warn!(variable = reference.name, "No such variable");
            }
        }
    }

    output.push_str(&expression[last..]);
    Ok(output)
}

fn render(value: &Value, delimiter: &str, output: &mut String) {
    match value {
        Value::List(items) => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    output.push_str(delimiter);
                }
                output.push_str(&item.to_string());
            }
        }
        scalar => output.push_str(&scalar.to_string()),
    }
}
