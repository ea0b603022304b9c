//! # Typed Request Parameters
//!
//! Filter and create parameters travel as `name::type=value` pairs, both in the
//! URL query string and in the request body. This module turns such a pair into
//! a [`RestApiParameter`] holding a typed [`ParamValue`], and formats a typed
//! value back into its string pair.
//!
//! ```rust
//! use ezi::params::{ParamValue, RestApiParameter};
//!
//! let param = RestApiParameter::parse("age::int", "21").unwrap();
//! assert_eq!(param.key_value(), ("age", &ParamValue::Int(21)));
//! assert_eq!(param.format(), ("age::int".to_string(), "21".to_string()));
//! ```
//!
//! ## Supported types
//!
//! | tag    | value                                        |
//! |--------|----------------------------------------------|
//! | `int`  | integer                                      |
//! | `str`  | string, taken verbatim                       |
//! | `bool` | integer, `true` when greater than zero       |
//! | `date` | `dd/mm/YYYY HH:MM`                           |
//! | `fk`   | integer primary key of the referenced row    |
//! | `fl`   | floating point number                        |

use chrono::NaiveDateTime;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Separates the field name from the type tag in a parameter key.
pub const NAME_TYPE_DELIMITER: &str = "::";

/// Format of `date` parameter values.
pub const DATE_FORMAT: &str = "%d/%m/%Y %H:%M";

/// ISO 8601 form of a `date` value in JSON.
pub const JSON_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Errors raised while parsing parameters or applying them to a model.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParamError {
    #[error(
        "Error on GET parameter key: {key}. The key must be in the format 'name::type' where type is one of ['int', 'str', 'bool', 'date', 'fk', 'fl']."
    )]
    BadKeyFormat { key: String },

    #[error("Error on parameter {key}: cannot convert '{value}' to {param_type} ({reason})")]
    BadValue {
        key: String,
        value: String,
        param_type: ParamType,
        reason: String,
    },

    #[error("Cannot resolve keyword '{field}' into a field of {model}")]
    UnknownField { model: String, field: String },

    #[error("Lookup '{lookup}' on '{field}' does not accept a value of type {param_type}")]
    LookupTypeMismatch {
        field: String,
        lookup: String,
        param_type: ParamType,
    },

    #[error("Value of type {param_type} does not fit column '{field}' of {model}")]
    ColumnTypeMismatch {
        model: String,
        field: String,
        param_type: ParamType,
    },
}

/// A type tag outside [`ParamType::ALL`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown parameter type '{0}'")]
pub struct UnknownParamType(pub String);

/// The six type tags a parameter key may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    Int,
    Str,
    Bool,
    Date,
    Fk,
    Fl,
}

impl ParamType {
    pub const ALL: [ParamType; 6] = [
        ParamType::Int,
        ParamType::Str,
        ParamType::Bool,
        ParamType::Date,
        ParamType::Fk,
        ParamType::Fl,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ParamType::Int => "int",
            ParamType::Str => "str",
            ParamType::Bool => "bool",
            ParamType::Date => "date",
            ParamType::Fk => "fk",
            ParamType::Fl => "fl",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamType {
    type Err = UnknownParamType;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        ParamType::ALL
            .into_iter()
            .find(|param_type| param_type.as_str() == tag)
            .ok_or_else(|| UnknownParamType(tag.to_string()))
    }
}

/// A parameter value whose variant is its type tag.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Int(i64),
    Str(String),
    Bool(bool),
    Date(NaiveDateTime),
    Fk(i64),
    Fl(f64),
}

impl ParamValue {
    /// Wraps the primary key of a referenced row.
    #[must_use]
    pub const fn foreign_key(pk: i64) -> Self {
        ParamValue::Fk(pk)
    }

    #[must_use]
    pub const fn param_type(&self) -> ParamType {
        match self {
            ParamValue::Int(_) => ParamType::Int,
            ParamValue::Str(_) => ParamType::Str,
            ParamValue::Bool(_) => ParamType::Bool,
            ParamValue::Date(_) => ParamType::Date,
            ParamValue::Fk(_) => ParamType::Fk,
            ParamValue::Fl(_) => ParamType::Fl,
        }
    }

    /// Converts a raw string according to `param_type`.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::BadValue`] when the string cannot be converted.
    pub fn parse_as(param_type: ParamType, key: &str, raw: &str) -> Result<Self, ParamError> {
        let bad_value = |reason: String| ParamError::BadValue {
            key: key.to_string(),
            value: raw.to_string(),
            param_type,
            reason,
        };

        let value = match param_type {
            ParamType::Int => ParamValue::Int(
                raw.trim()
                    .parse::<i64>()
                    .map_err(|e| bad_value(e.to_string()))?,
            ),
            ParamType::Str => ParamValue::Str(raw.to_string()),
            // 0 is false, anything above it is true
            ParamType::Bool => ParamValue::Bool(
                raw.trim()
                    .parse::<i64>()
                    .map_err(|e| bad_value(e.to_string()))?
                    > 0,
            ),
            ParamType::Date => ParamValue::Date(
                NaiveDateTime::parse_from_str(raw.trim(), DATE_FORMAT)
                    .map_err(|e| bad_value(e.to_string()))?,
            ),
            ParamType::Fk => ParamValue::Fk(
                raw.trim()
                    .parse::<i64>()
                    .map_err(|e| bad_value(e.to_string()))?,
            ),
            ParamType::Fl => ParamValue::Fl(
                raw.trim()
                    .parse::<f64>()
                    .map_err(|e| bad_value(e.to_string()))?,
            ),
        };
        Ok(value)
    }

    /// String form that [`ParamValue::parse_as`] converts back to `self`.
    #[must_use]
    pub fn format(&self) -> String {
        match self {
            ParamValue::Int(value) | ParamValue::Fk(value) => value.to_string(),
            ParamValue::Str(value) => value.clone(),
            ParamValue::Bool(value) => i32::from(*value).to_string(),
            ParamValue::Date(value) => value.format(DATE_FORMAT).to_string(),
            ParamValue::Fl(value) => value.to_string(),
        }
    }

    /// JSON form used when the value populates a new row.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ParamValue::Int(value) | ParamValue::Fk(value) => serde_json::Value::from(*value),
            ParamValue::Str(value) => serde_json::Value::from(value.clone()),
            ParamValue::Bool(value) => serde_json::Value::from(*value),
            ParamValue::Date(value) => {
                serde_json::Value::String(value.format(JSON_DATE_FORMAT).to_string())
            }
            ParamValue::Fl(value) => serde_json::Value::from(*value),
        }
    }
}

impl From<ParamValue> for sea_orm::Value {
    fn from(value: ParamValue) -> Self {
        match value {
            ParamValue::Int(value) | ParamValue::Fk(value) => value.into(),
            ParamValue::Str(value) => value.into(),
            ParamValue::Bool(value) => value.into(),
            ParamValue::Date(value) => value.into(),
            ParamValue::Fl(value) => value.into(),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(i64::from(value))
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Fl(value)
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<NaiveDateTime> for ParamValue {
    fn from(value: NaiveDateTime) -> Self {
        ParamValue::Date(value)
    }
}

/// A single `name::type=value` parameter with its value already converted.
#[derive(Debug, Clone, PartialEq)]
pub struct RestApiParameter {
    name: String,
    value: ParamValue,
}

impl RestApiParameter {
    /// Parses a `name::type` key and its raw value.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::BadKeyFormat`] if the key does not split into
    /// exactly two non-empty parts or names an unknown type, and
    /// [`ParamError::BadValue`] if the value does not convert.
    pub fn parse(key: &str, raw_value: &str) -> Result<Self, ParamError> {
        let (name, param_type) = split_key(key)?;
        let value = ParamValue::parse_as(param_type, key, raw_value)?;
        Ok(Self {
            name: name.to_string(),
            value,
        })
    }

    /// Builds a parameter from an already typed value. The type tag follows the value.
    pub fn from_value(name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn value(&self) -> &ParamValue {
        &self.value
    }

    #[must_use]
    pub const fn param_type(&self) -> ParamType {
        self.value.param_type()
    }

    /// The `("name::type", "value")` pair, ready to be sent as a GET parameter.
    #[must_use]
    pub fn format(&self) -> (String, String) {
        (
            format!("{}{NAME_TYPE_DELIMITER}{}", self.name, self.param_type()),
            self.value.format(),
        )
    }

    /// The field name and typed value handed to the model filter.
    #[must_use]
    pub fn key_value(&self) -> (&str, &ParamValue) {
        (&self.name, &self.value)
    }

    #[must_use]
    pub fn into_key_value(self) -> (String, ParamValue) {
        (self.name, self.value)
    }
}

fn split_key(key: &str) -> Result<(&str, ParamType), ParamError> {
    let bad_key = || ParamError::BadKeyFormat {
        key: key.to_string(),
    };

    let parts: Vec<&str> = key.split(NAME_TYPE_DELIMITER).collect();
    let [name, tag] = parts.as_slice() else {
        return Err(bad_key());
    };
    if name.is_empty() || tag.is_empty() {
        return Err(bad_key());
    }
    let param_type = tag.parse::<ParamType>().map_err(|_| bad_key())?;
    Ok((*name, param_type))
}

/// True when `key` is shaped like `name::type`, whatever the tag is.
#[must_use]
pub fn is_typed_key(key: &str) -> bool {
    key.split(NAME_TYPE_DELIMITER).count() == 2
}
