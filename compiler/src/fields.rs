use std::fmt;

use serde_json::{Map, Value};

use crate::error::{CompileError, Result};

/// Where a group of fields was declared, used to give errors some context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Network,
    Layer(usize),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Network => write!(f, "network"),
            Scope::Layer(index) => write!(f, "layer {index}"),
        }
    }
}

/// Typed accessors over the raw key-value pairs of a document object.
///
/// A `null` value is treated the same way as a missing key.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    scope: Scope,
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    pub fn new(scope: Scope, map: &'a Map<String, Value>) -> Self {
        Self { scope, map }
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Builds the error for a required field that was not declared.
    pub fn missing(&self, key: &str) -> CompileError {
        CompileError::malformed(format!("{}: missing field {key}", self.scope))
    }

    fn invalid(&self, key: &str, expected: &'static str) -> CompileError {
        CompileError::invalid_type(format!("{}.{key}", self.scope), expected)
    }

    fn required(&self, key: &str) -> Result<&'a Value> {
        self.get(key).ok_or_else(|| self.missing(key))
    }

    pub fn usize(&self, key: &str) -> Result<usize> {
        self.required(key)?
            .as_u64()
            .and_then(|v| usize::try_from(v).ok())
            .ok_or_else(|| self.invalid(key, "a non-negative integer"))
    }

    /// Like [`Fields::usize`] but also rejects zero.
    pub fn positive(&self, key: &str) -> Result<usize> {
        match self.usize(key)? {
            0 => Err(CompileError::malformed(format!(
                "{}: {key} must be greater than zero",
                self.scope
            ))),
            v => Ok(v),
        }
    }

    pub fn bool(&self, key: &str) -> Result<bool> {
        self.required(key)?
            .as_bool()
            .ok_or_else(|| self.invalid(key, "a boolean"))
    }

    pub fn str(&self, key: &str) -> Result<&'a str> {
        self.required(key)?
            .as_str()
            .ok_or_else(|| self.invalid(key, "a string"))
    }

    pub fn opt_str(&self, key: &str) -> Result<Option<&'a str>> {
        self.get(key)
            .map(|v| v.as_str().ok_or_else(|| self.invalid(key, "a string")))
            .transpose()
    }

    /// Reads an optional rate, integers are widened.
    pub fn opt_f64(&self, key: &str) -> Result<Option<f64>> {
        self.get(key)
            .map(|v| v.as_f64().ok_or_else(|| self.invalid(key, "a number")))
            .transpose()
    }

    /// Reads an optional array of non-negative integers.
    pub fn opt_shape(&self, key: &str) -> Result<Option<Vec<usize>>> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };

        value
            .as_array()
            .ok_or_else(|| self.invalid(key, "an integer array"))?
            .iter()
            .map(|v| {
                v.as_u64()
                    .and_then(|v| usize::try_from(v).ok())
                    .ok_or_else(|| self.invalid(key, "an integer array"))
            })
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }
}
