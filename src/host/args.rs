//! Filter construction arguments
//!
//! The host passes arguments as a dictionary of named values. Each key may
//! hold several values, but every built-in filter reads only the first.

use super::node::Node;
use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;

/// A single argument value
#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Data(String),
    Clip(Node),
}

impl Value {
    /// Name of the value's type as used in argument signatures
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Data(_) => "data",
            Value::Clip(_) => "clip",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Data(v) => write!(f, "{:?}", v),
            Value::Clip(node) => write!(f, "<clip {}>", node.name()),
        }
    }
}

/// Named construction arguments
#[derive(Debug, Clone, Default)]
pub struct Args {
    values: BTreeMap<String, Vec<Value>>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value under `key`
    pub fn set(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.values.entry(key.into()).or_default().push(value);
        self
    }

    pub fn set_int(&mut self, key: impl Into<String>, value: i64) -> &mut Self {
        self.set(key, Value::Int(value))
    }

    pub fn set_clip(&mut self, key: impl Into<String>, node: Node) -> &mut Self {
        self.set(key, Value::Clip(node))
    }

    /// Parse a `key=value` pair as given on the command line. Integers,
    /// then floats are tried before falling back to data.
    pub fn set_parsed(&mut self, pair: &str) -> Result<&mut Self> {
        let (key, raw) = pair
            .split_once('=')
            .ok_or_else(|| Error::config(format!("Expected key=value, got {:?}", pair)))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::config(format!("Missing argument name in {:?}", pair)));
        }
        let raw = raw.trim();
        let value = if let Ok(v) = raw.parse::<i64>() {
            Value::Int(v)
        } else if let Ok(v) = raw.parse::<f64>() {
            Value::Float(v)
        } else {
            Value::Data(raw.to_string())
        };
        Ok(self.set(key, value))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// First value stored under `key`
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key).and_then(|v| v.first())
    }

    /// Every value stored under `key`
    pub fn get_all(&self, key: &str) -> &[Value] {
        self.values.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Optional integer argument; a value of another type is an error
    pub fn get_int(&self, key: &str) -> Result<Option<i64>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Int(v)) => Ok(Some(*v)),
            Some(other) => Err(Error::config(format!(
                "Argument {} must be an int, got {}",
                key,
                other.type_name()
            ))),
        }
    }

    /// Integer argument with a default when absent
    pub fn int_or(&self, key: &str, default: i64) -> Result<i64> {
        Ok(self.get_int(key)?.unwrap_or(default))
    }

    /// Optional boolean flag (any non-zero int is true)
    pub fn flag_or(&self, key: &str, default: bool) -> Result<bool> {
        Ok(self.get_int(key)?.map_or(default, |v| v != 0))
    }

    /// Mandatory clip argument
    pub fn clip(&self, key: &str) -> Result<Node> {
        match self.get(key) {
            Some(Value::Clip(node)) => Ok(node.clone()),
            Some(other) => Err(Error::config(format!(
                "Argument {} must be a clip, got {}",
                key,
                other.type_name()
            ))),
            None => Err(Error::config(format!("Argument {} is required", key))),
        }
    }
}
