//! Estimator hyperparameter values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One hyperparameter value, as given on the command line or chosen by tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<String>),
}

pub type Hyperparams = BTreeMap<String, ParamValue>;

impl ParamValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Int(i) => Some(*i as f64),
            ParamValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_usize(&self) -> Option<usize> {
        match self {
            ParamValue::Int(i) => usize::try_from(*i).ok(),
            ParamValue::Float(f) if f.fract() == 0.0 && *f >= 0.0 => Some(*f as usize),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            ParamValue::Int(i) => u64::try_from(*i).ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            ParamValue::Int(0) => Some(false),
            ParamValue::Int(1) => Some(true),
            _ => None,
        }
    }

    /// `None` spelled as text, e.g. `--max_depth none`.
    pub fn is_none(&self) -> bool {
        matches!(self, ParamValue::Text(t) if t.eq_ignore_ascii_case("none"))
    }

    /// A layer-size list: `[50, 25]` or a single integer.
    pub fn as_sizes(&self) -> Option<Vec<usize>> {
        match self {
            ParamValue::List(items) => items.iter().map(|item| item.parse().ok()).collect(),
            other => other.as_usize().map(|size| vec![size]),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Float(x) => write!(f, "{}", x),
            ParamValue::Text(t) => write!(f, "{}", t),
            ParamValue::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}
