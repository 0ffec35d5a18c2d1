// Copyright 2026 The lca-engine Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::common::{Ident, Result};
use crate::param_err;

/// The shape of a model parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ParamKind {
    Float,
    Bool,
    /// An enumerated choice. Expands into one `name_value` sub-name per
    /// value, each a 0/1 indicator; `default_value` names the value
    /// whose indicator defaults to 1.
    Enum {
        values: Vec<String>,
        default_value: String,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParamDefinition {
    pub name: Ident,
    pub kind: ParamKind,
    pub default: f64,
}

impl ParamDefinition {
    pub fn float<S: Into<Ident>>(name: S, default: f64) -> Self {
        ParamDefinition {
            name: name.into(),
            kind: ParamKind::Float,
            default,
        }
    }

    pub fn bool<S: Into<Ident>>(name: S, default: bool) -> Self {
        ParamDefinition {
            name: name.into(),
            kind: ParamKind::Bool,
            default: if default { 1.0 } else { 0.0 },
        }
    }

    pub fn enumerated<S: Into<Ident>>(name: S, values: &[&str], default_value: &str) -> Self {
        ParamDefinition {
            name: name.into(),
            kind: ParamKind::Enum {
                values: values.iter().map(|v| v.to_string()).collect(),
                default_value: default_value.to_string(),
            },
            default: 0.0,
        }
    }

    /// All the names this parameter answers to in formulas: the bare
    /// name for scalar kinds, `name_value` sub-names for enums.
    pub fn names(&self) -> Vec<Ident> {
        match &self.kind {
            ParamKind::Float | ParamKind::Bool => vec![self.name.clone()],
            ParamKind::Enum { values, .. } => values
                .iter()
                .map(|v| format!("{}_{}", self.name, v))
                .collect(),
        }
    }

    /// Default value for one of this parameter's expanded names.
    pub fn default_for(&self, expanded: &str) -> f64 {
        match &self.kind {
            ParamKind::Float | ParamKind::Bool => self.default,
            ParamKind::Enum { default_value, .. } => {
                let default_name = format!("{}_{}", self.name, default_value);
                if expanded == default_name { 1.0 } else { 0.0 }
            }
        }
    }
}

/// Registry of parameter definitions, owned by the caller and passed
/// explicitly rather than living in ambient global state.
#[derive(Clone, Debug, Default)]
pub struct ParamRegistry {
    params: BTreeMap<Ident, ParamDefinition>,
}

impl ParamRegistry {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn register(&mut self, def: ParamDefinition) {
        self.params.insert(def.name.clone(), def);
    }

    pub fn get(&self, name: &str) -> Option<&ParamDefinition> {
        self.params.get(name)
    }

    /// Find the definition that owns an expanded name (the bare name
    /// for scalars, any `name_value` sub-name for enums).
    pub fn owner_of(&self, expanded: &str) -> Option<&ParamDefinition> {
        self.params
            .values()
            .find(|def| def.names().iter().any(|n| n == expanded))
    }

    /// Map a set of expanded names back to their owning parameters and
    /// re-expand: if any sub-name of an enum is present, all of its
    /// siblings are required too (a partial enum selection is never
    /// valid). Unrecognized names are fatal.
    pub fn expand_names<'a, I: IntoIterator<Item = &'a Ident>>(
        &self,
        names: I,
    ) -> Result<Vec<Ident>> {
        let mut owners: BTreeMap<&Ident, &ParamDefinition> = BTreeMap::new();
        let mut missing: Vec<&Ident> = Vec::new();
        for name in names {
            match self.owner_of(name) {
                Some(def) => {
                    owners.insert(&def.name, def);
                }
                None => missing.push(name),
            }
        }
        if !missing.is_empty() {
            let names = missing
                .iter()
                .map(|n| n.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            return param_err!(UnknownParameter, names);
        }

        let mut expanded: Vec<Ident> = owners.values().flat_map(|def| def.names()).collect();
        expanded.sort();
        expanded.dedup();
        Ok(expanded)
    }
}

/// A parameter value supplied for evaluation: a single scalar, or one
/// sample per row of the evaluation batch.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
    Scalar(f64),
    Series(Vec<f64>),
}

impl ParamValue {
    /// Sample count, if this value fixes one.
    pub fn series_len(&self) -> Option<usize> {
        match self {
            ParamValue::Scalar(_) => None,
            ParamValue::Series(values) => Some(values.len()),
        }
    }

    /// Broadcast to a column of `n` samples.
    pub(crate) fn to_column(&self, n: usize) -> Vec<f64> {
        match self {
            ParamValue::Scalar(value) => vec![*value; n],
            ParamValue::Series(values) => {
                debug_assert_eq!(n, values.len());
                values.clone()
            }
        }
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Scalar(value)
    }
}

impl From<Vec<f64>> for ParamValue {
    fn from(values: Vec<f64>) -> Self {
        ParamValue::Series(values)
    }
}
