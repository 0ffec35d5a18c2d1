// Copyright 2026 The lca-engine Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of an activity: the database it lives in plus its code.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActivityKey {
    pub database: String,
    pub code: String,
}

impl ActivityKey {
    pub fn new<S: Into<String>, T: Into<String>>(database: S, code: T) -> Self {
        ActivityKey {
            database: database.into(),
            code: code.into(),
        }
    }
}

impl fmt::Display for ActivityKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.database, self.code)
    }
}

/// How the engine treats activities of a given database during
/// expression building.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseKind {
    /// The user's own parametrized model; expanded recursively.
    Foreground,
    /// Large immutable inventory; referenced as an opaque symbol.
    Background,
    /// Elementary flows; cannot be solved directly, wrapped in a
    /// 1-unit technosphere proxy before symbol allocation.
    Biosphere,
}

/// The amount carried by an exchange, decided at ingestion time.
///
/// Some background datasets express amounts as opaque computed
/// functions; those cannot be captured symbolically and arrive here as
/// `Unsupported`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Amount {
    Literal(f64),
    Formula(String),
    Unsupported,
}

/// A directed edge from the owning activity to an input activity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    pub input: ActivityKey,
    pub amount: Amount,
}

impl Exchange {
    pub fn new(input: ActivityKey, amount: Amount) -> Self {
        Exchange { input, amount }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub key: ActivityKey,
    pub name: String,
    pub unit: String,
    pub exchanges: Vec<Exchange>,
}

impl Activity {
    pub fn new<S: Into<String>, T: Into<String>>(
        key: ActivityKey,
        name: S,
        unit: T,
        exchanges: Vec<Exchange>,
    ) -> Self {
        Activity {
            key,
            name: name.into(),
            unit: unit.into(),
            exchanges,
        }
    }
}

/// An impact assessment method, identified by a `(family, category,
/// indicator)` triple.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Method {
    pub family: String,
    pub category: String,
    pub indicator: String,
}

impl Method {
    pub fn new<S: Into<String>, T: Into<String>, U: Into<String>>(
        family: S,
        category: T,
        indicator: U,
    ) -> Self {
        Method {
            family: family.into(),
            category: category.into(),
            indicator: indicator.into(),
        }
    }

    /// Display name: the last two components of the triple.
    pub fn name(&self) -> String {
        format!("{} - {}", self.category, self.indicator)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_name_is_last_two_components() {
        let method = Method::new("ReCiPe 2016", "climate change", "GWP100");
        assert_eq!("climate change - GWP100", method.name());
        assert_eq!("climate change - GWP100", format!("{method}"));
    }

    #[test]
    fn activity_key_display() {
        let key = ActivityKey::new("acme", "root");
        assert_eq!("acme/root", format!("{key}"));
    }

    #[test]
    fn amount_roundtrips_through_json() {
        let exch = Exchange::new(
            ActivityKey::new("ei", "abc"),
            Amount::Formula("0.5 * p".to_string()),
        );
        let json = serde_json::to_string(&exch).unwrap();
        let back: Exchange = serde_json::from_str(&json).unwrap();
        assert_eq!(exch, back);
    }
}
