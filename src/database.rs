// Copyright 2026 The lca-engine Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::HashMap;
use std::rc::Rc;

use crate::common::{Error, ErrorCode, ErrorKind, Result};
use crate::datamodel::{Activity, ActivityKey, Amount, DatabaseKind, Exchange};
use crate::model_err;

/// Read access to the inventory database, plus the one write this
/// engine performs: memoized creation of biosphere passthrough proxies.
pub trait InventoryDatabase {
    /// How the engine should treat activities of the named database.
    fn database_kind(&self, database: &str) -> DatabaseKind;
    fn get(&self, key: &ActivityKey) -> Result<Rc<Activity>>;
    fn put(&mut self, activity: Activity) -> Result<Rc<Activity>>;
}

/// Code suffix identifying the technosphere proxy of a biosphere flow.
pub const PASSTHROUGH_SUFFIX: &str = "#asTech";

/// Fetch or create the 1-unit technosphere wrapper for a biosphere
/// flow, so the external solver can score it.
///
/// The proxy lives in the foreground database under the biosphere
/// flow's code plus [`PASSTHROUGH_SUFFIX`]; repeated calls return the
/// existing proxy rather than duplicating it.
pub fn passthrough_proxy(
    db: &mut dyn InventoryDatabase,
    foreground_db: &str,
    flow: &ActivityKey,
) -> Result<Rc<Activity>> {
    let proxy_key = ActivityKey::new(foreground_db, format!("{}{}", flow.code, PASSTHROUGH_SUFFIX));
    match db.get(&proxy_key) {
        Ok(proxy) => Ok(proxy),
        Err(Error {
            code: ErrorCode::DoesNotExist,
            ..
        }) => {
            let flow_act = db.get(flow)?;
            let proxy = Activity::new(
                proxy_key,
                format!("{} # asTech", flow_act.name),
                flow_act.unit.clone(),
                vec![Exchange::new(flow.clone(), Amount::Literal(1.0))],
            );
            db.put(proxy)
        }
        Err(err) => Err(err),
    }
}

/// A self-contained inventory database, used in tests and by callers
/// that assemble foreground models programmatically.
#[derive(Clone, Debug, Default)]
pub struct InMemoryDatabase {
    kinds: HashMap<String, DatabaseKind>,
    activities: HashMap<ActivityKey, Rc<Activity>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn register_database<S: Into<String>>(&mut self, name: S, kind: DatabaseKind) {
        self.kinds.insert(name.into(), kind);
    }

    pub fn add_activity(&mut self, activity: Activity) -> Result<Rc<Activity>> {
        self.put(activity)
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }
}

impl InventoryDatabase for InMemoryDatabase {
    fn database_kind(&self, database: &str) -> DatabaseKind {
        // an unregistered database is an opaque leaf, not something to
        // recurse into
        self.kinds
            .get(database)
            .copied()
            .unwrap_or(DatabaseKind::Background)
    }

    fn get(&self, key: &ActivityKey) -> Result<Rc<Activity>> {
        match self.activities.get(key) {
            Some(activity) => Ok(Rc::clone(activity)),
            None => Err(Error::new(
                ErrorKind::Model,
                ErrorCode::DoesNotExist,
                Some(key.to_string()),
            )),
        }
    }

    fn put(&mut self, activity: Activity) -> Result<Rc<Activity>> {
        if self.activities.contains_key(&activity.key) {
            return model_err!(DuplicateActivity, activity.key.to_string());
        }
        let activity = Rc::new(activity);
        self.activities
            .insert(activity.key.clone(), Rc::clone(&activity));
        Ok(activity)
    }
}
