// Copyright 2026 The lca-engine Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::HashMap;

use crate::common::Result;
use crate::datamodel::{ActivityKey, Method};
use crate::eval_err;

/// Per-unit impact scores for a batch of activities: methods down the
/// rows, activities across the columns, one allocation.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreMatrix {
    n_methods: usize,
    n_activities: usize,
    data: Box<[f64]>,
}

impl ScoreMatrix {
    pub fn new(n_methods: usize, n_activities: usize, data: Box<[f64]>) -> Result<Self> {
        if data.len() != n_methods * n_activities {
            return eval_err!(
                BadSolverResult,
                format!(
                    "expected {}x{} scores, got {}",
                    n_methods,
                    n_activities,
                    data.len()
                )
            );
        }
        Ok(ScoreMatrix {
            n_methods,
            n_activities,
            data,
        })
    }

    pub fn n_methods(&self) -> usize {
        self.n_methods
    }

    pub fn n_activities(&self) -> usize {
        self.n_activities
    }

    pub fn score(&self, method_idx: usize, activity_idx: usize) -> f64 {
        self.data[method_idx * self.n_activities + activity_idx]
    }
}

/// The external LCA solver: one batched solve covering every requested
/// activity (each weighted 1) against every requested method.
///
/// This is the single expensive call per preparation pass; everything
/// downstream of it is in-process symbolic and vectorized numeric work.
pub trait LcaSolver {
    fn solve(&self, activities: &[ActivityKey], methods: &[Method]) -> Result<ScoreMatrix>;
}

/// A solver backed by a fixed score table; the stand-in for a real
/// inventory solver in tests and examples.
#[derive(Clone, Debug, Default)]
pub struct TableSolver {
    scores: HashMap<(ActivityKey, Method), f64>,
}

impl TableSolver {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn set_score(&mut self, activity: ActivityKey, method: Method, score: f64) {
        self.scores.insert((activity, method), score);
    }
}

impl LcaSolver for TableSolver {
    fn solve(&self, activities: &[ActivityKey], methods: &[Method]) -> Result<ScoreMatrix> {
        let mut data = Vec::with_capacity(methods.len() * activities.len());
        for method in methods.iter() {
            for activity in activities.iter() {
                match self.scores.get(&(activity.clone(), method.clone())) {
                    Some(score) => data.push(*score),
                    None => {
                        return eval_err!(
                            BadSolverResult,
                            format!("no score for {} under {}", activity, method)
                        );
                    }
                }
            }
        }
        ScoreMatrix::new(methods.len(), activities.len(), data.into_boxed_slice())
    }
}
