// Copyright 2026 The lca-engine Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::HashMap;

use crate::builder::build_expression;
use crate::common::{Ident, Result};
use crate::compiler::{PreparedModel, compile};
use crate::database::InventoryDatabase;
use crate::datamodel::{ActivityKey, Method};
use crate::params::{ParamRegistry, ParamValue};
use crate::results::Results;
use crate::solver::LcaSolver;
use crate::vm;

/// A project bundles the three inputs every computation needs: the
/// inventory database, the parameter registry, and the background
/// solver.
pub struct Project {
    database: Box<dyn InventoryDatabase>,
    registry: ParamRegistry,
    solver: Box<dyn LcaSolver>,
}

impl Project {
    pub fn new(
        database: Box<dyn InventoryDatabase>,
        registry: ParamRegistry,
        solver: Box<dyn LcaSolver>,
    ) -> Self {
        Project {
            database,
            registry,
            solver,
        }
    }

    pub fn database_mut(&mut self) -> &mut dyn InventoryDatabase {
        self.database.as_mut()
    }

    pub fn registry(&self) -> &ParamRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ParamRegistry {
        &mut self.registry
    }

    /// Build the model's algebraic expression, run the one batched
    /// background solve its symbols require, and compile a function per
    /// method. The result is reusable across any number of `evaluate`
    /// calls.
    ///
    /// Needs `&mut self`: building may insert passthrough proxies for
    /// biosphere flows into the database.
    pub fn prepare(&mut self, model: &ActivityKey, methods: &[Method]) -> Result<PreparedModel> {
        let built = build_expression(self.database.as_mut(), model)?;
        for diag in built.diagnostics.iter() {
            eprintln!("{diag}");
        }

        let activities = built.symbols.activities();
        let matrix = self.solver.solve(&activities, methods)?;

        compile(&built, model, &matrix, methods, &self.registry)
    }

    /// Evaluate a prepared model over a parameter batch, scaling every
    /// impact by `scale` (the model's functional-unit multiplier).
    pub fn evaluate(
        &self,
        prepared: &PreparedModel,
        params: &HashMap<Ident, ParamValue>,
        scale: f64,
    ) -> Result<Results> {
        let resolved = vm::resolve_params(&self.registry, &prepared.required_params, params)?;

        let mut column_data = Vec::with_capacity(prepared.compiled.len());
        for bytecode in prepared.compiled.iter() {
            let mut col = vm::eval(bytecode, &resolved.columns, resolved.n);
            if scale != 1.0 {
                for v in col.iter_mut() {
                    *v *= scale;
                }
            }
            column_data.push(col);
        }

        let columns = prepared.methods.iter().map(|m| m.name()).collect();
        let row_labels = if resolved.n == 1 {
            vec![prepared.name.clone()]
        } else {
            (0..resolved.n).map(|i| i.to_string()).collect()
        };

        let mut diagnostics = prepared.diagnostics.clone();
        diagnostics.extend(resolved.diagnostics);

        Results::new(columns, row_labels, column_data, diagnostics)
    }

    /// Prepare and evaluate a single model in one call.
    pub fn compute_model(
        &mut self,
        model: &ActivityKey,
        methods: &[Method],
        params: &HashMap<Ident, ParamValue>,
    ) -> Result<Results> {
        self.compute_models(&[(model.clone(), 1.0)], methods, params)
    }

    /// Prepare and evaluate several models against the same methods and
    /// parameter batch, stacking their rows into one table. Each model
    /// carries its own scale; rows are labeled `name` for a single-row
    /// model and `name[i]` otherwise.
    pub fn compute_models(
        &mut self,
        models: &[(ActivityKey, f64)],
        methods: &[Method],
        params: &HashMap<Ident, ParamValue>,
    ) -> Result<Results> {
        let mut tables = Vec::with_capacity(models.len());
        for (model, scale) in models.iter() {
            let prepared = self.prepare(model, methods)?;
            let mut results = self.evaluate(&prepared, params, *scale)?;
            if results.n_rows() == 1 {
                results.set_row_labels(vec![prepared.name.clone()]);
            } else {
                results.set_row_labels(
                    (0..results.n_rows())
                        .map(|i| format!("{}[{}]", prepared.name, i))
                        .collect(),
                );
            }
            tables.push(results);
        }
        Results::stack(tables)
    }
}
