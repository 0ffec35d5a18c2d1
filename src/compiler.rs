// Copyright 2026 The lca-engine Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::HashMap;

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::builder::BuiltModel;
use crate::bytecode::{ByteCode, ByteCodeBuilder, Op2, Opcode, ParamOffset};
use crate::common::{Diagnostic, Ident, Result};
use crate::datamodel::{ActivityKey, Method};
use crate::params::ParamRegistry;
use crate::solver::ScoreMatrix;
use crate::{eval_err, model_err};

/// A foreground model compiled against one set of methods: one
/// parameter-only function per method, sharing a required-parameter
/// ordering. Stateless; cache it and evaluate as often as needed.
#[derive(Clone, Debug)]
pub struct PreparedModel {
    pub model: ActivityKey,
    /// Display name of the root activity.
    pub name: String,
    pub methods: Vec<Method>,
    pub(crate) compiled: Vec<ByteCode>,
    /// Free parameter names after symbol substitution, enum-expanded
    /// and sorted; the offset ordering the compiled code loads from.
    pub required_params: Vec<Ident>,
    /// Carried over from the build pass (e.g. skipped opaque-amount
    /// exchanges).
    pub diagnostics: Vec<Diagnostic>,
}

/// Substitute each method's background scores into the built expression
/// and lower the results to bytecode.
pub fn compile(
    built: &BuiltModel,
    model: &ActivityKey,
    matrix: &ScoreMatrix,
    methods: &[Method],
    registry: &ParamRegistry,
) -> Result<PreparedModel> {
    if matrix.n_methods() != methods.len() || matrix.n_activities() != built.symbols.len() {
        return eval_err!(
            BadSolverResult,
            format!(
                "solver returned {}x{} scores, expected {}x{}",
                matrix.n_methods(),
                matrix.n_activities(),
                methods.len(),
                built.symbols.len()
            )
        );
    }

    let free = built.expr.free_params();
    let required_params = registry.expand_names(free.iter())?;
    let offsets: HashMap<&Ident, ParamOffset> = required_params
        .iter()
        .enumerate()
        .map(|(i, name)| (name, i as ParamOffset))
        .collect();

    let mut compiled = Vec::with_capacity(methods.len());
    for (method_idx, _method) in methods.iter().enumerate() {
        let scores: HashMap<Ident, f64> = built
            .symbols
            .iter()
            .enumerate()
            .map(|(activity_idx, (symbol, _))| {
                (symbol.clone(), matrix.score(method_idx, activity_idx))
            })
            .collect();
        let substituted = built.expr.substitute(&scores);
        compiled.push(lower(&substituted, &offsets)?);
    }

    Ok(PreparedModel {
        model: model.clone(),
        name: built.name.clone(),
        methods: methods.to_vec(),
        compiled,
        required_params,
        diagnostics: built.diagnostics.clone(),
    })
}

fn lower(expr: &Expr, offsets: &HashMap<&Ident, ParamOffset>) -> Result<ByteCode> {
    let mut builder = ByteCodeBuilder::default();
    walk_expr(expr, offsets, &mut builder)?;
    builder.push_opcode(Opcode::Ret);
    Ok(builder.finish())
}

fn walk_expr(
    expr: &Expr,
    offsets: &HashMap<&Ident, ParamOffset>,
    builder: &mut ByteCodeBuilder,
) -> Result<()> {
    match expr {
        Expr::Const(value, _) => {
            let id = builder.intern_literal(*value);
            builder.push_opcode(Opcode::LoadConstant { id });
        }
        Expr::Param(name, _) => match offsets.get(name) {
            Some(off) => {
                builder.push_opcode(Opcode::LoadParam { off: *off });
            }
            None => {
                return model_err!(UnknownParameter, name.clone());
            }
        },
        Expr::Symbol(name, _) => {
            // substitution runs before lowering; a surviving symbol
            // means the solver matrix didn't cover it
            return model_err!(Generic, format!("unsubstituted symbol '{name}'"));
        }
        Expr::Op1(op, r, _) => {
            walk_expr(r, offsets, builder)?;
            match op {
                UnaryOp::Negative => builder.push_opcode(Opcode::Negate),
            }
        }
        Expr::Op2(op, l, r, _) => {
            walk_expr(l, offsets, builder)?;
            walk_expr(r, offsets, builder)?;
            let op = match op {
                BinaryOp::Add => Op2::Add,
                BinaryOp::Sub => Op2::Sub,
                BinaryOp::Mul => Op2::Mul,
                BinaryOp::Div => Op2::Div,
                BinaryOp::Exp => Op2::Exp,
            };
            builder.push_opcode(Opcode::Op2 { op });
        }
    }
    Ok(())
}
