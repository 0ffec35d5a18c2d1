// Copyright 2026 The lca-engine Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::HashMap;

use crate::ast::{BinaryOp, Expr, Loc, parse_formula};
use crate::build_err;
use crate::common::{Diagnostic, Error, ErrorCode, ErrorKind, Ident, Result, slugify};
use crate::database::{InventoryDatabase, passthrough_proxy};
use crate::datamodel::{Activity, ActivityKey, Amount, DatabaseKind};

/// Allocation of algebraic symbols to background activities for one
/// expression-building pass.
///
/// Within a pass no two distinct activities share a symbol, and a
/// repeated lookup for the same activity returns the existing symbol.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    by_key: HashMap<ActivityKey, Ident>,
    by_symbol: HashMap<Ident, ActivityKey>,
    // insertion order; fixes the activity ordering handed to the solver
    order: Vec<Ident>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Default::default()
    }

    /// Obtain the symbol for an activity, allocating one if this is the
    /// first reference. Slug collisions between distinct activities are
    /// resolved by suffixing `1, 2, ...`.
    pub fn symbol_for(&mut self, key: &ActivityKey, display_name: &str) -> Ident {
        if let Some(symbol) = self.by_key.get(key) {
            return symbol.clone();
        }

        let base_slug = slugify(display_name);
        let mut slug = base_slug.clone();
        let mut i = 1;
        while self.by_symbol.contains_key(&slug) {
            slug = format!("{base_slug}{i}");
            i += 1;
        }

        self.by_key.insert(key.clone(), slug.clone());
        self.by_symbol.insert(slug.clone(), key.clone());
        self.order.push(slug.clone());
        slug
    }

    pub fn get(&self, symbol: &str) -> Option<&ActivityKey> {
        self.by_symbol.get(symbol)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Symbols with their activities, in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (&Ident, &ActivityKey)> {
        self.order
            .iter()
            .map(move |symbol| (symbol, &self.by_symbol[symbol]))
    }

    /// The referenced activities, in allocation order.
    pub fn activities(&self) -> Vec<ActivityKey> {
        self.order
            .iter()
            .map(|symbol| self.by_symbol[symbol].clone())
            .collect()
    }
}

/// Output of one expression-building pass over a foreground model.
#[derive(Clone, Debug)]
pub struct BuiltModel {
    /// Display name of the root activity.
    pub name: String,
    /// Sum of `formula * (symbol | sub-expression)` terms, normalized
    /// by any non-unit self-output amount.
    pub expr: Expr,
    pub symbols: SymbolTable,
    /// Non-fatal conditions recovered during the build (currently only
    /// skipped opaque-amount exchanges).
    pub diagnostics: Vec<Diagnostic>,
}

struct Builder<'a> {
    db: &'a mut dyn InventoryDatabase,
    foreground_db: String,
    symbols: SymbolTable,
    diagnostics: Vec<Diagnostic>,
    // completed sub-expressions, so diamond-shaped graphs build each
    // sub-activity once
    memo: HashMap<ActivityKey, Expr>,
    // the path of the current recursion; any key re-entering it is a
    // cycle
    in_progress: Vec<ActivityKey>,
}

/// Convert a foreground activity into a symbolic expression over model
/// parameters and background-activity symbols.
///
/// Background and biosphere inputs become symbols (biosphere flows via
/// their technosphere passthrough proxy); foreground inputs are
/// expanded recursively. Model parameters stay free variables inside
/// the exchange formulas.
pub fn build_expression(db: &mut dyn InventoryDatabase, root: &ActivityKey) -> Result<BuiltModel> {
    let root_act = db.get(root)?;
    let mut builder = Builder {
        db,
        foreground_db: root.database.clone(),
        symbols: SymbolTable::new(),
        diagnostics: Vec::new(),
        memo: HashMap::new(),
        in_progress: Vec::new(),
    };

    let expr = builder.activity_expr(&root_act)?;
    Ok(BuiltModel {
        name: root_act.name.clone(),
        expr,
        symbols: builder.symbols,
        diagnostics: builder.diagnostics,
    })
}

impl Builder<'_> {
    fn activity_expr(&mut self, act: &Activity) -> Result<Expr> {
        if let Some(expr) = self.memo.get(&act.key) {
            return Ok(expr.clone());
        }
        if self.in_progress.contains(&act.key) {
            let path = self
                .in_progress
                .iter()
                .map(|key| key.to_string())
                .collect::<Vec<_>>()
                .join(" -> ");
            return build_err!(RecursiveExchange, format!("{} -> {}", path, act.key));
        }
        self.in_progress.push(act.key.clone());

        let mut sum: Option<Expr> = None;
        let mut output_amount: Option<Expr> = None;

        for exch in act.exchanges.iter() {
            let amount = match &exch.amount {
                Amount::Literal(value) => Expr::Const(*value, Loc::default()),
                Amount::Formula(text) => match parse_formula(text) {
                    Ok(Some(expr)) => expr,
                    Ok(None) => {
                        return build_err!(
                            EmptyFormula,
                            format!("empty formula on exchange of {}", act.key)
                        );
                    }
                    Err(err) => {
                        return Err(Error::new(
                            ErrorKind::Build,
                            err.code,
                            Some(format!("in formula '{}' of {}: {}", text, act.key, err)),
                        ));
                    }
                },
                Amount::Unsupported => {
                    // dynamically computed amounts cannot be captured
                    // symbolically; drop the exchange and say so
                    let details = format!("{} -> {}, exchange skipped", act.key, exch.input);
                    eprintln!(
                        "warning: {}: {}",
                        ErrorCode::UnsupportedExchange,
                        details
                    );
                    self.diagnostics
                        .push(Diagnostic::new(ErrorCode::UnsupportedExchange, details));
                    continue;
                }
            };

            // a self-loop sets the activity's output scaling factor and
            // contributes no term
            if exch.input == act.key {
                if !matches!(amount, Expr::Const(value, _) if value == 1.0) {
                    output_amount = Some(amount);
                }
                continue;
            }

            let input_expr = match self.db.database_kind(&exch.input.database) {
                DatabaseKind::Biosphere => {
                    let proxy = passthrough_proxy(self.db, &self.foreground_db, &exch.input)?;
                    let symbol = self.symbols.symbol_for(&proxy.key, &proxy.name);
                    Expr::Symbol(symbol, Loc::default())
                }
                DatabaseKind::Background => {
                    let input = self.db.get(&exch.input)?;
                    let symbol = self.symbols.symbol_for(&input.key, &input.name);
                    Expr::Symbol(symbol, Loc::default())
                }
                DatabaseKind::Foreground => {
                    let input = self.db.get(&exch.input)?;
                    self.activity_expr(&input)?
                }
            };

            let term = Expr::Op2(
                BinaryOp::Mul,
                Box::new(amount),
                Box::new(input_expr),
                Loc::default(),
            );
            sum = Some(match sum {
                None => term,
                Some(lhs) => Expr::Op2(
                    BinaryOp::Add,
                    Box::new(lhs),
                    Box::new(term),
                    Loc::default(),
                ),
            });
        }

        self.in_progress.pop();

        let mut expr = sum.unwrap_or_default();
        if let Some(divisor) = output_amount {
            expr = Expr::Op2(
                BinaryOp::Div,
                Box::new(expr),
                Box::new(divisor),
                Loc::default(),
            );
        }

        self.memo.insert(act.key.clone(), expr.clone());
        Ok(expr)
    }
}
