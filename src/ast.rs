// Copyright 2026 The lca-engine Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::{BTreeSet, HashMap};
use std::iter::Peekable;

use crate::common::{EquationResult, Ident};
use crate::token::{Lexer, Token};

// formulas are short strings typed by humans for a single
// exchange -- u16 is long enough
#[derive(PartialEq, Clone, Copy, Debug, Default)]
pub struct Loc {
    pub start: u16,
    pub end: u16,
}

impl Loc {
    pub fn new(start: usize, end: usize) -> Self {
        Loc {
            start: start as u16,
            end: end as u16,
        }
    }

    pub fn union(&self, rhs: &Self) -> Self {
        Loc {
            start: self.start.min(rhs.start),
            end: self.end.max(rhs.end),
        }
    }
}

#[test]
fn test_loc_basics() {
    let a = Loc { start: 3, end: 7 };
    assert_eq!(a, Loc::new(3, 7));

    let b = Loc { start: 4, end: 11 };
    assert_eq!(Loc::new(3, 11), a.union(&b));
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Negative,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Exp,
}

// we use Boxes here because we walk and rewrite expression trees when
// substituting symbols, and want to avoid copying subexpressions all
// over the place.
#[derive(PartialEq, Clone, Debug)]
pub enum Expr {
    Const(f64, Loc),
    /// A free model parameter.
    Param(Ident, Loc),
    /// A placeholder for one background activity's unit impact score.
    Symbol(Ident, Loc),
    Op1(UnaryOp, Box<Expr>, Loc),
    Op2(BinaryOp, Box<Expr>, Box<Expr>, Loc),
}

impl Expr {
    pub(crate) fn get_loc(&self) -> Loc {
        match self {
            Expr::Const(_, loc) => *loc,
            Expr::Param(_, loc) => *loc,
            Expr::Symbol(_, loc) => *loc,
            Expr::Op1(_, _, loc) => *loc,
            Expr::Op2(_, _, _, loc) => *loc,
        }
    }

    #[cfg(test)]
    pub(crate) fn strip_loc(self) -> Self {
        let loc = Loc::default();
        match self {
            Expr::Const(n, _loc) => Expr::Const(n, loc),
            Expr::Param(v, _loc) => Expr::Param(v, loc),
            Expr::Symbol(s, _loc) => Expr::Symbol(s, loc),
            Expr::Op1(op, r, _loc) => Expr::Op1(op, Box::new(r.strip_loc()), loc),
            Expr::Op2(op, l, r, _loc) => {
                Expr::Op2(op, Box::new(l.strip_loc()), Box::new(r.strip_loc()), loc)
            }
        }
    }

    /// The free model parameters of this expression.
    pub fn free_params(&self) -> BTreeSet<Ident> {
        let mut names = BTreeSet::new();
        self.collect_free(&mut names, true);
        names
    }

    /// The background symbols of this expression.
    pub fn free_symbols(&self) -> BTreeSet<Ident> {
        let mut names = BTreeSet::new();
        self.collect_free(&mut names, false);
        names
    }

    fn collect_free(&self, names: &mut BTreeSet<Ident>, params: bool) {
        match self {
            Expr::Const(_, _) => {}
            Expr::Param(v, _) => {
                if params {
                    names.insert(v.clone());
                }
            }
            Expr::Symbol(s, _) => {
                if !params {
                    names.insert(s.clone());
                }
            }
            Expr::Op1(_, r, _) => r.collect_free(names, params),
            Expr::Op2(_, l, r, _) => {
                l.collect_free(names, params);
                r.collect_free(names, params);
            }
        }
    }

    /// Replace every `Symbol` whose name appears in `values` with the
    /// corresponding constant, yielding a parameter-only expression.
    pub fn substitute(&self, values: &HashMap<Ident, f64>) -> Expr {
        match self {
            Expr::Const(n, loc) => Expr::Const(*n, *loc),
            Expr::Param(v, loc) => Expr::Param(v.clone(), *loc),
            Expr::Symbol(s, loc) => match values.get(s) {
                Some(n) => Expr::Const(*n, *loc),
                None => Expr::Symbol(s.clone(), *loc),
            },
            Expr::Op1(op, r, loc) => Expr::Op1(*op, Box::new(r.substitute(values)), *loc),
            Expr::Op2(op, l, r, loc) => Expr::Op2(
                *op,
                Box::new(l.substitute(values)),
                Box::new(r.substitute(values)),
                *loc,
            ),
        }
    }
}

impl Default for Expr {
    fn default() -> Self {
        Expr::Const(0.0, Loc::default())
    }
}

/// Parse an exchange formula into an expression tree.
///
/// An empty (or whitespace-only) formula is not an error, but there is
/// also no AST for it.
pub fn parse_formula(text: &str) -> EquationResult<Option<Expr>> {
    let mut lexer = Lexer::new(text).peekable();
    if lexer.peek().is_none() {
        return Ok(None);
    }
    let expr = parse_expr(&mut lexer, 0)?;
    match lexer.next() {
        None => Ok(Some(expr)),
        Some(Ok((start, _token, end))) => crate::eqn_err!(UnrecognizedToken, start, end),
        Some(Err(err)) => Err(err),
    }
}

type TokenStream<'input> = Peekable<Lexer<'input>>;

fn binding_power(token: &Token) -> Option<(BinaryOp, u8, u8)> {
    // (op, left bp, right bp); exponentiation binds right
    match token {
        Token::Plus => Some((BinaryOp::Add, 10, 11)),
        Token::Minus => Some((BinaryOp::Sub, 10, 11)),
        Token::Mul => Some((BinaryOp::Mul, 20, 21)),
        Token::Div => Some((BinaryOp::Div, 20, 21)),
        Token::Exp => Some((BinaryOp::Exp, 31, 30)),
        _ => None,
    }
}

fn parse_expr(lexer: &mut TokenStream, min_bp: u8) -> EquationResult<Expr> {
    let mut lhs = parse_primary(lexer)?;

    loop {
        let (op, l_bp, r_bp) = match lexer.peek() {
            None => break,
            Some(Err(err)) => return Err(err.clone()),
            Some(Ok((_, token, _))) => match binding_power(token) {
                Some(powers) => powers,
                None => break,
            },
        };
        if l_bp < min_bp {
            break;
        }
        lexer.next();

        let rhs = parse_expr(lexer, r_bp)?;
        let loc = lhs.get_loc().union(&rhs.get_loc());
        lhs = Expr::Op2(op, Box::new(lhs), Box::new(rhs), loc);
    }

    Ok(lhs)
}

fn parse_primary(lexer: &mut TokenStream) -> EquationResult<Expr> {
    let (start, token, end) = match lexer.next() {
        None => return crate::eqn_err!(UnrecognizedEof, 0, 0),
        Some(Err(err)) => return Err(err),
        Some(Ok(spanned)) => spanned,
    };

    match token {
        Token::Num(text) => match text.parse::<f64>() {
            Ok(n) => Ok(Expr::Const(n, Loc::new(start, end))),
            Err(_) => crate::eqn_err!(ExpectedNumber, start, end),
        },
        Token::Ident(name) => Ok(Expr::Param(name.to_string(), Loc::new(start, end))),
        Token::Minus => {
            // unary minus binds tighter than * and / but looser than ^
            let operand = parse_expr(lexer, 25)?;
            let loc = Loc::new(start, end).union(&operand.get_loc());
            Ok(Expr::Op1(UnaryOp::Negative, Box::new(operand), loc))
        }
        Token::LParen => {
            let inner = parse_expr(lexer, 0)?;
            match lexer.next() {
                Some(Ok((_, Token::RParen, _))) => Ok(inner),
                Some(Ok((start, _, end))) => crate::eqn_err!(UnrecognizedToken, start, end),
                Some(Err(err)) => Err(err),
                None => crate::eqn_err!(UnrecognizedEof, end, end),
            }
        }
        _ => crate::eqn_err!(UnrecognizedToken, start, end),
    }
}
