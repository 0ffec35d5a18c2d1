// Copyright 2026 The lca-engine Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fmt;
use std::{error, result};

/// A parameter or symbol name appearing in an algebraic expression.
pub type Ident = String;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NoError, // will never be produced
    DoesNotExist,
    DuplicateActivity,
    RecursiveExchange,
    UnknownParameter,
    MissingParameter,
    UnusedParameter,
    UnsupportedExchange,
    ShapeMismatch,
    MismatchedColumns,
    EmptyFormula,
    InvalidToken,
    UnrecognizedToken,
    UnrecognizedEof,
    ExpectedNumber,
    BadSolverResult,
    Generic,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ErrorCode::*;
        let name = match self {
            NoError => "no_error",
            DoesNotExist => "does_not_exist",
            DuplicateActivity => "duplicate_activity",
            RecursiveExchange => "recursive_exchange",
            UnknownParameter => "unknown_parameter",
            MissingParameter => "missing_parameter",
            UnusedParameter => "unused_parameter",
            UnsupportedExchange => "unsupported_exchange",
            ShapeMismatch => "shape_mismatch",
            MismatchedColumns => "mismatched_columns",
            EmptyFormula => "empty_formula",
            InvalidToken => "invalid_token",
            UnrecognizedToken => "unrecognized_token",
            UnrecognizedEof => "unrecognized_eof",
            ExpectedNumber => "expected_number",
            BadSolverResult => "bad_solver_result",
            Generic => "generic",
        };

        write!(f, "{name}")
    }
}

/// An error located in the text of a single exchange formula.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EquationError {
    pub start: u16,
    pub end: u16,
    pub code: ErrorCode,
}

impl fmt::Display for EquationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}:{}", self.start, self.end, self.code)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Model,
    Build,
    Evaluation,
    Parameter,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Error {
    pub kind: ErrorKind,
    pub code: ErrorCode,
    pub details: Option<String>,
}

impl Error {
    pub fn new(kind: ErrorKind, code: ErrorCode, details: Option<String>) -> Self {
        Error {
            kind,
            code,
            details,
        }
    }

    pub fn get_details(&self) -> Option<String> {
        self.details.clone()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = match self.kind {
            ErrorKind::Model => "ModelError",
            ErrorKind::Build => "BuildError",
            ErrorKind::Evaluation => "EvaluationError",
            ErrorKind::Parameter => "ParameterError",
        };
        match self.details {
            Some(ref details) => write!(f, "{}{{{}: {}}}", kind, self.code, details),
            None => write!(f, "{}{{{}}}", kind, self.code),
        }
    }
}

impl error::Error for Error {}

pub type Result<T> = result::Result<T, Error>;
pub type EquationResult<T> = result::Result<T, EquationError>;

/// A non-fatal condition recovered during preparation or evaluation,
/// surfaced to the caller on the result table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub details: String,
}

impl Diagnostic {
    pub fn new(code: ErrorCode, details: String) -> Self {
        Diagnostic { code, details }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "warning: {}: {}", self.code, self.details)
    }
}

#[macro_export]
macro_rules! model_err(
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(
            ErrorKind::Model,
            ErrorCode::$code,
            Some($str),
        ))
    }}
);

#[macro_export]
macro_rules! build_err(
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(
            ErrorKind::Build,
            ErrorCode::$code,
            Some($str),
        ))
    }}
);

#[macro_export]
macro_rules! eval_err {
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(
            ErrorKind::Evaluation,
            ErrorCode::$code,
            Some($str),
        ))
    }};
    ($code:tt) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(ErrorKind::Evaluation, ErrorCode::$code, None))
    }};
}

#[macro_export]
macro_rules! param_err(
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(
            ErrorKind::Parameter,
            ErrorCode::$code,
            Some($str),
        ))
    }}
);

#[macro_export]
macro_rules! eqn_err(
    ($code:tt, $start:expr, $end:expr) => {{
        use $crate::common::{EquationError, ErrorCode};
        Err(EquationError{ start: $start as u16, end: $end as u16, code: ErrorCode::$code})
    }}
);

/// Turn an activity display name into an algebraic symbol: runs of
/// non-alphanumeric characters collapse to a single underscore.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_run = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
            in_run = false;
        } else if !in_run {
            slug.push('_');
            in_run = true;
        }
    }
    slug
}

#[test]
fn test_slugify() {
    assert_eq!("electricity_mix_FR", slugify("electricity mix, FR"));
    assert_eq!("a_b", slugify("a b"));
    assert_eq!("a_b_", slugify("a+++b!!!"));
    assert_eq!("_water_", slugify(" water "));
    assert_eq!("abc123", slugify("abc123"));
    assert_eq!("", slugify(""));
}

#[test]
fn test_error_display() {
    let err = Error::new(
        ErrorKind::Build,
        ErrorCode::RecursiveExchange,
        Some("acme/root".to_string()),
    );
    assert_eq!("BuildError{recursive_exchange: acme/root}", format!("{err}"));

    let err = Error::new(ErrorKind::Evaluation, ErrorCode::ShapeMismatch, None);
    assert_eq!("EvaluationError{shape_mismatch}", format!("{err}"));
}

#[test]
fn test_diagnostic_display() {
    let diag = Diagnostic::new(
        ErrorCode::MissingParameter,
        "p, replaced by default value 3".to_string(),
    );
    assert_eq!(
        "warning: missing_parameter: p, replaced by default value 3",
        format!("{diag}")
    );
}
