// Copyright 2026 The lca-engine Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Symbolic-algebraic life cycle assessment.
//!
//! A parametrized foreground model is converted once into a closed-form
//! algebraic expression over its parameters, with each background
//! activity reduced to a single symbol. The background symbols are
//! priced by one batched call to an external solver, the resulting
//! per-method expressions are compiled to stack bytecode, and parameter
//! batches are then evaluated with vectorized opcode dispatch. The
//! expensive inventory solve happens once per preparation, never once
//! per sample.
//!
//! ```no_run
//! use std::collections::HashMap;
//! use lca_engine::{
//!     ActivityKey, InMemoryDatabase, Method, ParamRegistry, Project, TableSolver,
//! };
//!
//! let db = InMemoryDatabase::new();
//! let mut project = Project::new(
//!     Box::new(db),
//!     ParamRegistry::new(),
//!     Box::new(TableSolver::new()),
//! );
//! let methods = vec![Method::new("ReCiPe 2016", "climate change", "GWP100")];
//! let results = project
//!     .compute_model(&ActivityKey::new("model", "root"), &methods, &HashMap::new())
//!     .unwrap();
//! results.print_tsv(&mut std::io::stdout()).unwrap();
//! ```

#![forbid(unsafe_code)]

pub mod ast;
mod builder;
mod bytecode;
pub mod common;
mod compiler;
mod database;
pub mod datamodel;
mod params;
mod project;
mod results;
mod solver;
mod token;
mod vm;

pub use self::builder::{BuiltModel, SymbolTable, build_expression};
pub use self::bytecode::ByteCode;
pub use self::common::{Diagnostic, Error, ErrorCode, ErrorKind, Ident, Result};
pub use self::compiler::{PreparedModel, compile};
pub use self::database::{
    InMemoryDatabase, InventoryDatabase, PASSTHROUGH_SUFFIX, passthrough_proxy,
};
pub use self::datamodel::{Activity, ActivityKey, Amount, DatabaseKind, Exchange, Method};
pub use self::params::{ParamDefinition, ParamKind, ParamRegistry, ParamValue};
pub use self::project::Project;
pub use self::results::Results;
pub use self::solver::{LcaSolver, ScoreMatrix, TableSolver};
