// Copyright 2026 The lca-engine Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::HashMap;
use std::io::Write;

use serde_json::json;

use crate::common::{Diagnostic, Result};
use crate::eval_err;

/// An evaluated batch: one row per parameter sample, one column per
/// impact method, backed by a single row-major allocation.
#[derive(Clone, Debug)]
pub struct Results {
    pub offsets: HashMap<String, usize>,
    columns: Vec<String>,
    row_labels: Vec<String>,
    data: Box<[f64]>,
    n_rows: usize,
    n_cols: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl Results {
    /// Assemble a table from per-method column vectors, all length
    /// `row_labels.len()`.
    pub fn new(
        columns: Vec<String>,
        row_labels: Vec<String>,
        column_data: Vec<Vec<f64>>,
        diagnostics: Vec<Diagnostic>,
    ) -> Result<Self> {
        let n_rows = row_labels.len();
        let n_cols = columns.len();
        if column_data.len() != n_cols {
            return eval_err!(
                MismatchedColumns,
                format!("{} columns named, {} provided", n_cols, column_data.len())
            );
        }
        for (name, col) in columns.iter().zip(column_data.iter()) {
            if col.len() != n_rows {
                return eval_err!(
                    ShapeMismatch,
                    format!("column {} has {} rows, expected {}", name, col.len(), n_rows)
                );
            }
        }

        let offsets: HashMap<String, usize> = columns
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();

        let mut data = vec![0.0; n_rows * n_cols].into_boxed_slice();
        for (col_idx, col) in column_data.iter().enumerate() {
            for (row_idx, value) in col.iter().enumerate() {
                data[row_idx * n_cols + col_idx] = *value;
            }
        }

        Ok(Results {
            offsets,
            columns,
            row_labels,
            data,
            n_rows,
            n_cols,
            diagnostics,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    pub fn set_row_labels(&mut self, labels: Vec<String>) {
        assert_eq!(self.n_rows, labels.len());
        self.row_labels = labels;
    }

    /// One cell, addressed by row index and column (method) name.
    pub fn value(&self, row: usize, column: &str) -> Option<f64> {
        let off = *self.offsets.get(column)?;
        self.data.get(row * self.n_cols + off).copied()
    }

    /// Rows in order, each a label plus a slice of `n_cols` values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.row_labels
            .iter()
            .map(|l| l.as_str())
            .zip(self.data.chunks(self.n_cols.max(1)))
    }

    /// Concatenate the rows of several tables with identical columns.
    pub fn stack(tables: Vec<Results>) -> Result<Results> {
        let mut iter = tables.into_iter();
        let mut combined = match iter.next() {
            Some(first) => first,
            None => {
                return eval_err!(MismatchedColumns, "no result tables to stack".to_string());
            }
        };

        for table in iter {
            if table.columns != combined.columns {
                return eval_err!(
                    MismatchedColumns,
                    format!(
                        "cannot stack columns [{}] onto [{}]",
                        table.columns.join(", "),
                        combined.columns.join(", ")
                    )
                );
            }
            let mut data = std::mem::take(&mut combined.data).into_vec();
            data.extend_from_slice(&table.data);
            combined.data = data.into_boxed_slice();
            combined.row_labels.extend(table.row_labels);
            combined.n_rows += table.n_rows;
            combined.diagnostics.extend(table.diagnostics);
        }

        Ok(combined)
    }

    pub fn print_tsv<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        write!(w, "model")?;
        for name in self.columns.iter() {
            write!(w, "\t{name}")?;
        }
        writeln!(w)?;

        for (label, row) in self.iter() {
            write!(w, "{label}")?;
            for value in row.iter() {
                write!(w, "\t{value}")?;
            }
            writeln!(w)?;
        }

        Ok(())
    }

    pub fn to_json(&self) -> serde_json::Value {
        let rows: Vec<serde_json::Value> = self
            .iter()
            .map(|(label, row)| {
                let mut obj = serde_json::Map::new();
                obj.insert("model".to_string(), json!(label));
                for (name, value) in self.columns.iter().zip(row.iter()) {
                    obj.insert(name.clone(), json!(value));
                }
                serde_json::Value::Object(obj)
            })
            .collect();
        json!(rows)
    }
}
