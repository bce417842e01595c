//! Composable row predicates over the reference tables.
//!
//! Caller values only ever become literals inside a polars expression tree;
//! they are never spliced into query text.

use polars::prelude::*;

/// Case-insensitive `column == value`.
fn text_equals(column: &str, value: &str) -> Expr {
    col(column)
        .str()
        .to_uppercase()
        .eq(lit(value.trim().to_uppercase()))
}

/// An AND of predicates. Optional criteria that are absent add nothing.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    clauses: Vec<Expr>,
}

impl Filter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `column` to equal `value`, ignoring case.
    #[must_use]
    pub fn equals(mut self, column: &str, value: Option<&str>) -> Self {
        if let Some(value) = value {
            self.clauses.push(text_equals(column, value));
        }
        self
    }

    /// Require at least one of `columns` to equal `value`, ignoring case.
    #[must_use]
    pub fn equals_any(mut self, columns: &[&str], value: Option<&str>) -> Self {
        let Some(value) = value else {
            return self;
        };
        if let Some(any) = columns
            .iter()
            .map(|column| text_equals(column, value))
            .reduce(Expr::or)
        {
            self.clauses.push(any);
        }
        self
    }

    #[must_use]
    pub fn push(mut self, clause: Expr) -> Self {
        self.clauses.push(clause);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// The combined predicate, or `None` when nothing is required.
    #[must_use]
    pub fn into_expr(self) -> Option<Expr> {
        self.clauses.into_iter().reduce(Expr::and)
    }

    pub fn apply(self, frame: LazyFrame) -> LazyFrame {
        match self.into_expr() {
            Some(predicate) => frame.filter(predicate),
            None => frame,
        }
    }
}
