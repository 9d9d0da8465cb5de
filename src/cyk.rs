/*
    This module runs the CYK recognition algorithm over a grammar
*/

use itertools::Itertools;
use log::{debug, info, warn};

use crate::grammar::{Cell, Grammar};

/// The triangular CYK table for one non-empty input.
///
/// Row 0 holds the input tokens. Row `k` holds, for every start position `i`,
/// the nonterminals deriving the `k` tokens starting at `i`, so the last row
/// has a single cell covering the whole input.
#[derive(Debug, Clone, PartialEq)]
pub struct CykTable {
    tokens: Vec<String>,
    // rows[k - 1] is row k
    rows: Vec<Vec<Cell>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    // None when the input was empty
    pub table: Option<CykTable>,
    pub accepted: bool,
}

impl CykTable {
    /// Builds and fills the table. Returns `None` for empty input, which has
    /// no table and is decided by `Grammar::derives_empty` instead.
    pub fn build<S: AsRef<str>>(grammar: &Grammar, tokens: &[S]) -> Option<CykTable> {
        if tokens.is_empty() {
            return None;
        }

        let mut table = CykTable {
            tokens: tokens.iter().map(|t| t.as_ref().to_owned()).collect(),
            rows: Vec::with_capacity(tokens.len()),
        };
        table.fill_terminals(grammar);
        for len in 2..=table.len() {
            table.fill_row(grammar, len);
        }

        Some(table)
    }

    fn fill_terminals(&mut self, grammar: &Grammar) {
        let row = self.tokens.iter()
            .map(|token| {
                let producers = grammar.producers_of_terminal(token);
                if producers.is_empty() {
                    warn!("No nonterminal produces `{}`", token);
                }
                producers.clone()
            })
            .collect_vec();

        self.rows.push(row);
        self.log_row(1);
    }

    fn fill_row(&mut self, grammar: &Grammar, len: usize) {
        let row = (0..self.len() - (len - 1))
            .map(|start| self.derive_cell(grammar, len, start, 1..len))
            .collect_vec();

        self.rows.push(row);
        self.log_row(len);
    }

    // Unions the producers of every pair across the given split points. A
    // split `s` pairs the span of length `s` at `start` with the rest
    fn derive_cell(&self, grammar: &Grammar, len: usize, start: usize, splits: impl IntoIterator<Item = usize>) -> Cell {
        let mut cell = Cell::new();
        for split in splits {
            let left = self.cell(split, start).into_iter().flatten();
            let right = self.cell(len - split, start + split).into_iter().flatten();
            for (a, b) in left.cartesian_product(right.collect_vec()) {
                cell.extend(grammar.producers_of_pair(a, b).iter().cloned());
            }
        }
        cell
    }

    fn log_row(&self, len: usize) {
        let row = &self.rows[len - 1];
        debug!(
            "Filled row {} ({} of {} cells derivable)",
            len,
            row.iter().filter(|cell| !cell.is_empty()).count(),
            row.len()
        );
    }

    // Number of input tokens
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// The cells of row `len`, for `len` in `1..=self.len()`.
    pub fn row(&self, len: usize) -> Option<&[Cell]> {
        len.checked_sub(1)
            .and_then(|index| self.rows.get(index))
            .map(Vec::as_slice)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn cell(&self, len: usize, start: usize) -> Option<&Cell> {
        self.row(len).and_then(|row| row.get(start))
    }

    // The cell spanning the whole input
    pub fn top(&self) -> &Cell {
        &self.rows[self.rows.len() - 1][0]
    }

    pub fn accepts(&self, start_symbol: &str) -> bool {
        self.top().contains(start_symbol)
    }
}

/// Decides whether `tokens` is in the language of `grammar`.
pub fn recognize<S: AsRef<str>>(grammar: &Grammar, tokens: &[S]) -> Recognition {
    let table = CykTable::build(grammar, tokens);
    let accepted = match &table {
        Some(table) => table.accepts(grammar.start_symbol()),
        None => {
            debug!("Empty input, checking whether `{}` derives the empty string", grammar.start_symbol());
            grammar.derives_empty()
        }
    };

    info!(
        "`{}` {} `{}`",
        grammar.start_symbol(),
        if accepted { "derives" } else { "does not derive" },
        tokens.iter().map(|t| t.as_ref()).join(" ")
    );

    Recognition { table, accepted }
}
