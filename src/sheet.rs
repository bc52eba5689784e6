//! The sparse grid of cells and the mutating operations (`set_cell`,
//! `copy_rect`) that act on it directly.

use crate::constants::FORMULA_PREFIX;
use crate::evaluator::evaluate;
use crate::formula::{Expr, FormulaParser, FormulaTransformer};
use crate::types::{Address, Value};
use std::collections::{BTreeMap, HashSet};

/// One occupied grid position: its stored content, and — iff that content
/// is a formula — the AST built from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub content: Value,
    pub ast: Option<Expr>,
}

impl Cell {
    fn number(n: f64) -> Self {
        Cell {
            content: Value::Number(n),
            ast: None,
        }
    }

    fn text(s: String) -> Self {
        Cell {
            content: Value::Text(s),
            ast: None,
        }
    }

    fn formula(source: String, ast: Expr) -> Self {
        Cell {
            content: Value::Text(source),
            ast: Some(ast),
        }
    }

    fn empty() -> Self {
        Cell {
            content: Value::Empty,
            ast: None,
        }
    }
}

/// A sparse `(row, col) -> Cell` map. Absent entries are *empty*; there is
/// no maximum extent.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    cells: BTreeMap<(u32, u32), Cell>,
}

impl Sheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterate cells in ascending `(row, col)` order, as the serializer
    /// requires for deterministic output.
    pub fn iter(&self) -> impl Iterator<Item = (&(u32, u32), &Cell)> {
        self.cells.iter()
    }

    pub fn get_cell(&self, addr: Address) -> Option<&Cell> {
        self.cells.get(&(addr.row, addr.col))
    }

    /// Classify and store `contents` at `pos`, per the set-cell contract:
    /// a leading `=` means formula (parsed immediately; failure leaves the
    /// sheet untouched and returns `false`), otherwise a full numeric parse
    /// means number, otherwise plain text.
    pub fn set_cell(&mut self, pos: &str, contents: &str) -> bool {
        let addr = match Address::parse(pos) {
            Ok(addr) => addr,
            Err(e) => {
                log::warn!("set_cell: {e}");
                return false;
            }
        };
        self.set_cell_at(addr, contents)
    }

    fn set_cell_at(&mut self, addr: Address, contents: &str) -> bool {
        if contents.starts_with(FORMULA_PREFIX) {
            match FormulaParser::parse(contents) {
                Ok(ast) => {
                    self.cells
                        .insert((addr.row, addr.col), Cell::formula(contents.to_string(), ast));
                    true
                }
                Err(e) => {
                    log::warn!("set_cell({addr}): {e}");
                    false
                }
            }
        } else if let Ok(n) = contents.trim().parse::<f64>() {
            self.cells.insert((addr.row, addr.col), Cell::number(n));
            true
        } else {
            self.cells
                .insert((addr.row, addr.col), Cell::text(contents.to_string()));
            true
        }
    }

    /// `get_value` wraps `get_value_rec` with a fresh visited set, per the
    /// evaluator's top-level/recursive split.
    pub fn get_value(&self, pos: &str) -> Value {
        let mut visited = HashSet::new();
        match Address::parse(pos) {
            Ok(addr) => self.value_at(addr, &mut visited),
            Err(_) => Value::Empty,
        }
    }

    /// Resolve a normalized address *text* (as stored in a `Ref` node)
    /// against the current `visited` set. Called back into from the
    /// evaluator.
    pub fn get_value_rec(&self, addr_text: &str, visited: &mut HashSet<String>) -> Value {
        match Address::parse(addr_text) {
            Ok(addr) => self.value_at(addr, visited),
            Err(_) => Value::Empty,
        }
    }

    fn value_at(&self, addr: Address, visited: &mut HashSet<String>) -> Value {
        match self.cells.get(&(addr.row, addr.col)) {
            None => Value::Empty,
            Some(cell) => match &cell.ast {
                Some(ast) => evaluate(ast, self, visited),
                None => cell.content.clone(),
            },
        }
    }

    /// Copy the `w x h` rectangle rooted at `src` to the rectangle rooted
    /// at `dst`, rewriting relative references in every formula cell by
    /// the copy delta. All reads happen into a buffer before any writes,
    /// so an overlapping source/destination rectangle still reads the
    /// original values.
    pub fn copy_rect(&mut self, dst: Address, src: Address, w: u32, h: u32) {
        let row_delta = dst.row as i64 - src.row as i64;
        let col_delta = dst.col as i64 - src.col as i64;

        let mut buffer = Vec::with_capacity((w as usize) * (h as usize));
        for i in 0..h {
            for j in 0..w {
                let source_key = (src.row + i, src.col + j);
                let dest_key = (dst.row + i, dst.col + j);
                let new_cell = match self.cells.get(&source_key) {
                    None => Cell::empty(),
                    Some(cell) => match &cell.content {
                        Value::Text(text) if text.starts_with(FORMULA_PREFIX) => {
                            let shifted = FormulaTransformer::shift(text, row_delta, col_delta);
                            let ast = FormulaParser::parse(&shifted).expect(
                                "rewriting a valid formula's addresses preserves its grammar",
                            );
                            Cell::formula(shifted, ast)
                        }
                        _ => cell.clone(),
                    },
                };
                buffer.push((dest_key, new_cell));
            }
        }

        for (key, cell) in buffer {
            self.cells.insert(key, cell);
        }
    }

    /// Atomically replace the entire grid, for `load`.
    pub fn replace_all(&mut self, cells: BTreeMap<(u32, u32), Cell>) {
        self.cells = cells;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_number() {
        let mut sheet = Sheet::new();
        assert!(sheet.set_cell("A1", "42"));
        assert_eq!(sheet.get_value("A1"), Value::Number(42.0));
    }

    #[test]
    fn set_then_get_text() {
        let mut sheet = Sheet::new();
        assert!(sheet.set_cell("A1", "abc"));
        assert_eq!(sheet.get_value("A1"), Value::Text("abc".to_string()));
    }

    #[test]
    fn invalid_formula_leaves_prior_state_untouched() {
        let mut sheet = Sheet::new();
        assert!(sheet.set_cell("A1", "42"));
        assert!(!sheet.set_cell("A1", "=("));
        assert_eq!(sheet.get_value("A1"), Value::Number(42.0));
    }

    #[test]
    fn absent_cell_is_empty() {
        let sheet = Sheet::new();
        assert_eq!(sheet.get_value("Z99"), Value::Empty);
    }

    #[test]
    fn copy_rect_shifts_relative_reference() {
        let mut sheet = Sheet::new();
        assert!(sheet.set_cell("D1", "=A$1+1"));
        sheet.copy_rect(
            Address::parse("E2").unwrap(),
            Address::parse("D1").unwrap(),
            1,
            1,
        );
        let cell = sheet.get_cell(Address::parse("E2").unwrap()).unwrap();
        assert_eq!(cell.content, Value::Text("=B$1+1".to_string()));
    }

    #[test]
    fn copy_rect_reads_source_before_writing_on_overlap() {
        let mut sheet = Sheet::new();
        assert!(sheet.set_cell("A1", "1"));
        assert!(sheet.set_cell("A2", "=A1"));
        sheet.copy_rect(
            Address::parse("A2").unwrap(),
            Address::parse("A1").unwrap(),
            1,
            2,
        );
        // A2 now holds what A1 held (1), and A3 holds what A2 held
        // (=A1), rewritten with a +1 row delta to =A2 — both computed
        // from the pre-copy state, not the partially-overwritten one.
        assert_eq!(sheet.get_value("A2"), Value::Number(1.0));
        let a3 = sheet.get_cell(Address::parse("A3").unwrap()).unwrap();
        assert_eq!(a3.content, Value::Text("=A2".to_string()));
    }

    #[test]
    fn copy_rect_absent_source_stores_empty() {
        let mut sheet = Sheet::new();
        sheet.copy_rect(
            Address::parse("B1").unwrap(),
            Address::parse("A1").unwrap(),
            1,
            1,
        );
        assert_eq!(sheet.get_value("B1"), Value::Empty);
    }
}
