//! The public facade: translates the sheet's `Result`-based internals into
//! the plain `bool`/`Value` surface callers see, and is the one place that
//! logs (never the cell contents themselves — only addresses and outcomes).

use crate::serializer;
use crate::sheet::Sheet;
use crate::types::{Address, Value};
use std::io::{Read, Write};

#[derive(Debug, Clone, Default)]
pub struct Engine {
    sheet: Sheet,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `pos`'s content. Returns `false` (and leaves the prior content,
    /// if any, unchanged) when `pos` is not a valid address or `contents`
    /// is a formula that fails to parse.
    pub fn set_cell(&mut self, pos: &str, contents: &str) -> bool {
        let ok = self.sheet.set_cell(pos, contents);
        if ok {
            log::debug!("set_cell({pos}) stored");
        }
        ok
    }

    /// The computed value at `pos`. Absent cells, and any address that
    /// fails to parse, are `Value::Empty`.
    pub fn get_value(&self, pos: &str) -> Value {
        self.sheet.get_value(pos)
    }

    /// Copy a `w x h` rectangle from `src` to `dst`, rewriting relative
    /// references in copied formulas. Invalid addresses are a no-op.
    pub fn copy_rect(&mut self, dst: &str, src: &str, w: u32, h: u32) -> bool {
        let (dst, src) = match (Address::parse(dst), Address::parse(src)) {
            (Ok(d), Ok(s)) => (d, s),
            _ => {
                log::warn!("copy_rect: invalid address ({dst}, {src})");
                return false;
            }
        };
        self.sheet.copy_rect(dst, src, w, h);
        log::debug!("copy_rect {w}x{h} {src} -> {dst}");
        true
    }

    /// Serialize every occupied cell to `writer`, ascending by `(row,
    /// col)`. Returns `false` on an I/O error.
    pub fn save(&self, writer: &mut impl Write) -> bool {
        if self.sheet.is_empty() {
            log::debug!("save: sheet is empty, nothing to write");
            return true;
        }
        match serializer::save(&self.sheet, writer) {
            Ok(()) => {
                log::debug!("save: wrote {} cells", self.sheet.len());
                true
            }
            Err(e) => {
                log::warn!("save failed: {e}");
                false
            }
        }
    }

    /// Replace the sheet's content from `reader`. On any malformed record
    /// the load is aborted and the sheet is left exactly as it was before
    /// the call — matching `set_cell`'s leave-prior-state-on-failure rule.
    pub fn load(&mut self, reader: &mut impl Read) -> bool {
        match serializer::load(reader) {
            Ok(cells) => {
                let count = cells.len();
                self.sheet.replace_all(cells);
                log::debug!("load: read {count} cells");
                true
            }
            Err(e) => {
                log::warn!("load failed, sheet left unchanged: {e}");
                false
            }
        }
    }
}
