//! Persistence format: one line per occupied cell, `<row> <col> <kind>
//! <len> <payload>`, with `payload` read back by its declared byte length
//! rather than by scanning for a delimiter — so payload text may itself
//! contain spaces or any other byte. `kind` is `1` for a number (payload is
//! its formatted text) or `2` for text, including formula source (payload
//! starting with `=` is re-parsed as a formula on load).
//!
//! Unlike the record shape this was adapted from, `len` here is the
//! payload's actual byte length, not a constant placeholder — see the
//! save/load design notes for why that was worth diverging on.

use crate::constants::{SERIALIZER_KIND_NUMBER, SERIALIZER_KIND_TEXT, SERIALIZER_SEPARATOR};
use crate::error::EngineError;
use crate::formula::FormulaParser;
use crate::sheet::Cell;
use crate::types::Value;
use crate::utils::formatting::format_number;
use std::collections::BTreeMap;
use std::io::{Read, Write};

pub fn save(sheet: &crate::sheet::Sheet, writer: &mut impl Write) -> Result<(), EngineError> {
    for (&(row, col), cell) in sheet.iter() {
        let (kind, payload) = match (&cell.content, &cell.ast) {
            (_, Some(_)) => {
                let Value::Text(source) = &cell.content else {
                    unreachable!("a cell with an AST always stores its formula source as text")
                };
                (SERIALIZER_KIND_TEXT, source.clone())
            }
            (Value::Number(n), None) => (SERIALIZER_KIND_NUMBER, format_number(*n)),
            (Value::Text(s), None) => (SERIALIZER_KIND_TEXT, s.clone()),
            (Value::Empty, None) => continue,
        };
        write_record(writer, row, col, kind, &payload).map_err(|e| EngineError::Io(e.to_string()))?;
    }
    Ok(())
}

fn write_record(
    writer: &mut impl Write,
    row: u32,
    col: u32,
    kind: u8,
    payload: &str,
) -> std::io::Result<()> {
    let sep = SERIALIZER_SEPARATOR;
    write!(
        writer,
        "{row}{sep}{col}{sep}{kind}{sep}{len}{sep}",
        len = payload.len()
    )?;
    writer.write_all(payload.as_bytes())?;
    writeln!(writer)
}

pub fn load(reader: &mut impl Read) -> Result<BTreeMap<(u32, u32), Cell>, EngineError> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| EngineError::Io(e.to_string()))?;

    let mut cells = BTreeMap::new();
    let mut pos = 0usize;
    while pos < bytes.len() {
        let (row, col, kind, payload, next) = read_record(&bytes, pos)?;
        let cell = match kind {
            SERIALIZER_KIND_NUMBER => {
                let n: f64 = payload
                    .parse()
                    .map_err(|_| EngineError::MalformedRecord(format!("bad number: {payload}")))?;
                Cell {
                    content: Value::Number(n),
                    ast: None,
                }
            }
            SERIALIZER_KIND_TEXT => {
                if payload.starts_with(crate::constants::FORMULA_PREFIX) {
                    let ast = FormulaParser::parse(&payload).map_err(|e| {
                        EngineError::MalformedRecord(format!("formula at ({row},{col}): {e}"))
                    })?;
                    Cell {
                        content: Value::Text(payload),
                        ast: Some(ast),
                    }
                } else {
                    Cell {
                        content: Value::Text(payload),
                        ast: None,
                    }
                }
            }
            other => {
                return Err(EngineError::MalformedRecord(format!(
                    "unknown record kind {other}"
                )))
            }
        };
        cells.insert((row, col), cell);
        pos = next;
    }

    Ok(cells)
}

/// Read one `<row> <col> <kind> <len> <payload>\n` record starting at
/// `pos`. Returns the parsed fields and the offset just past the trailing
/// newline.
fn read_record(
    bytes: &[u8],
    pos: usize,
) -> Result<(u32, u32, u8, String, usize), EngineError> {
    let sep = SERIALIZER_SEPARATOR as u8;

    let (row_text, pos) = read_field(bytes, pos, sep)?;
    let (col_text, pos) = read_field(bytes, pos, sep)?;
    let (kind_text, pos) = read_field(bytes, pos, sep)?;
    let (len_text, pos) = read_field(bytes, pos, sep)?;

    let row: u32 = row_text
        .parse()
        .map_err(|_| EngineError::MalformedRecord(format!("bad row: {row_text}")))?;
    let col: u32 = col_text
        .parse()
        .map_err(|_| EngineError::MalformedRecord(format!("bad col: {col_text}")))?;
    let kind: u8 = kind_text
        .parse()
        .map_err(|_| EngineError::MalformedRecord(format!("bad kind: {kind_text}")))?;
    let len: usize = len_text
        .parse()
        .map_err(|_| EngineError::MalformedRecord(format!("bad length: {len_text}")))?;

    if pos + len > bytes.len() {
        return Err(EngineError::MalformedRecord(
            "payload shorter than declared length".to_string(),
        ));
    }
    let payload = String::from_utf8(bytes[pos..pos + len].to_vec())
        .map_err(|_| EngineError::MalformedRecord("payload is not valid UTF-8".to_string()))?;
    let mut next = pos + len;

    if next >= bytes.len() || bytes[next] != b'\n' {
        return Err(EngineError::MalformedRecord(
            "missing newline after payload".to_string(),
        ));
    }
    next += 1;

    Ok((row, col, kind, payload, next))
}

/// Read one `sep`-terminated field as text, starting at `pos`.
fn read_field(bytes: &[u8], pos: usize, sep: u8) -> Result<(String, usize), EngineError> {
    let end = bytes[pos..]
        .iter()
        .position(|&b| b == sep)
        .ok_or_else(|| EngineError::MalformedRecord("truncated record".to_string()))?;
    let field = String::from_utf8(bytes[pos..pos + end].to_vec())
        .map_err(|_| EngineError::MalformedRecord("field is not valid UTF-8".to_string()))?;
    Ok((field, pos + end + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::Sheet;

    #[test]
    fn round_trips_numbers_text_and_formulas() {
        let mut sheet = Sheet::new();
        sheet.set_cell("A1", "3.5");
        sheet.set_cell("B1", "hello world");
        sheet.set_cell("A2", "=A1*2");

        let mut buffer = Vec::new();
        save(&sheet, &mut buffer).unwrap();

        let cells = load(&mut buffer.as_slice()).unwrap();
        assert_eq!(cells.len(), 3);
        assert_eq!(cells[&(1, 1)].content, Value::Number(3.5));
        assert_eq!(
            cells[&(1, 2)].content,
            Value::Text("hello world".to_string())
        );
        assert!(cells[&(2, 1)].ast.is_some());
    }

    #[test]
    fn malformed_record_is_rejected() {
        let mut garbage: &[u8] = b"not a record at all\n";
        assert!(load(&mut garbage).is_err());
    }

    #[test]
    fn payload_length_prefix_allows_embedded_separators() {
        let mut sheet = Sheet::new();
        sheet.set_cell("A1", "has spaces in it");
        let mut buffer = Vec::new();
        save(&sheet, &mut buffer).unwrap();
        let cells = load(&mut buffer.as_slice()).unwrap();
        assert_eq!(
            cells[&(1, 1)].content,
            Value::Text("has spaces in it".to_string())
        );
    }
}
