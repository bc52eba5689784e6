//! Compile-time constants shared across the engine. There is no runtime
//! configuration surface (no CLI, env vars, or wire protocol) — these are
//! the only knobs the engine has, and none of them are meant to vary.

/// Marks a cell's stored text as a formula.
pub const FORMULA_PREFIX: char = '=';

/// Marks an address component as absolute (non-shifting) to the rewriter.
pub const ABSOLUTE_MARKER: char = '$';

/// Field separator used by the serializer's line format.
pub const SERIALIZER_SEPARATOR: char = ' ';

/// Record kind tag written by the serializer for a numeric cell.
pub const SERIALIZER_KIND_NUMBER: u8 = 1;

/// Record kind tag written by the serializer for a text/formula cell.
pub const SERIALIZER_KIND_TEXT: u8 = 2;
