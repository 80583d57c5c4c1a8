use thiserror::Error;

/// Failures while recovering a matrix from one report block.
///
/// A failed block never aborts the sibling blocks of the same file; the
/// caller records the failure and keeps going. Line numbers are 1-based
/// positions in the report file.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A data row's value count disagrees with the header column count
    /// beyond the single implicit-diagonal case.
    #[error("block {block}, line {line}: row '{row}' carries {found} values for {expected} columns")]
    MalformedSegment {
        block: &'static str,
        row: String,
        line: usize,
        expected: usize,
        found: usize,
    },

    /// A later segment named a row that the first segment never listed.
    #[error("block {block}, line {line}: row '{row}' was not present in the first segment")]
    InconsistentRowSet {
        block: &'static str,
        row: String,
        line: usize,
    },

    /// The assembled table is not square over the discovered row set.
    #[error("block {block}: assembled {rows} rows against {cols} columns, expected a square table")]
    NotSquare {
        block: &'static str,
        rows: usize,
        cols: usize,
    },
}
