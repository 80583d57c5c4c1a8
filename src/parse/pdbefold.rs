//! PDBeFold multi-structure report parser.
//!
//! The report prints each score block (`<< RMSD >>`, `<< Q-score >>`,
//! `<< Sequence Identity >>`) as a square matrix tiled into horizontal
//! segments: every segment repeats the full row list under a header of
//! numeric column indices and covers the next contiguous range of
//! columns. A row's own diagonal cell is never printed and has to be
//! synthesized back in at the header column matching the row's index.

use regex::Regex;
use rustc_hash::FxHashMap;

use crate::error::ParseError;
use crate::matrix::ScoreMatrix;
use crate::metric::Metric;

/// First token of a segment's column-header row.
const HEADER_KEYWORD: &str = "Structure";
/// Block markers all start with this; seeing one mid-block terminates
/// the current block.
const BLOCK_SENTINEL: &str = "<<";

struct Patterns {
    header_id: Regex,
    data_row: Regex,
    value: Regex,
}

impl Patterns {
    fn new() -> Self {
        Self {
            header_id: Regex::new(r"\b\d+\b").unwrap(),
            // "<row-number>. <TAG> <entity-id>", e.g. "  3. PDB 1abc"
            data_row: Regex::new(r"^\s*(\d+)\.\s+\w+\s+(\S+)").unwrap(),
            value: Regex::new(r"\d+\.\d+").unwrap(),
        }
    }
}

/// One horizontally tiled slice of a block: the column indices it
/// covers plus, per row, the entity and that slice's values (diagonal
/// already synthesized).
struct Segment {
    col_ids: Vec<String>,
    rows: Vec<SegmentRow>,
}

struct SegmentRow {
    line: usize,
    entity: String,
    values: Vec<f64>,
}

/// Reads the next segment of the current block, advancing the cursor
/// past the consumed lines. `Ok(None)` means the block has no further
/// segments (next block marker or end of input reached).
fn read_segment(
    lines: &[&str],
    cursor: &mut usize,
    block: &'static str,
    diagonal: f64,
    pat: &Patterns,
) -> Result<Option<Segment>, ParseError> {
    // Advance to the next column-header row.
    loop {
        match lines.get(*cursor) {
            None => return Ok(None),
            Some(line) => {
                let t = line.trim_start();
                if t.starts_with(BLOCK_SENTINEL) {
                    return Ok(None);
                }
                if t.starts_with(HEADER_KEYWORD) {
                    break;
                }
                *cursor += 1;
            }
        }
    }

    let col_ids: Vec<String> = pat
        .header_id
        .find_iter(lines[*cursor])
        .map(|m| m.as_str().to_string())
        .collect();
    // Header row plus the separator line beneath it.
    *cursor += 2;

    let mut rows = Vec::new();
    while let Some(line) = lines.get(*cursor) {
        let t = line.trim_start();
        if t.is_empty() || t.starts_with(HEADER_KEYWORD) || t.starts_with(BLOCK_SENTINEL) {
            break;
        }
        if let Some(caps) = pat.data_row.captures(line) {
            let row_number = &caps[1];
            let entity = caps[2].to_string();
            // Scan values only after the identifier: an entity id of the
            // form digits.digits must not contribute a phantom cell.
            let tail = &line[caps.get(0).map_or(0, |m| m.end())..];
            let mut values: Vec<f64> = pat
                .value
                .find_iter(tail)
                .filter_map(|m| m.as_str().parse().ok())
                .collect();

            if values.len() + 1 == col_ids.len() {
                // The unprinted cell is this row's own diagonal; its slot
                // is the header column carrying the row's own index.
                let slot = col_ids.iter().position(|c| c == row_number).ok_or(
                    ParseError::MalformedSegment {
                        block,
                        row: entity.clone(),
                        line: *cursor + 1,
                        expected: col_ids.len(),
                        found: values.len(),
                    },
                )?;
                values.insert(slot, diagonal);
            } else if values.len() != col_ids.len() {
                return Err(ParseError::MalformedSegment {
                    block,
                    row: entity,
                    line: *cursor + 1,
                    expected: col_ids.len(),
                    found: values.len(),
                });
            }

            rows.push(SegmentRow {
                line: *cursor + 1,
                entity,
                values,
            });
        }
        *cursor += 1;
    }

    Ok(Some(Segment { col_ids, rows }))
}

/// Assembles one block starting at its marker line: the first segment
/// fixes the row order, later segments append their value chunks in
/// file order, and the accumulated positional column indices (exactly
/// 1..N in order) resolve to the row identifiers so the final matrix is
/// keyed by entity on both axes.
fn assemble_block(
    lines: &[&str],
    marker_line: usize,
    metric: Metric,
    pat: &Patterns,
) -> Result<ScoreMatrix, ParseError> {
    let block = metric.label();
    let mut cursor = marker_line + 1;

    let mut entities: Vec<String> = Vec::new();
    let mut index: FxHashMap<String, usize> = FxHashMap::default();
    let mut chunks: Vec<Vec<f64>> = Vec::new();
    let mut col_count = 0usize;
    let mut first_segment = true;

    while let Some(segment) = read_segment(lines, &mut cursor, block, metric.diagonal(), pat)? {
        col_count += segment.col_ids.len();
        if first_segment {
            for row in segment.rows {
                index.insert(row.entity.clone(), entities.len());
                entities.push(row.entity);
                chunks.push(row.values);
            }
            first_segment = false;
        } else {
            for row in segment.rows {
                match index.get(&row.entity) {
                    Some(&i) => chunks[i].extend(row.values),
                    None => {
                        return Err(ParseError::InconsistentRowSet {
                            block,
                            row: row.entity,
                            line: row.line,
                        })
                    }
                }
            }
        }
    }

    let n = entities.len();
    if col_count != n {
        return Err(ParseError::NotSquare {
            block,
            rows: n,
            cols: col_count,
        });
    }
    for chunk in &chunks {
        if chunk.len() != n {
            return Err(ParseError::NotSquare {
                block,
                rows: n,
                cols: chunk.len(),
            });
        }
    }

    let mut matrix = ScoreMatrix::from_rows(entities, chunks);
    // The diagonal is policy, not data: force it even when the source
    // printed a self-cell.
    matrix.fill_diagonal(metric.diagonal());
    Ok(matrix)
}

/// A block that was found in the report but could not be assembled.
#[derive(Debug)]
pub struct BlockFailure {
    pub metric: Metric,
    pub error: ParseError,
}

/// Outcome of scanning one report: assembled matrices in block order,
/// plus the blocks that were present but malformed. A block whose
/// marker never occurs in the file is simply absent from both lists.
#[derive(Debug)]
pub struct ReportMatrices {
    pub matrices: Vec<(Metric, ScoreMatrix)>,
    pub failures: Vec<BlockFailure>,
}

/// Locates each known block marker (at most once each, any order) and
/// assembles every block found. A malformed block is reported in
/// `failures` without aborting the others.
pub fn parse_report(text: &str) -> ReportMatrices {
    let lines: Vec<&str> = text.lines().collect();
    let pat = Patterns::new();

    let mut matrices = Vec::new();
    let mut failures = Vec::new();
    for metric in Metric::PDBEFOLD_BLOCKS {
        let Some(marker) = metric.block_marker() else {
            continue;
        };
        let Some(at) = lines.iter().position(|l| l.contains(marker)) else {
            continue;
        };
        match assemble_block(&lines, at, metric, &pat) {
            Ok(matrix) => matrices.push((metric, matrix)),
            Err(error) => failures.push(BlockFailure { metric, error }),
        }
    }
    ReportMatrices { matrices, failures }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SINGLE_SEGMENT: &str = "\
<< RMSD >>

 Structure     1       2       3
 --------------------------------
  1. PDB 1abc          1.200   2.300
  2. PDB 2def  1.200           3.400
  3. PDB 3ghi  2.300   3.400

<< Q-score >>
";

    #[test]
    fn test_single_segment_with_implicit_diagonal() {
        let report = parse_report(SINGLE_SEGMENT);
        assert!(report.failures.is_empty());
        assert_eq!(report.matrices.len(), 1);

        let (metric, matrix) = &report.matrices[0];
        assert_eq!(*metric, Metric::Rmsd);
        assert_eq!(matrix.len(), 3);
        assert_eq!(matrix.entities(), ["1abc", "2def", "3ghi"]);

        assert_eq!(matrix.get("1abc", "2def"), Some(1.2));
        assert_eq!(matrix.get("2def", "3ghi"), Some(3.4));
        assert_eq!(matrix.get("1abc", "3ghi"), Some(2.3));
        // Implicit diagonals synthesized with the RMSD constant.
        for id in ["1abc", "2def", "3ghi"] {
            assert_eq!(matrix.get(id, id), Some(0.0));
        }
        assert!(matrix.max_asymmetry() < 1e-12);
    }

    const TWO_SEGMENTS: &str = "\
<< Q-score >>

 Structure     1       2       3
 --------------------------------
  1. PDB aaaa          0.500   0.400
  2. PDB bbbb  0.500           0.300
  3. PDB cccc  0.400   0.300
  4. PDB dddd  0.200   0.100   0.600
  5. PDB eeee  0.900   0.800   0.700

 Structure     4       5
 ------------------------
  1. PDB aaaa  0.200   0.900
  2. PDB bbbb  0.100   0.800
  3. PDB cccc  0.600   0.700
  4. PDB dddd          0.350
  5. PDB eeee  0.350

<< Sequence Identity >>
";

    #[test]
    fn test_two_segments_concatenate_columns() {
        let report = parse_report(TWO_SEGMENTS);
        assert!(report.failures.is_empty());
        let (metric, matrix) = &report.matrices[0];
        assert_eq!(*metric, Metric::QScore);
        assert_eq!(matrix.len(), 5);

        // Columns 4 and 5 came from the second segment.
        assert_eq!(matrix.get("aaaa", "dddd"), Some(0.2));
        assert_eq!(matrix.get("aaaa", "eeee"), Some(0.9));
        assert_eq!(matrix.get("dddd", "eeee"), Some(0.35));
        // Diagonals landed in different segments per row.
        for id in ["aaaa", "bbbb", "cccc", "dddd", "eeee"] {
            assert_eq!(matrix.get(id, id), Some(1.0));
        }
        assert!(matrix.max_asymmetry() < 1e-12);
    }

    #[test]
    fn test_printed_self_cell_is_overridden_by_policy() {
        // Row 2 prints a bogus self-cell; the full row therefore carries
        // as many values as columns and nothing is synthesized, but the
        // diagonal must still come out as the policy constant.
        let text = "\
<< Q-score >>

 Structure     1       2
 ------------------------
  1. PDB xxxx          0.500
  2. PDB yyyy  0.500   0.999
";
        let report = parse_report(text);
        assert!(report.failures.is_empty());
        let (_, matrix) = &report.matrices[0];
        assert_eq!(matrix.get("yyyy", "yyyy"), Some(1.0));
        assert_eq!(matrix.get("xxxx", "yyyy"), Some(0.5));
    }

    #[test]
    fn test_malformed_segment_fails_block_only() {
        // RMSD row 2 is short by two values; Q-score is intact.
        let text = "\
<< RMSD >>

 Structure     1       2       3
 --------------------------------
  1. PDB 1abc          1.200   2.300
  2. PDB 2def  1.200
  3. PDB 3ghi  2.300   3.400

<< Q-score >>

 Structure     1       2
 ------------------------
  1. PDB 1abc          0.800
  2. PDB 2def  0.800
";
        let report = parse_report(text);
        assert_eq!(report.matrices.len(), 1);
        assert_eq!(report.matrices[0].0, Metric::QScore);

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].metric, Metric::Rmsd);
        match &report.failures[0].error {
            ParseError::MalformedSegment {
                row,
                expected,
                found,
                line,
                ..
            } => {
                assert_eq!(row, "2def");
                assert_eq!(*expected, 3);
                assert_eq!(*found, 1);
                assert_eq!(*line, 6);
            }
            other => panic!("expected MalformedSegment, got {other:?}"),
        }
    }

    #[test]
    fn test_excess_values_are_malformed() {
        let text = "\
<< RMSD >>

 Structure     1       2
 ------------------------
  1. PDB 1abc  1.200   9.999   8.888
  2. PDB 2def  1.200
";
        let report = parse_report(text);
        assert!(report.matrices.is_empty());
        assert!(matches!(
            report.failures[0].error,
            ParseError::MalformedSegment {
                expected: 2,
                found: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_new_row_in_later_segment_is_inconsistent() {
        let text = "\
<< RMSD >>

 Structure     1       2
 ------------------------
  1. PDB 1abc          1.200
  2. PDB 2def  1.200

 Structure     3
 ----------------
  1. PDB 1abc  0.500
  2. PDB 2def  0.600
  3. PDB zzzz
";
        let report = parse_report(text);
        assert!(report.matrices.is_empty());
        match &report.failures[0].error {
            ParseError::InconsistentRowSet { row, .. } => assert_eq!(row, "zzzz"),
            other => panic!("expected InconsistentRowSet, got {other:?}"),
        }
    }

    #[test]
    fn test_later_segment_missing_row_is_not_square() {
        let text = "\
<< RMSD >>

 Structure     1       2       3
 --------------------------------
  1. PDB 1abc          1.200   2.300
  2. PDB 2def  1.200           3.400
  3. PDB 3ghi  2.300   3.400

 Structure     4
 ----------------
  1. PDB 1abc  0.100
  2. PDB 2def  0.200
";
        // 3 rows but 4 accumulated columns (and row 3ghi stayed short).
        let report = parse_report(text);
        assert!(report.matrices.is_empty());
        assert!(matches!(
            report.failures[0].error,
            ParseError::NotSquare { .. }
        ));
    }

    #[test]
    fn test_absent_blocks_are_omitted() {
        let report = parse_report("nothing interesting here\n");
        assert!(report.matrices.is_empty());
        assert!(report.failures.is_empty());
    }

    #[test]
    fn test_all_three_blocks_found_in_any_order() {
        let text = "\
<< Sequence Identity >>

 Structure     1       2
 ------------------------
  1. PDB 1abc          0.900
  2. PDB 2def  0.900

<< RMSD >>

 Structure     1       2
 ------------------------
  1. PDB 1abc          1.500
  2. PDB 2def  1.500

<< Q-score >>

 Structure     1       2
 ------------------------
  1. PDB 1abc          0.700
  2. PDB 2def  0.700
";
        let report = parse_report(text);
        assert!(report.failures.is_empty());
        let found: Vec<Metric> = report.matrices.iter().map(|(m, _)| *m).collect();
        // Result order follows the canonical block order, not file order.
        assert_eq!(
            found,
            [Metric::Rmsd, Metric::QScore, Metric::SeqIdentity]
        );
        for (metric, matrix) in &report.matrices {
            assert_eq!(matrix.len(), 2);
            assert_eq!(matrix.get("1abc", "1abc"), Some(metric.diagonal()));
        }
    }
}
