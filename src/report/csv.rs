//! Delimited-text export of matrices and rankings.
//!
//! The matrix dialect mirrors the common dataframe layout: a leading
//! empty header cell, entity identifiers as both column header and row
//! labels, cells at 4 decimal places, and an empty field where a cell
//! is undefined.

use anyhow::{ensure, Context, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::matrix::{Ranking, ScoreMatrix};
use crate::metric::Metric;

pub fn write_matrix<W: Write>(writer: &mut W, matrix: &ScoreMatrix) -> io::Result<()> {
    for entity in matrix.entities() {
        write!(writer, ",{}", entity)?;
    }
    writeln!(writer)?;

    for (i, entity) in matrix.entities().iter().enumerate() {
        write!(writer, "{}", entity)?;
        for j in 0..matrix.len() {
            match matrix.get_at(i, j) {
                Some(value) => write!(writer, ",{:.4}", value)?,
                None => write!(writer, ",")?,
            }
        }
        writeln!(writer)?;
    }
    Ok(())
}

pub fn write_ranking<W: Write>(
    writer: &mut W,
    ranking: &Ranking,
    metric: Metric,
) -> io::Result<()> {
    writeln!(writer, "Structure,Average {}", metric.label())?;
    for (entity, mean) in ranking {
        writeln!(writer, "{},{:.4}", entity, mean)?;
    }
    Ok(())
}

pub fn write_matrix_file(path: &Path, matrix: &ScoreMatrix) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_matrix(&mut writer, matrix).with_context(|| format!("writing {}", path.display()))
}

pub fn write_ranking_file(path: &Path, ranking: &Ranking, metric: Metric) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_ranking(&mut writer, ranking, metric)
        .with_context(|| format!("writing {}", path.display()))
}

/// Reads a matrix back from the dialect written by [`write_matrix`].
/// Empty fields become undefined cells.
pub fn read_matrix(text: &str) -> Result<ScoreMatrix> {
    let mut lines = text.lines();
    let header = lines.next().context("matrix file is empty")?;
    let entities: Vec<String> = header.split(',').skip(1).map(str::to_string).collect();

    let mut matrix = ScoreMatrix::new(entities.clone());
    let mut rows = 0usize;
    for (i, line) in lines.filter(|l| !l.is_empty()).enumerate() {
        let mut fields = line.split(',');
        let label = fields.next().unwrap_or_default();
        ensure!(
            entities.get(i).map(String::as_str) == Some(label),
            "row label '{}' does not match header entity at position {}",
            label,
            i + 1
        );
        for (j, field) in fields.enumerate() {
            if !field.is_empty() {
                let value: f64 = field
                    .parse()
                    .with_context(|| format!("bad cell '{}' in row '{}'", field, label))?;
                matrix.set_at(i, j, value);
            }
        }
        rows += 1;
    }
    ensure!(
        rows == entities.len(),
        "matrix file has {} rows for {} header entities",
        rows,
        entities.len()
    );
    Ok(matrix)
}
