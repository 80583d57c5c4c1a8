//! Builds score matrices from a directory of pairwise TM-align reports.
//!
//! One report per unordered structure pair, named `<A>_vs_<B>.txt`. The
//! entity set is the union of both members of every pair; a missing or
//! unreadable report leaves its two mirror cells undefined rather than
//! zero. File parsing fans out over the rayon pool — each report is a
//! pure function of its own text.

use anyhow::{ensure, Context, Result};
use indicatif::ProgressBar;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use crate::matrix::ScoreMatrix;
use crate::metric::Metric;
use crate::parse::tmalign::{extract_scores, pair_from_stem, PairScores};

/// TM-score and RMSD matrices over the same entity set.
pub struct PairwiseMatrices {
    pub tm: ScoreMatrix,
    pub rmsd: ScoreMatrix,
}

/// Scores attributed to one entity pair.
pub struct PairRecord {
    pub a: String,
    pub b: String,
    pub scores: PairScores,
}

/// Lists the `*.txt` reports under `dir` whose stems follow the
/// `<A>_vs_<B>` convention, in path order.
pub fn collect_pair_files(dir: &Path) -> Result<Vec<(PathBuf, String, String)>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let path = entry?.path();
        if path.extension().map_or(false, |e| e == "txt") {
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
            if let Some((a, b)) = pair_from_stem(stem) {
                files.push((path, a, b));
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Pure aggregation step: union entity set (sorted for determinism),
/// symmetric fill, diagonal per metric policy.
pub fn aggregate_pairs(records: &[PairRecord]) -> PairwiseMatrices {
    let mut names: Vec<String> = records
        .iter()
        .flat_map(|r| [r.a.clone(), r.b.clone()])
        .collect();
    names.sort();
    names.dedup();

    let mut tm = ScoreMatrix::new(names.clone());
    let mut rmsd = ScoreMatrix::new(names);
    for record in records {
        if let Some(v) = record.scores.tm_score {
            tm.set_symmetric(&record.a, &record.b, v);
        }
        if let Some(v) = record.scores.rmsd {
            rmsd.set_symmetric(&record.a, &record.b, v);
        }
    }
    tm.fill_diagonal(Metric::TmScore.diagonal());
    rmsd.fill_diagonal(Metric::Rmsd.diagonal());

    PairwiseMatrices { tm, rmsd }
}

/// Reads and aggregates every pair report under `dir`.
pub fn aggregate_dir(dir: &Path, verbose: bool) -> Result<PairwiseMatrices> {
    let files = collect_pair_files(dir)?;
    ensure!(
        !files.is_empty(),
        "no *_vs_*.txt reports under {}",
        dir.display()
    );

    let bar = ProgressBar::new(files.len() as u64);
    let records: Vec<PairRecord> = files
        .par_iter()
        .map(|(path, a, b)| {
            let scores = match fs::read_to_string(path) {
                Ok(text) => {
                    let scores = extract_scores(&text);
                    if verbose && scores.tm_score.is_none() && scores.rmsd.is_none() {
                        eprintln!("[WARN] no scores recognized in {}", path.display());
                    }
                    scores
                }
                Err(err) => {
                    if verbose {
                        eprintln!("[WARN] skipping {}: {}", path.display(), err);
                    }
                    PairScores::default()
                }
            };
            bar.inc(1);
            PairRecord {
                a: a.clone(),
                b: b.clone(),
                scores,
            }
        })
        .collect();
    bar.finish_and_clear();

    if verbose {
        eprintln!("[INFO] aggregated {} pair reports", records.len());
    }
    Ok(aggregate_pairs(&records))
}
