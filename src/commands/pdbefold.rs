//! `strucqc pdbefold` — parse a PDBeFold multi-structure report.

use anyhow::{bail, Context, Result};
use clap::Args;
use std::fs;
use std::path::PathBuf;

use crate::matrix::rank_entities;
use crate::parse::pdbefold::parse_report;
use crate::report::{csv, heatmap};

#[derive(Args, Debug)]
pub struct PdbefoldArgs {
    /// PDBeFold metrics report (plain text)
    #[arg(short, long)]
    pub input: PathBuf,
    /// Directory for CSV matrices, rankings and heatmaps
    #[arg(short, long)]
    pub outdir: PathBuf,
    #[arg(long, short = 'v', default_value_t = false)]
    pub verbose: bool,
}

pub fn run(args: PdbefoldArgs) -> Result<()> {
    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    fs::create_dir_all(&args.outdir)
        .with_context(|| format!("creating {}", args.outdir.display()))?;

    let report = parse_report(&text);
    for failure in &report.failures {
        eprintln!(
            "[WARN] {}: {} block skipped: {}",
            args.input.display(),
            failure.metric.label(),
            failure.error
        );
    }
    if report.matrices.is_empty() {
        bail!(
            "no usable score blocks in {} ({} malformed)",
            args.input.display(),
            report.failures.len()
        );
    }

    let found: Vec<&str> = report
        .matrices
        .iter()
        .map(|(metric, _)| metric.label())
        .collect();
    println!("Found blocks: {}", found.join(", "));

    for (metric, matrix) in &report.matrices {
        println!("  {}: {}x{}", metric.label(), matrix.len(), matrix.len());
        if args.verbose {
            let skew = matrix.max_asymmetry();
            if skew > 1e-9 {
                eprintln!(
                    "[WARN] {} matrix asymmetric, worst mirror gap {:.6}",
                    metric.label(),
                    skew
                );
            }
        }

        let stem = metric.file_stem();
        csv::write_matrix_file(&args.outdir.join(format!("{stem}.csv")), matrix)?;
        let ranking = rank_entities(matrix, *metric);
        csv::write_ranking_file(
            &args.outdir.join(format!("{stem}_ranking.csv")),
            &ranking,
            *metric,
        )?;
        heatmap::render_heatmap(
            &args.outdir.join(format!("{stem}_matrix.svg")),
            matrix,
            *metric,
        )?;
        if args.verbose {
            eprintln!("[INFO] wrote {} outputs under {}", stem, args.outdir.display());
        }
    }

    Ok(())
}
