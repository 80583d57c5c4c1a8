//! `strucqc tmalign` — aggregate a directory of pairwise TM-align
//! reports into TM-score and RMSD matrices.

use anyhow::{Context, Result};
use clap::Args;
use std::fs;
use std::path::PathBuf;

use crate::aggregate::aggregate_dir;
use crate::matrix::rank_entities;
use crate::metric::Metric;
use crate::report::{csv, heatmap};

#[derive(Args, Debug)]
pub struct TmalignArgs {
    /// Directory with TM-align result files (*_vs_*.txt)
    #[arg(short, long)]
    pub input: PathBuf,
    /// Directory for output files
    #[arg(short, long)]
    pub outdir: PathBuf,
    /// Prefix for output files
    #[arg(short, long, default_value = "tmalign_qc")]
    pub prefix: String,
    #[arg(short = 'n', long, default_value_t = 0)]
    pub num_threads: usize,
    #[arg(long, short = 'v', default_value_t = false)]
    pub verbose: bool,
}

pub fn run(args: TmalignArgs) -> Result<()> {
    let num_threads = if args.num_threads == 0 {
        num_cpus::get()
    } else {
        args.num_threads
    };
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .context("Failed to build thread pool")?;

    fs::create_dir_all(&args.outdir)
        .with_context(|| format!("creating {}", args.outdir.display()))?;

    let matrices = aggregate_dir(&args.input, args.verbose)?;

    for (metric, matrix, tag) in [
        (Metric::TmScore, &matrices.tm, "tm"),
        (Metric::Rmsd, &matrices.rmsd, "rmsd"),
    ] {
        let matrix_path = args
            .outdir
            .join(format!("{}_{}_matrix.csv", args.prefix, tag));
        let ranking_path = args
            .outdir
            .join(format!("{}_{}_ranking.csv", args.prefix, tag));
        let heatmap_path = args
            .outdir
            .join(format!("{}_{}_heatmap.svg", args.prefix, tag));

        csv::write_matrix_file(&matrix_path, matrix)?;
        let ranking = rank_entities(matrix, metric);
        csv::write_ranking_file(&ranking_path, &ranking, metric)?;
        heatmap::render_heatmap(&heatmap_path, matrix, metric)?;

        if args.verbose {
            eprintln!("[INFO] wrote {}", matrix_path.display());
        }
    }

    println!(
        "TM-align aggregation complete: {} structures",
        matrices.tm.len()
    );
    Ok(())
}
