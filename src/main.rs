use anyhow::Result;
use clap::{Parser, Subcommand};
use strucqc::commands::{pdbefold, tmalign};

#[derive(Parser)]
#[command(name = "strucqc")]
#[command(version = "0.1.0")]
#[command(about = "Structural-comparison report QC: score matrices, rankings and heatmaps", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a PDBeFold multi-structure comparison report
    Pdbefold(pdbefold::PdbefoldArgs),

    /// Aggregate a directory of pairwise TM-align reports
    Tmalign(tmalign::TmalignArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Pdbefold(args) => {
            pdbefold::run(args)?;
        }
        Commands::Tmalign(args) => {
            tmalign::run(args)?;
        }
    }
    Ok(())
}
