use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use bids2cnd::{convert_dataset, ConvertConfig};

#[derive(Parser)]
#[command(name = "bids2cnd", about = "Convert a BIDS dataset to CND (.mat)")]
struct Args {
    /// Root of the BIDS dataset
    #[arg(long = "input_dir")]
    input_dir: PathBuf,

    /// Output directory (dataCND/ is created inside)
    #[arg(long = "output_dir", default_value = "DataSetCND")]
    output_dir: PathBuf,

    /// Stimulus feature names (comma-separated)
    #[arg(long, default_value = "word,phoneme")]
    stim_features: String,

    /// Recording datatype; autodetected when omitted
    #[arg(long)]
    datatype: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    println!("File path: {}", args.input_dir.display());
    println!("Output directory: {}", args.output_dir.display());

    let cfg = ConvertConfig {
        stim_features: args
            .stim_features
            .split(',')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        data_type: args.datatype,
    };

    let summary = convert_dataset(&args.input_dir, &args.output_dir, &cfg)?;
    println!(
        "Done: {} runs converted, {} subjects written",
        summary.runs_converted, summary.subjects_written
    );
    Ok(())
}
